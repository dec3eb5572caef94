pub mod address;
pub mod geometry;

pub use address::IndexAddress;
pub use geometry::{Geometry, GeometryType, Position};
