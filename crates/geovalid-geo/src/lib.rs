//! geovalid Geo - Geometry rule validation and repair
//!
//! This crate wraps the planar geometry kernel, defines the validation
//! criteria, and runs the validation and fix engines over nested geometries.

pub mod checks;
pub mod criteria;
pub mod fix;
pub mod kernel;
pub mod validation;

pub use criteria::{check_criteria, Category, Criterion};
pub use fix::{fix_geometries, FixEngine};
pub use kernel::{GeoKernel, GeometryKernel};
pub use validation::{validate_geometries, GeometryValidator, ValidationResult};
