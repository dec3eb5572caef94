//! geovalid Core - Document models, normalization, and structural linting
//!
//! This crate contains the GeoJSON document model, the error taxonomy, layered
//! configuration, input normalization and the structural linter.

pub mod config;
pub mod error;
pub mod lint;
pub mod models;
pub mod normalize;

pub use error::{Error, Result};
