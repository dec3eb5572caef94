//! Error types for geovalid

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Input errors
    #[error("Unsupported input: {reason}")]
    UnsupportedInput { reason: String },

    #[error("No 'type' member found in GeoJSON object at index {index}")]
    MissingType { index: usize },

    #[error("Unsupported GeoJSON type '{type_name}'")]
    UnsupportedType { type_name: String },

    #[error("Malformed geometry at index {index}: {reason}")]
    MalformedGeometry { index: usize, reason: String },

    // Criteria errors
    #[error("The selected criterion '{name}' is not a valid argument for {category}")]
    UnknownCriterion { name: String, category: String },

    #[error("Select at least one criterion in 'invalid' or 'problematic'")]
    NoCriteriaSelected,

    // Engine errors
    #[error("Geometry nesting exceeds the maximum depth of {max_depth}")]
    NestingTooDeep { max_depth: usize },

    #[error(
        "Cannot fix '{criterion}' at feature {feature}: flaws nested inside more than one \
         multi-geometry level are not supported"
    )]
    FixNestingTooDeep { criterion: String, feature: usize },

    #[error("No fix is available for criterion '{criterion}'")]
    NotFixable { criterion: String },

    #[error("Index address {address} does not resolve in the document: {reason}")]
    InvalidAddress { address: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // Retrieval errors
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
