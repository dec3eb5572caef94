use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

/// Default maximum nesting of GeometryCollections and Multi-geometries
pub const DEFAULT_MAX_DEPTH: usize = 32;
/// Default number of decimal places before precision counts as excessive
pub const DEFAULT_PRECISION: usize = 6;
/// Default vertex count before a ring or line counts as excessive
pub const DEFAULT_MAX_VERTICES: usize = 999;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for geovalid
///
/// Criteria are kept as names here; they are resolved against the criterion
/// registry when a validation runs.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub criteria_invalid: ConfigValue<Vec<String>>,
    pub criteria_problematic: ConfigValue<Vec<String>>,
    pub check_crs: ConfigValue<bool>,
    pub max_depth: ConfigValue<usize>,
    pub precision: ConfigValue<usize>,
    pub max_vertices: ConfigValue<usize>,
    pub sample_size: ConfigValue<Option<usize>>,
}

impl LayeredConfig {
    /// Create a new configuration with default values.
    ///
    /// `default_invalid` and `default_problematic` are the full criterion lists
    /// of the registry.
    pub fn with_defaults(default_invalid: &[&str], default_problematic: &[&str]) -> Self {
        Self {
            criteria_invalid: ConfigValue::new(
                default_invalid.iter().map(|s| s.to_string()).collect(),
                ConfigSource::Default,
            ),
            criteria_problematic: ConfigValue::new(
                default_problematic.iter().map(|s| s.to_string()).collect(),
                ConfigSource::Default,
            ),
            check_crs: ConfigValue::new(false, ConfigSource::Default),
            max_depth: ConfigValue::new(DEFAULT_MAX_DEPTH, ConfigSource::Default),
            precision: ConfigValue::new(DEFAULT_PRECISION, ConfigSource::Default),
            max_vertices: ConfigValue::new(DEFAULT_MAX_VERTICES, ConfigSource::Default),
            sample_size: ConfigValue::new(None, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::ConfigInvalid {
            key: "file".to_string(),
            reason: format!("Failed to read config file: {}", e),
        })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| Error::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(criteria) = file_config.criteria_invalid {
            self.criteria_invalid.update(criteria, ConfigSource::File);
        }

        if let Some(criteria) = file_config.criteria_problematic {
            self.criteria_problematic.update(criteria, ConfigSource::File);
        }

        if let Some(check_crs) = file_config.check_crs {
            self.check_crs.update(check_crs, ConfigSource::File);
        }

        if let Some(max_depth) = file_config.max_depth {
            self.max_depth.update(validate_max_depth(max_depth)?, ConfigSource::File);
        }

        if let Some(precision) = file_config.precision {
            self.precision.update(precision, ConfigSource::File);
        }

        if let Some(max_vertices) = file_config.max_vertices {
            self.max_vertices.update(max_vertices, ConfigSource::File);
        }

        if let Some(sample_size) = file_config.sample_size {
            self.sample_size.update(Some(sample_size), ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // GEOVALID_CRITERIA_INVALID
        if let Ok(list) = env::var("GEOVALID_CRITERIA_INVALID") {
            self.criteria_invalid.update(parse_criteria_list(&list), ConfigSource::Environment);
        }

        // GEOVALID_CRITERIA_PROBLEMATIC
        if let Ok(list) = env::var("GEOVALID_CRITERIA_PROBLEMATIC") {
            self.criteria_problematic
                .update(parse_criteria_list(&list), ConfigSource::Environment);
        }

        // GEOVALID_CHECK_CRS
        if let Ok(flag) = env::var("GEOVALID_CHECK_CRS") {
            match parse_bool(&flag) {
                Ok(check_crs) => self.check_crs.update(check_crs, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOVALID_CHECK_CRS value '{}': expected true or false",
                    flag
                ),
            }
        }

        // GEOVALID_MAX_DEPTH
        if let Ok(depth_str) = env::var("GEOVALID_MAX_DEPTH") {
            match depth_str.parse::<usize>() {
                Ok(depth) if depth > 0 => self.max_depth.update(depth, ConfigSource::Environment),
                _ => tracing::warn!(
                    "Invalid GEOVALID_MAX_DEPTH value '{}': expected a positive integer",
                    depth_str
                ),
            }
        }

        // GEOVALID_PRECISION
        if let Ok(precision_str) = env::var("GEOVALID_PRECISION") {
            match precision_str.parse::<usize>() {
                Ok(precision) => self.precision.update(precision, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOVALID_PRECISION value '{}': expected an integer",
                    precision_str
                ),
            }
        }

        // GEOVALID_MAX_VERTICES
        if let Ok(vertices_str) = env::var("GEOVALID_MAX_VERTICES") {
            match vertices_str.parse::<usize>() {
                Ok(vertices) => self.max_vertices.update(vertices, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOVALID_MAX_VERTICES value '{}': expected an integer",
                    vertices_str
                ),
            }
        }

        // GEOVALID_SAMPLE_SIZE
        if let Ok(sample_str) = env::var("GEOVALID_SAMPLE_SIZE") {
            match sample_str.parse::<usize>() {
                Ok(sample) => self.sample_size.update(Some(sample), ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOVALID_SAMPLE_SIZE value '{}': expected an integer",
                    sample_str
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(criteria) = overrides.criteria_invalid {
            self.criteria_invalid.update(criteria, ConfigSource::Cli);
        }

        if let Some(criteria) = overrides.criteria_problematic {
            self.criteria_problematic.update(criteria, ConfigSource::Cli);
        }

        if let Some(check_crs) = overrides.check_crs {
            self.check_crs.update(check_crs, ConfigSource::Cli);
        }

        if let Some(max_depth) = overrides.max_depth {
            self.max_depth.update(max_depth, ConfigSource::Cli);
        }

        if let Some(sample_size) = overrides.sample_size {
            self.sample_size.update(Some(sample_size), ConfigSource::Cli);
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> BTreeMap<String, (String, ConfigSource)> {
        let mut map = BTreeMap::new();

        map.insert(
            "criteria_invalid".to_string(),
            (self.criteria_invalid.value.join(","), self.criteria_invalid.source),
        );

        map.insert(
            "criteria_problematic".to_string(),
            (self.criteria_problematic.value.join(","), self.criteria_problematic.source),
        );

        map.insert(
            "check_crs".to_string(),
            (self.check_crs.value.to_string(), self.check_crs.source),
        );

        map.insert(
            "max_depth".to_string(),
            (self.max_depth.value.to_string(), self.max_depth.source),
        );

        map.insert(
            "precision".to_string(),
            (self.precision.value.to_string(), self.precision.source),
        );

        map.insert(
            "max_vertices".to_string(),
            (self.max_vertices.value.to_string(), self.max_vertices.source),
        );

        map.insert(
            "sample_size".to_string(),
            (
                self.sample_size.value.map_or_else(|| "all".to_string(), |s| s.to_string()),
                self.sample_size.source,
            ),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    criteria_invalid: Option<Vec<String>>,
    criteria_problematic: Option<Vec<String>>,
    check_crs: Option<bool>,
    max_depth: Option<usize>,
    precision: Option<usize>,
    max_vertices: Option<usize>,
    sample_size: Option<usize>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub criteria_invalid: Option<Vec<String>>,
    pub criteria_problematic: Option<Vec<String>>,
    pub check_crs: Option<bool>,
    pub max_depth: Option<usize>,
    pub sample_size: Option<usize>,
}

/// Parse a comma-separated criteria list. An empty string selects no criteria.
pub fn parse_criteria_list(s: &str) -> Vec<String> {
    s.split(',').map(str::trim).filter(|c| !c.is_empty()).map(str::to_string).collect()
}

/// Parse a boolean flag from string
pub fn parse_bool(s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(Error::ConfigInvalid {
            key: "check_crs".to_string(),
            reason: format!("Invalid boolean: {}. Use true or false", s),
        }),
    }
}

fn validate_max_depth(depth: usize) -> Result<usize> {
    if depth == 0 {
        return Err(Error::ConfigInvalid {
            key: "max_depth".to_string(),
            reason: "max_depth must be at least 1".to_string(),
        });
    }
    Ok(depth)
}
