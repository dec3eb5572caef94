//! Configuration loading for CLI commands

use anyhow::{Context, Result};
use geovalid_core::config::{CliConfigOverrides, LayeredConfig};
use geovalid_geo::{Category, Criterion};
use std::path::Path;

/// Defaults select every criterion of the registry
pub fn default_config() -> LayeredConfig {
    LayeredConfig::with_defaults(
        &Criterion::names(Category::Invalid),
        &Criterion::names(Category::Problematic),
    )
}

/// Load layered configuration: defaults, then the config file, then the
/// environment, then CLI overrides
pub fn load_config(
    config_file: Option<&Path>,
    overrides: CliConfigOverrides,
) -> Result<LayeredConfig> {
    let mut config = default_config();

    if let Some(path) = config_file {
        config = config
            .load_from_file(path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?;
    }

    let mut config = config.load_from_env();
    config.update_from_cli(overrides);
    Ok(config)
}
