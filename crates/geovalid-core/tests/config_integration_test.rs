//! Integration tests for layered configuration
//!
//! Precedence: CLI arguments > Environment variables > Config file > Defaults

use geovalid_core::config::{CliConfigOverrides, ConfigSource, LayeredConfig};
use serial_test::serial;
use std::env;
use std::io::Write;
use tempfile::NamedTempFile;

const ENV_VARS: [&str; 7] = [
    "GEOVALID_CRITERIA_INVALID",
    "GEOVALID_CRITERIA_PROBLEMATIC",
    "GEOVALID_CHECK_CRS",
    "GEOVALID_MAX_DEPTH",
    "GEOVALID_PRECISION",
    "GEOVALID_MAX_VERTICES",
    "GEOVALID_SAMPLE_SIZE",
];

fn clear_env() {
    for var in ENV_VARS {
        env::remove_var(var);
    }
}

fn defaults() -> LayeredConfig {
    LayeredConfig::with_defaults(&["unclosed", "exterior_not_ccw"], &["holes"])
}

#[test]
fn test_default_configuration() {
    let config = defaults();

    assert_eq!(config.criteria_invalid.value, vec!["unclosed", "exterior_not_ccw"]);
    assert_eq!(config.criteria_invalid.source, ConfigSource::Default);
    assert!(!config.check_crs.value);
    assert_eq!(config.max_depth.value, 32);
    assert_eq!(config.precision.value, 6);
    assert_eq!(config.max_vertices.value, 999);
    assert_eq!(config.sample_size.value, None);
}

#[test]
fn test_file_overrides_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
criteria_invalid = ["unclosed"]
criteria_problematic = []
check_crs = true
max_vertices = 5000
sample_size = 2
"#
    )
    .unwrap();

    let config = defaults().load_from_file(file.path()).unwrap();

    assert_eq!(config.criteria_invalid.value, vec!["unclosed"]);
    assert_eq!(config.criteria_invalid.source, ConfigSource::File);
    assert!(config.criteria_problematic.value.is_empty());
    assert!(config.check_crs.value);
    assert_eq!(config.max_vertices.value, 5000);
    assert_eq!(config.sample_size.value, Some(2));
    assert_eq!(config.max_depth.source, ConfigSource::Default);
}

#[test]
fn test_file_rejects_zero_depth() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "max_depth = 0").unwrap();

    assert!(defaults().load_from_file(file.path()).is_err());
}

#[test]
fn test_malformed_file_is_an_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "max_depth = [").unwrap();

    assert!(defaults().load_from_file(file.path()).is_err());
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "precision = 3\ncriteria_invalid = [\"unclosed\"]").unwrap();

    env::set_var("GEOVALID_PRECISION", "8");
    env::set_var("GEOVALID_CRITERIA_INVALID", "exterior_not_ccw, interior_not_cw");

    let config = defaults().load_from_file(file.path()).unwrap().load_from_env();

    assert_eq!(config.precision.value, 8);
    assert_eq!(config.precision.source, ConfigSource::Environment);
    assert_eq!(config.criteria_invalid.value, vec!["exterior_not_ccw", "interior_not_cw"]);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_env_values_are_ignored() {
    clear_env();
    env::set_var("GEOVALID_MAX_DEPTH", "0");
    env::set_var("GEOVALID_CHECK_CRS", "maybe");
    env::set_var("GEOVALID_SAMPLE_SIZE", "all");

    let config = defaults().load_from_env();

    assert_eq!(config.max_depth.value, 32);
    assert_eq!(config.max_depth.source, ConfigSource::Default);
    assert!(!config.check_crs.value);
    assert_eq!(config.sample_size.value, None);

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env();
    env::set_var("GEOVALID_MAX_DEPTH", "10");
    env::set_var("GEOVALID_CRITERIA_PROBLEMATIC", "holes");

    let mut config = defaults().load_from_env();
    config.update_from_cli(CliConfigOverrides {
        max_depth: Some(3),
        criteria_problematic: Some(vec![]),
        ..Default::default()
    });

    assert_eq!(config.max_depth.value, 3);
    assert_eq!(config.max_depth.source, ConfigSource::Cli);
    assert!(config.criteria_problematic.value.is_empty());
    assert_eq!(config.criteria_problematic.source, ConfigSource::Cli);

    clear_env();
}

#[test]
fn test_inspection_map() {
    let map = defaults().to_inspection_map();

    assert_eq!(
        map["criteria_invalid"],
        ("unclosed,exterior_not_ccw".to_string(), ConfigSource::Default)
    );
    assert_eq!(map["sample_size"].0, "all");
    assert_eq!(map.len(), 7);
}
