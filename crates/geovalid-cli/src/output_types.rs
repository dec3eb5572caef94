use geovalid_core::lint::Diagnostic;
use serde::Serialize;
use std::collections::BTreeMap;

/// Output for the lint command
#[derive(Debug, Serialize)]
pub struct LintOutput {
    pub valid: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// One entry of the criteria command
#[derive(Debug, Serialize)]
pub struct CriterionInfo {
    pub name: &'static str,
    pub category: String,
    pub applies_to: Vec<&'static str>,
    pub input: &'static str,
    pub fixable: bool,
}

/// A configuration value and where it came from
#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub value: String,
    pub source: String,
}

/// Output for the config command
#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub values: BTreeMap<String, ConfigEntry>,
}
