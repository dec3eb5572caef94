use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// geovalid - GeoJSON linting, validation and repair
#[derive(Parser, Debug)]
#[command(name = "geovalid")]
#[command(about = "Lint, validate and fix GeoJSON documents", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check a document against the GeoJSON grammar
    Lint(LintArgs),

    /// Validate geometries against the selected criteria
    Validate(ValidateArgs),

    /// Repair invalid geometries
    Fix(FixArgs),

    /// List all validation criteria
    Criteria,

    /// Show the effective configuration and where each value comes from
    Config,
}

/// GeoJSON source shared by all document commands
#[derive(Args, Debug)]
pub struct InputArgs {
    /// Path or URL of a .json/.geojson document
    pub input: String,
}

#[derive(Parser, Debug)]
pub struct LintArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Report a defined 'crs' member
    #[arg(long)]
    pub check_crs: bool,

    /// Group diagnostics by message
    #[arg(long)]
    pub aggregate: bool,
}

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Invalid criteria to check (comma-separated, empty for none)
    #[arg(long, value_name = "CRITERIA")]
    pub invalid: Option<String>,

    /// Problematic criteria to check (comma-separated, empty for none)
    #[arg(long, value_name = "CRITERIA")]
    pub problematic: Option<String>,

    /// Maximum nesting depth of GeometryCollections
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Only scan the first N positions of each ring for precision and 3D checks
    #[arg(long, value_name = "N")]
    pub sample_size: Option<usize>,

    /// Write the result to a file instead of stdout
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct FixArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Maximum nesting depth of GeometryCollections
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Write the repaired FeatureCollection to a file instead of stdout
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_validate_args() {
        let cli = Cli::try_parse_from([
            "geovalid",
            "--json",
            "validate",
            "data.geojson",
            "--invalid",
            "unclosed,exterior_not_ccw",
            "--problematic",
            "",
        ])
        .unwrap();

        assert!(cli.json);
        let Commands::Validate(args) = cli.command else {
            panic!("Expected validate command");
        };
        assert_eq!(args.input.input, "data.geojson");
        assert_eq!(args.invalid.as_deref(), Some("unclosed,exterior_not_ccw"));
        assert_eq!(args.problematic.as_deref(), Some(""));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["geovalid", "lint", "a.json", "--check-crs", "--json"])
            .unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Lint(LintArgs { check_crs: true, .. })));
    }
}
