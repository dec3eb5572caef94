//! Command implementations

mod config;
mod criteria;
mod fix;
mod lint;
mod validate;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::Result;

/// Execute a CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config_file = cli.config.as_deref();

    match cli.command {
        Commands::Lint(args) => lint::execute(args, config_file, &output),
        Commands::Validate(args) => validate::execute(args, config_file, &output),
        Commands::Fix(args) => fix::execute(args, config_file, &output),
        Commands::Criteria => criteria::execute(&output),
        Commands::Config => config::execute(config_file, &output),
    }
}
