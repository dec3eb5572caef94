//! geovalid CLI
//!
//! Lints, validates and repairs GeoJSON documents from the command line.

mod cli;
mod commands;
mod config;
mod errors;
mod fetch;
mod output;
mod output_types;

use clap::Parser;
use cli::Cli;
use errors::CliError;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    match commands::execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<CliError>() {
                Some(cli_error) => cli_error.display(),
                None => eprintln!("{} {:#}", console::style("✗").red().bold(), err),
            }
            ExitCode::FAILURE
        }
    }
}
