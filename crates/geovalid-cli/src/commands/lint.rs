//! Lint command implementation

use crate::cli::LintArgs;
use crate::config::load_config;
use crate::errors::explain;
use crate::fetch::{as_port, HttpFetcher};
use crate::output::OutputWriter;
use crate::output_types::LintOutput;
use anyhow::Result;
use geovalid_core::config::CliConfigOverrides;
use geovalid_core::lint::{lint_document, LintReport};
use geovalid_core::normalize::GeoJsonInput;
use std::path::Path;
use tabled::Tabled;

pub fn execute(args: LintArgs, config_file: Option<&Path>, output: &OutputWriter) -> Result<()> {
    let overrides =
        CliConfigOverrides { check_crs: args.check_crs.then_some(true), ..Default::default() };
    let config = load_config(config_file, overrides)?;

    let input = GeoJsonInput::parse(&args.input.input);
    let fetcher = HttpFetcher::for_input(&input)?;
    let diagnostics =
        lint_document(input, config.check_crs.value, as_port(&fetcher)).map_err(explain)?;

    if args.aggregate {
        return output.result(LintReport::from_diagnostics(&diagnostics));
    }

    if output.is_json() {
        return output.result(LintOutput { valid: diagnostics.is_empty(), diagnostics });
    }

    if diagnostics.is_empty() {
        output.success("Document conforms to the GeoJSON grammar");
        return Ok(());
    }

    output.section("Structural Problems");

    #[derive(Tabled)]
    struct DiagnosticRow {
        #[tabled(rename = "Line")]
        line: String,
        #[tabled(rename = "Path")]
        path: String,
        #[tabled(rename = "Message")]
        message: String,
    }

    let count = diagnostics.len();
    let rows: Vec<DiagnosticRow> = diagnostics
        .into_iter()
        .map(|d| DiagnosticRow {
            line: d.line.map_or_else(|| "-".to_string(), |l| l.to_string()),
            path: if d.path.is_empty() { "/".to_string() } else { d.path },
            message: d.message,
        })
        .collect();
    output.table(rows);
    output.warning(format!("{} structural problems found", count));

    Ok(())
}
