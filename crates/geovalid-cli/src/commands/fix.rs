//! Fix command implementation

use crate::cli::FixArgs;
use crate::config::load_config;
use crate::errors::explain;
use crate::fetch::{as_port, HttpFetcher};
use crate::output::OutputWriter;
use anyhow::Result;
use geovalid_core::config::CliConfigOverrides;
use geovalid_core::normalize::GeoJsonInput;
use geovalid_geo::fix_geometries;
use std::path::Path;

pub fn execute(args: FixArgs, config_file: Option<&Path>, output: &OutputWriter) -> Result<()> {
    let overrides = CliConfigOverrides { max_depth: args.max_depth, ..Default::default() };
    let config = load_config(config_file, overrides)?;

    let input = GeoJsonInput::parse(&args.input.input);
    let fetcher = HttpFetcher::for_input(&input)?;
    let fixed = fix_geometries(input, &config, as_port(&fetcher)).map_err(explain)?;

    match args.output.as_deref() {
        Some(path) => output.document(&fixed, Some(path)),
        // Plain stdout stays a pure GeoJSON document so it can be piped
        None if !output.is_json() => output.data(&fixed),
        None => output.result(&fixed),
    }
}
