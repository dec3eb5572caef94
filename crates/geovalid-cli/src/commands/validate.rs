//! Validate command implementation

use crate::cli::ValidateArgs;
use crate::config::load_config;
use crate::errors::explain;
use crate::fetch::{as_port, HttpFetcher};
use crate::output::OutputWriter;
use anyhow::Result;
use geovalid_core::config::{parse_criteria_list, CliConfigOverrides};
use geovalid_core::models::IndexAddress;
use geovalid_core::normalize::GeoJsonInput;
use geovalid_geo::{validate_geometries, Criterion, ValidationResult};
use std::collections::BTreeMap;
use std::path::Path;
use tabled::Tabled;

pub fn execute(
    args: ValidateArgs,
    config_file: Option<&Path>,
    output: &OutputWriter,
) -> Result<()> {
    let overrides = CliConfigOverrides {
        criteria_invalid: args.invalid.as_deref().map(parse_criteria_list),
        criteria_problematic: args.problematic.as_deref().map(parse_criteria_list),
        max_depth: args.max_depth,
        sample_size: args.sample_size,
        ..Default::default()
    };
    let config = load_config(config_file, overrides)?;

    let input = GeoJsonInput::parse(&args.input.input);
    let fetcher = HttpFetcher::for_input(&input)?;
    let result = validate_geometries(
        input,
        &config.criteria_invalid.value,
        &config.criteria_problematic.value,
        &config,
        as_port(&fetcher),
    )
    .map_err(explain)?;

    if output.is_json() || args.output.is_some() {
        return output.document(&result, args.output.as_deref());
    }

    render(&result, output);
    Ok(())
}

#[derive(Tabled)]
struct FlagRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Criterion")]
    criterion: String,
    #[tabled(rename = "Geometries")]
    geometries: String,
}

fn flag_rows(category: &str, flagged: &BTreeMap<Criterion, Vec<IndexAddress>>) -> Vec<FlagRow> {
    flagged
        .iter()
        .map(|(criterion, addresses)| FlagRow {
            category: category.to_string(),
            criterion: criterion.to_string(),
            geometries: addresses.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "),
        })
        .collect()
}

fn render(result: &ValidationResult, output: &OutputWriter) {
    output.section("Geometry Types");
    for (geometry_type, count) in &result.count_geometry_types {
        output.kv(geometry_type, count);
    }

    if !result.skipped_validation.is_empty() {
        output.warning(format!(
            "Skipped unsupported geometries: {}",
            result.skipped_validation.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
        ));
    }

    if result.is_clean() {
        output.success("No flaws found");
        return;
    }

    output.section("Flagged Geometries");
    let mut rows = flag_rows("invalid", &result.invalid);
    rows.extend(flag_rows("problematic", &result.problematic));
    output.table(rows);

    if !result.invalid.is_empty() {
        output.info(
            "Run 'geovalid fix' to repair unclosed, duplicate_nodes and winding order flaws",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_rows_render_nested_addresses() {
        let mut flagged = BTreeMap::new();
        flagged.insert(
            Criterion::Unclosed,
            vec![IndexAddress::Leaf(0), IndexAddress::Nested(2, vec![IndexAddress::Leaf(1)])],
        );

        let rows = flag_rows("invalid", &flagged);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].criterion, "unclosed");
        assert_eq!(rows[0].geometries, "0, {2: [1]}");
    }
}
