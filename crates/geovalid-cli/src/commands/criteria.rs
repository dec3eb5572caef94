//! Criteria command implementation

use crate::output::OutputWriter;
use crate::output_types::CriterionInfo;
use anyhow::Result;
use geovalid_geo::criteria::InputKind;
use geovalid_geo::Criterion;
use tabled::Tabled;

fn criterion_info(criterion: Criterion) -> CriterionInfo {
    let descriptor = criterion.descriptor();
    CriterionInfo {
        name: descriptor.name,
        category: descriptor.category.to_string(),
        applies_to: descriptor.applicable_types.iter().map(|t| t.as_str()).collect(),
        input: match descriptor.input_kind {
            InputKind::RawCoordinates => "raw",
            InputKind::KernelGeometry => "kernel",
        },
        fixable: criterion.fixable(),
    }
}

pub fn execute(output: &OutputWriter) -> Result<()> {
    let criteria: Vec<CriterionInfo> = Criterion::ALL.into_iter().map(criterion_info).collect();

    if output.is_json() {
        return output.result(criteria);
    }

    output.section("Validation Criteria");

    #[derive(Tabled)]
    struct CriterionRow {
        #[tabled(rename = "Criterion")]
        name: String,
        #[tabled(rename = "Category")]
        category: String,
        #[tabled(rename = "Applies to")]
        applies_to: String,
        #[tabled(rename = "Fixable")]
        fixable: String,
    }

    let rows: Vec<CriterionRow> = criteria
        .into_iter()
        .map(|c| CriterionRow {
            name: c.name.to_string(),
            category: c.category,
            applies_to: c.applies_to.join(", "),
            fixable: if c.fixable { "yes" } else { "no" }.to_string(),
        })
        .collect();
    output.table(rows);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_criterion_info() {
        let info = criterion_info(Criterion::ExteriorNotCcw);
        assert_eq!(info.name, "exterior_not_ccw");
        assert_eq!(info.category, "invalid");
        assert_eq!(info.applies_to, vec!["Polygon"]);
        assert_eq!(info.input, "kernel");
        assert!(info.fixable);

        assert!(!criterion_info(Criterion::Holes).fixable);
    }
}
