//! Geometry validation engine
//!
//! Runs the selected criteria over every geometry of a FeatureCollection.
//! Multi-geometries and GeometryCollections are validated member by member and
//! flaws are reported as nested addresses, e.g. `{3: [1, 2]}`.

use crate::checks::CheckSettings;
use crate::criteria::{check_criteria, Category, Check, Criterion};
use crate::kernel::{GeoKernel, GeometryKernel};
use geovalid_core::config::{LayeredConfig, DEFAULT_MAX_DEPTH};
use geovalid_core::error::{Error, Result};
use geovalid_core::models::{Geometry, GeometryType, IndexAddress};
use geovalid_core::normalize::{normalize, GeoJsonInput, RemoteFetcher};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Outcome of a validation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Flagged geometries per invalid criterion
    pub invalid: BTreeMap<Criterion, Vec<IndexAddress>>,
    /// Flagged geometries per problematic criterion
    pub problematic: BTreeMap<Criterion, Vec<IndexAddress>>,
    /// Number of top-level geometries per type name
    pub count_geometry_types: BTreeMap<String, usize>,
    /// Indices of geometries whose type is not supported
    pub skipped_validation: Vec<usize>,
}

impl ValidationResult {
    /// True when no criterion flagged anything
    pub fn is_clean(&self) -> bool {
        self.invalid.is_empty() && self.problematic.is_empty()
    }

    /// Addresses flagged by a criterion, in either category
    pub fn flagged(&self, criterion: Criterion) -> Option<&[IndexAddress]> {
        let map = match criterion.category() {
            Category::Invalid => &self.invalid,
            Category::Problematic => &self.problematic,
        };
        map.get(&criterion).map(Vec::as_slice)
    }

    fn record(&mut self, criterion: Criterion, address: IndexAddress) {
        let map = match criterion.category() {
            Category::Invalid => &mut self.invalid,
            Category::Problematic => &mut self.problematic,
        };
        map.entry(criterion).or_default().push(address);
    }
}

/// Engine tunables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationSettings {
    pub checks: CheckSettings,
    /// Deepest allowed container nesting
    pub max_depth: usize,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self { checks: CheckSettings::default(), max_depth: DEFAULT_MAX_DEPTH }
    }
}

impl ValidationSettings {
    pub fn from_config(config: &LayeredConfig) -> Self {
        Self {
            checks: CheckSettings {
                precision: config.precision.value,
                max_vertices: config.max_vertices.value,
                sample_size: config.sample_size.value,
            },
            max_depth: config.max_depth.value,
        }
    }
}

/// Validates geometries against a fixed selection of criteria
pub struct GeometryValidator<K: GeometryKernel = GeoKernel> {
    criteria: Vec<Criterion>,
    settings: ValidationSettings,
    kernel: K,
}

impl GeometryValidator<GeoKernel> {
    pub fn new(
        invalid: Vec<Criterion>,
        problematic: Vec<Criterion>,
        settings: ValidationSettings,
    ) -> Self {
        Self::with_kernel(invalid, problematic, settings, GeoKernel)
    }
}

impl<K: GeometryKernel> GeometryValidator<K> {
    pub fn with_kernel(
        invalid: Vec<Criterion>,
        problematic: Vec<Criterion>,
        settings: ValidationSettings,
        kernel: K,
    ) -> Self {
        let mut criteria: Vec<Criterion> = invalid.into_iter().chain(problematic).collect();
        criteria.sort();
        criteria.dedup();
        Self { criteria, settings, kernel }
    }

    /// Validate a list of geometries; addresses are list indices
    pub fn validate(&self, geometries: &[Value]) -> Result<ValidationResult> {
        self.validate_members(geometries.iter(), 0)
    }

    /// Validate the geometries of a FeatureCollection; addresses are feature
    /// indices. Features without a geometry are left out of the result.
    pub fn validate_features(&self, feature_collection: &Value) -> Result<ValidationResult> {
        let features = feature_collection
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::UnsupportedInput {
                reason: "FeatureCollection has no 'features' array".to_string(),
            })?;

        self.validate_members(
            features.iter().map(|feature| feature.get("geometry").unwrap_or(&Value::Null)),
            0,
        )
    }

    fn validate_members<'a>(
        &self,
        geometries: impl IntoIterator<Item = &'a Value>,
        depth: usize,
    ) -> Result<ValidationResult> {
        if depth > self.settings.max_depth {
            return Err(Error::NestingTooDeep { max_depth: self.settings.max_depth });
        }

        let mut result = ValidationResult::default();
        for (index, geometry) in geometries.into_iter().enumerate() {
            if geometry.is_null() {
                tracing::debug!("Geometry {} is null, not validated", index);
                continue;
            }
            self.validate_geometry(index, geometry, depth, &mut result)?;
        }
        Ok(result)
    }

    fn validate_geometry(
        &self,
        index: usize,
        geometry: &Value,
        depth: usize,
        result: &mut ValidationResult,
    ) -> Result<()> {
        let type_member = geometry.get("type").ok_or(Error::MissingType { index })?;
        let type_name = match type_member {
            Value::String(name) => name.clone(),
            other => other.to_string(),
        };
        *result.count_geometry_types.entry(type_name.clone()).or_default() += 1;

        let Ok(geometry_type) = type_name.parse::<GeometryType>() else {
            tracing::debug!("Geometry of type {} is not supported, skipping", type_name);
            result.skipped_validation.push(index);
            return Ok(());
        };

        if geometry_type.is_container() {
            let members = container_members(index, geometry, geometry_type)?;
            let nested = self.validate_members(members.iter(), depth + 1)?;
            for (criterion, children) in nested.invalid.into_iter().chain(nested.problematic) {
                result.record(criterion, IndexAddress::Nested(index, children));
            }
            return Ok(());
        }

        let parsed = parse_single(index, geometry)?;
        let mut kernel_view = None;
        for criterion in &self.criteria {
            if !criterion.descriptor().applies_to(geometry_type) {
                continue;
            }
            let flagged = match criterion.check() {
                Check::Raw(check) => check(&parsed, &self.settings.checks),
                Check::Kernel(check) => {
                    let view = kernel_view.get_or_insert_with(|| self.kernel.to_kernel(&parsed));
                    check(&self.kernel, view)
                }
            };
            if flagged {
                result.record(*criterion, IndexAddress::Leaf(index));
            }
        }
        Ok(())
    }
}

/// Member geometries of a container, as document values
fn container_members(
    index: usize,
    geometry: &Value,
    geometry_type: GeometryType,
) -> Result<Vec<Value>> {
    if geometry_type == GeometryType::GeometryCollection {
        return geometry
            .get("geometries")
            .and_then(Value::as_array)
            .cloned()
            .ok_or_else(|| Error::MalformedGeometry {
                index,
                reason: "GeometryCollection has no 'geometries' array".to_string(),
            });
    }

    let parsed = parse_single(index, geometry)?;
    Ok(parsed.explode().iter().map(Geometry::to_geojson).collect())
}

fn parse_single(index: usize, geometry: &Value) -> Result<Geometry> {
    let parsed = Geometry::from_geojson(geometry)
        .map_err(|e| Error::MalformedGeometry { index, reason: e.to_string() })?;

    if parsed.positions().any(|position| position.len() < 2) {
        return Err(Error::MalformedGeometry {
            index,
            reason: "Position with fewer than two values".to_string(),
        });
    }
    Ok(parsed)
}

/// Validate any supported input against the selected criteria.
///
/// Both criterion lists are resolved against the registry first; selecting
/// no criterion at all is an error.
pub fn validate_geometries<S: AsRef<str>>(
    input: GeoJsonInput,
    criteria_invalid: &[S],
    criteria_problematic: &[S],
    config: &LayeredConfig,
    fetcher: Option<&dyn RemoteFetcher>,
) -> Result<ValidationResult> {
    let invalid = check_criteria(criteria_invalid, Category::Invalid)?;
    let problematic = check_criteria(criteria_problematic, Category::Problematic)?;
    if invalid.is_empty() && problematic.is_empty() {
        return Err(Error::NoCriteriaSelected);
    }

    let feature_collection = normalize(input, fetcher)?;
    let validator =
        GeometryValidator::new(invalid, problematic, ValidationSettings::from_config(config));
    let result = validator.validate_features(&feature_collection)?;

    tracing::info!(
        invalid = result.invalid.len(),
        problematic = result.problematic.len(),
        skipped = result.skipped_validation.len(),
        "Validation finished"
    );
    Ok(result)
}
