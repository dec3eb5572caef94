//! Fix engine
//!
//! Repairs the geometries a validation run flagged. Fixes work on the
//! coordinates as written, so elevation and any other extra values survive;
//! only the `coordinates` member of a repaired geometry is rewritten.

use crate::checks::position_key;
use crate::criteria::Criterion;
use crate::kernel::{GeoKernel, GeometryKernel, Orientation};
use crate::validation::{GeometryValidator, ValidationResult, ValidationSettings};
use geovalid_core::config::LayeredConfig;
use geovalid_core::error::{Error, Result};
use geovalid_core::models::{Geometry, GeometryType, IndexAddress, Position};
use geovalid_core::normalize::{normalize, GeoJsonInput, RemoteFetcher};
use serde_json::{json, Value};
use std::collections::HashSet;

/// Repairs a single geometry for one criterion
pub type FixFn = fn(&dyn GeometryKernel, &Geometry) -> Geometry;

/// Close every ring whose last position differs from its first
pub fn close_rings(_: &dyn GeometryKernel, geometry: &Geometry) -> Geometry {
    let mut fixed = geometry.clone();
    if let Geometry::Polygon { coordinates } = &mut fixed {
        for ring in coordinates.iter_mut() {
            if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
                if first != last {
                    let first = first.clone();
                    ring.push(first);
                }
            }
        }
    }
    fixed
}

fn dedup_line(line: &[Position]) -> Vec<Position> {
    let closed = line.len() > 1 && line.first() == line.last();
    let mut seen = HashSet::new();
    let mut unique: Vec<Position> =
        line.iter().filter(|p| seen.insert(position_key(p))).cloned().collect();
    if closed {
        if let Some(first) = unique.first().cloned() {
            unique.push(first);
        }
    }
    unique
}

/// Keep the first occurrence of every position; closed rings stay closed
pub fn remove_duplicate_nodes(_: &dyn GeometryKernel, geometry: &Geometry) -> Geometry {
    match geometry {
        Geometry::LineString { coordinates } => {
            Geometry::LineString { coordinates: dedup_line(coordinates) }
        }
        Geometry::Polygon { coordinates } => Geometry::Polygon {
            coordinates: coordinates.iter().map(|ring| dedup_line(ring)).collect(),
        },
        other => other.clone(),
    }
}

pub fn orient_exterior_ccw(kernel: &dyn GeometryKernel, geometry: &Geometry) -> Geometry {
    let mut fixed = geometry.clone();
    if let (Geometry::Polygon { coordinates }, geo::Geometry::Polygon(view)) =
        (&mut fixed, kernel.to_kernel(geometry))
    {
        if kernel.orientation(view.exterior()) == Some(Orientation::Clockwise) {
            if let Some(exterior) = coordinates.first_mut() {
                exterior.reverse();
            }
        }
    }
    fixed
}

pub fn orient_interiors_cw(kernel: &dyn GeometryKernel, geometry: &Geometry) -> Geometry {
    let mut fixed = geometry.clone();
    if let (Geometry::Polygon { coordinates }, geo::Geometry::Polygon(view)) =
        (&mut fixed, kernel.to_kernel(geometry))
    {
        for (i, interior) in view.interiors().iter().enumerate() {
            if kernel.orientation(interior) == Some(Orientation::CounterClockwise) {
                if let Some(ring) = coordinates.get_mut(i + 1) {
                    ring.reverse();
                }
            }
        }
    }
    fixed
}

/// Applies registered fixes at the addresses of a validation result
#[derive(Debug, Clone, Default)]
pub struct FixEngine<K: GeometryKernel = GeoKernel> {
    kernel: K,
}

impl FixEngine<GeoKernel> {
    pub fn new() -> Self {
        Self { kernel: GeoKernel }
    }
}

impl<K: GeometryKernel> FixEngine<K> {
    pub fn with_kernel(kernel: K) -> Self {
        Self { kernel }
    }

    /// Return a repaired copy of `feature_collection`.
    ///
    /// Criteria are applied in the given order. A criterion without flagged
    /// geometries is skipped; one without a fix is rejected before anything runs.
    ///
    /// A fix can expose a flaw the validation run could not see, such as a
    /// winding order that only exists once duplicate nodes are gone. Every
    /// geometry an earlier fix rewrote is therefore offered to the later fixes
    /// as well; each fix leaves a geometry without its flaw untouched.
    pub fn apply(
        &self,
        feature_collection: &Value,
        result: &ValidationResult,
        criteria: &[Criterion],
    ) -> Result<Value> {
        let fixers = criteria
            .iter()
            .map(|criterion| {
                criterion
                    .fixer()
                    .map(|fixer| (*criterion, fixer))
                    .ok_or_else(|| Error::NotFixable { criterion: criterion.to_string() })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut fixed = feature_collection.clone();
        let mut rewritten: Vec<IndexAddress> = Vec::new();
        for (criterion, fixer) in fixers {
            let flagged = result.flagged(criterion).unwrap_or_default();
            let targets: Vec<IndexAddress> = flagged
                .iter()
                .chain(rewritten.iter().filter(|&address| !flagged.contains(address)))
                .cloned()
                .collect();
            if targets.is_empty() {
                continue;
            }

            tracing::debug!(
                "Fixing '{}' in {} geometries ({} flagged)",
                criterion,
                targets.len(),
                flagged.len()
            );
            for address in &targets {
                self.apply_at(&mut fixed, criterion, fixer, address)?;
            }
            for address in flagged {
                if !rewritten.contains(address) {
                    rewritten.push(address.clone());
                }
            }
        }
        Ok(fixed)
    }

    fn apply_at(
        &self,
        feature_collection: &mut Value,
        criterion: Criterion,
        fixer: FixFn,
        address: &IndexAddress,
    ) -> Result<()> {
        let index = address.index();
        let geometry = feature_collection
            .get_mut("features")
            .and_then(|features| features.get_mut(index))
            .and_then(|feature| feature.get_mut("geometry"))
            .filter(|geometry| geometry.is_object())
            .ok_or_else(|| Error::InvalidAddress {
                address: address.to_string(),
                reason: format!("feature {} has no geometry", index),
            })?;

        match address {
            IndexAddress::Leaf(_) => self.fix_geometry(geometry, index, fixer),
            IndexAddress::Nested(_, children) => {
                for child in children {
                    match child {
                        IndexAddress::Leaf(member) => {
                            self.fix_member(geometry, index, *member, fixer, address)?
                        }
                        IndexAddress::Nested(..) => {
                            return Err(Error::FixNestingTooDeep {
                                criterion: criterion.to_string(),
                                feature: index,
                            })
                        }
                    }
                }
                Ok(())
            }
        }
    }

    /// Fix a single geometry value in place, rewriting only `coordinates`
    fn fix_geometry(&self, geometry: &mut Value, index: usize, fixer: FixFn) -> Result<()> {
        let parsed = Geometry::from_geojson(geometry)
            .map_err(|e| Error::MalformedGeometry { index, reason: e.to_string() })?;
        let repaired = fixer(&self.kernel, &parsed);
        if let (Some(coordinates), Some(object)) =
            (repaired.coordinates_json(), geometry.as_object_mut())
        {
            object.insert("coordinates".to_string(), coordinates);
        }
        Ok(())
    }

    /// Fix member `member` of a Multi-geometry or GeometryCollection in place
    fn fix_member(
        &self,
        container: &mut Value,
        index: usize,
        member: usize,
        fixer: FixFn,
        address: &IndexAddress,
    ) -> Result<()> {
        let missing_member = || Error::InvalidAddress {
            address: address.to_string(),
            reason: format!("geometry {} has no member {}", index, member),
        };

        let container_type = container
            .get("type")
            .and_then(Value::as_str)
            .and_then(|t| t.parse::<GeometryType>().ok())
            .ok_or(Error::MissingType { index })?;

        if container_type == GeometryType::GeometryCollection {
            let geometry = container
                .get_mut("geometries")
                .and_then(|members| members.get_mut(member))
                .ok_or_else(missing_member)?;
            return self.fix_geometry(geometry, index, fixer);
        }

        let member_type = member_type(container_type).ok_or_else(|| Error::InvalidAddress {
            address: address.to_string(),
            reason: format!("{} geometry {} has no members", container_type, index),
        })?;
        let coordinates = container
            .get_mut("coordinates")
            .and_then(|coordinates| coordinates.get_mut(member))
            .ok_or_else(missing_member)?;

        let mut single = json!({"type": member_type.as_str(), "coordinates": coordinates.take()});
        let outcome = self.fix_geometry(&mut single, index, fixer);
        if let Some(object) = single.as_object_mut() {
            if let Some(fixed) = object.remove("coordinates") {
                *coordinates = fixed;
            }
        }
        outcome
    }
}

fn member_type(container: GeometryType) -> Option<GeometryType> {
    match container {
        GeometryType::MultiPoint => Some(GeometryType::Point),
        GeometryType::MultiLineString => Some(GeometryType::LineString),
        GeometryType::MultiPolygon => Some(GeometryType::Polygon),
        _ => None,
    }
}

/// Validate any supported input against every fixable criterion and return a
/// repaired FeatureCollection
pub fn fix_geometries(
    input: GeoJsonInput,
    config: &LayeredConfig,
    fetcher: Option<&dyn RemoteFetcher>,
) -> Result<Value> {
    let feature_collection = normalize(input, fetcher)?;
    let criteria = Criterion::FIXABLE.to_vec();

    let validator = GeometryValidator::new(
        criteria.clone(),
        Vec::new(),
        ValidationSettings::from_config(config),
    );
    let result = validator.validate_features(&feature_collection)?;
    tracing::info!("Applying fixes for {} criteria", result.invalid.len());

    FixEngine::new().apply(&feature_collection, &result, &criteria)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polygon(rings: &[&[(f64, f64)]]) -> Geometry {
        Geometry::polygon(
            rings.iter().map(|ring| ring.iter().map(|(x, y)| vec![*x, *y]).collect()).collect(),
        )
    }

    fn rings(geometry: &Geometry) -> &[Vec<Position>] {
        match geometry {
            Geometry::Polygon { coordinates } => coordinates,
            other => panic!("Expected Polygon geometry, got {}", other.geometry_type()),
        }
    }

    #[test]
    fn test_close_rings_closes_every_ring() {
        let open = polygon(&[
            &[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0)],
            &[(1.0, 1.0), (2.0, 2.0), (2.0, 1.0)],
        ]);
        let fixed = close_rings(&GeoKernel, &open);

        for ring in rings(&fixed) {
            assert_eq!(ring.len(), 4);
            assert_eq!(ring.first(), ring.last());
        }
    }

    #[test]
    fn test_close_rings_keeps_elevation() {
        let open = Geometry::polygon(vec![vec![
            vec![0.0, 0.0, 10.0],
            vec![4.0, 0.0, 11.0],
            vec![4.0, 4.0, 12.0],
        ]]);
        let fixed = close_rings(&GeoKernel, &open);
        assert_eq!(rings(&fixed)[0][3], vec![0.0, 0.0, 10.0]);
    }

    #[test]
    fn test_remove_duplicate_nodes() {
        let duplicated =
            polygon(&[&[(0.0, 0.0), (4.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 0.0)]]);
        let fixed = remove_duplicate_nodes(&GeoKernel, &duplicated);
        assert_eq!(
            rings(&fixed)[0],
            vec![vec![0.0, 0.0], vec![4.0, 0.0], vec![4.0, 4.0], vec![0.0, 0.0]]
        );

        let line = Geometry::line_string(vec![vec![0.0, 0.0], vec![0.0, 0.0], vec![1.0, 1.0]]);
        assert_eq!(
            remove_duplicate_nodes(&GeoKernel, &line),
            Geometry::line_string(vec![vec![0.0, 0.0], vec![1.0, 1.0]])
        );
    }

    #[test]
    fn test_orientation_fixes() {
        let clockwise_exterior: &[(f64, f64)] =
            &[(0.0, 0.0), (0.0, 4.0), (4.0, 4.0), (4.0, 0.0), (0.0, 0.0)];
        let ccw_hole: &[(f64, f64)] = &[(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 1.0)];
        let geometry = polygon(&[clockwise_exterior, ccw_hole]);

        let fixed = orient_exterior_ccw(&GeoKernel, &geometry);
        assert_eq!(rings(&fixed)[0][1], vec![4.0, 0.0]);
        assert_eq!(rings(&fixed)[1], rings(&geometry)[1]);

        let fixed = orient_interiors_cw(&GeoKernel, &geometry);
        assert_eq!(rings(&fixed)[0], rings(&geometry)[0]);
        assert_eq!(rings(&fixed)[1][1], vec![2.0, 2.0]);
    }

    #[test]
    fn test_degenerate_ring_is_left_alone() {
        let flat = polygon(&[&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (0.0, 0.0)]]);
        assert_eq!(orient_exterior_ccw(&GeoKernel, &flat), flat);
    }
}
