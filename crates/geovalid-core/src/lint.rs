//! Structural GeoJSON linting
//!
//! Checks a document against the GeoJSON grammar (object types, required
//! members, coordinate nesting and position arity) and reports every problem as
//! a [`Diagnostic`] positioned on a canonical rendering of the document. Geometry
//! rules such as ring closure or winding order are not checked here.

pub mod diagnostic;
pub mod line_map;

pub use diagnostic::{Diagnostic, DiagnosticRecord, LintReport};
pub use line_map::LineMap;

use crate::error::Result;
use crate::models::GeometryType;
use crate::normalize::{read_geojson, GeoJsonInput, RemoteFetcher};
use serde_json::{Map, Value};

const FEATURE_COLLECTION: &str = "FeatureCollection";
const FEATURE: &str = "Feature";

const ROOT_NOT_OBJECT: &str = "Root of GeoJSON must be an object";
const MISSING_TYPE: &str = "Missing 'type' member";
const FEATURE_NOT_OBJECT: &str = "Every feature must be an object";
const MEMBER_GEOMETRY_NOT_OBJECT: &str = "Every geometry in a GeometryCollection must be an object";
const INVALID_ID: &str = "Feature 'id' member must be a string or number";
const CRS_DEFINED: &str = "The newest GeoJSON specification defines GeoJSON as always \
                           longitude/latitude (WGS84), remove the 'crs' member";
const POSITION_NOT_ARRAY: &str = "Coordinate position must be an array";
const NESTED_NOT_ARRAY: &str = "Coordinate array must only contain nested arrays";
const POSITION_TOO_SHORT: &str =
    "Coordinate position must have at least 2 values (longitude, latitude)";
const POSITION_TOO_LONG: &str = "Coordinate position should not have more than 3 values \
                                 (longitude, latitude and optional elevation)";
const POSITION_NOT_NUMERIC: &str = "Each element in a coordinate position must be a number";
const BBOX_NOT_ARRAY: &str =
    "'bbox' member must be a one-dimensional array with bounding box coordinates";
const BBOX_NOT_NUMERIC: &str = "'bbox' member array must contain only numbers";
const BBOX_WRONG_LENGTH: &str = "'bbox' member array must consist of 4 or 6 coordinates";

/// Required JSON kind of an object member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemberKind {
    Array,
    /// An object, or `null` where the grammar allows it
    NullableObject,
}

/// Structural linter for GeoJSON documents
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoJsonLinter {
    check_crs: bool,
}

impl GeoJsonLinter {
    /// `check_crs` enables a diagnostic recommending removal of `crs` members
    pub fn new(check_crs: bool) -> Self {
        Self { check_crs }
    }

    /// Lint a document and return its diagnostics in document order
    pub fn lint(&self, document: &Value) -> Vec<Diagnostic> {
        let line_map = LineMap::build(document);
        let mut run = LintRun {
            check_crs: self.check_crs,
            line_map: &line_map,
            feature: None,
            found: vec![],
        };

        match document.as_object() {
            Some(root) => run.validate_root(root),
            None => run.report(ROOT_NOT_OBJECT, ""),
        }

        tracing::debug!("Structural lint found {} diagnostics", run.found.len());
        run.found
    }

    /// Lint a document and group its diagnostics by message
    pub fn lint_report(&self, document: &Value) -> LintReport {
        LintReport::from_diagnostics(&self.lint(document))
    }
}

/// Read any supported input and lint it as written
pub fn lint_document(
    input: GeoJsonInput,
    check_crs: bool,
    fetcher: Option<&dyn RemoteFetcher>,
) -> Result<Vec<Diagnostic>> {
    let document = read_geojson(input, fetcher)?;
    Ok(GeoJsonLinter::new(check_crs).lint(&document))
}

struct LintRun<'a> {
    check_crs: bool,
    line_map: &'a LineMap,
    feature: Option<usize>,
    found: Vec<Diagnostic>,
}

impl LintRun<'_> {
    fn report(&mut self, message: impl Into<String>, path: &str) {
        self.found.push(Diagnostic {
            message: message.into(),
            path: path.to_string(),
            line: self.line_map.line(path),
            feature: self.feature,
        });
    }

    fn validate_root(&mut self, root: &Map<String, Value>) {
        let Some(type_name) = self.validate_type(root, "", |t| {
            t == FEATURE_COLLECTION || t == FEATURE || t.parse::<GeometryType>().is_ok()
        }) else {
            return;
        };

        match type_name {
            FEATURE_COLLECTION => self.validate_feature_collection(root, ""),
            FEATURE => self.validate_feature(root, ""),
            _ => self.validate_geometry(root, ""),
        }
    }

    /// Check the `type` member against the allowed set.
    ///
    /// Returns the type when it is allowed. A missing or rejected type ends
    /// validation of the object.
    fn validate_type<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        path: &str,
        allowed: impl Fn(&str) -> bool,
    ) -> Option<&'v str> {
        match obj.get("type") {
            None => {
                self.report(MISSING_TYPE, path);
                None
            }
            Some(Value::String(type_name)) if allowed(type_name) => Some(type_name.as_str()),
            Some(Value::String(type_name)) => {
                self.report(format!("Invalid type '{}'", type_name), &format!("{}/type", path));
                None
            }
            Some(other) => {
                self.report(format!("Invalid type '{}'", other), &format!("{}/type", path));
                None
            }
        }
    }

    /// Check that a required member exists and has the right kind.
    ///
    /// Returns true when the member can be descended into.
    fn validate_member(
        &mut self,
        obj: &Map<String, Value>,
        name: &str,
        kind: MemberKind,
        path: &str,
    ) -> bool {
        let member_path = format!("{}/{}", path, name);
        match (obj.get(name), kind) {
            (None, _) => {
                self.report(format!("\"{}\" member required", name), path);
                false
            }
            (Some(Value::Array(_)), MemberKind::Array) => true,
            (Some(Value::Object(_)), MemberKind::NullableObject) => true,
            (Some(Value::Null), MemberKind::NullableObject) => false,
            (Some(other), MemberKind::Array) => {
                self.report(
                    format!(
                        "\"{}\" member must be an array, but is {} instead",
                        name,
                        kind_of(other)
                    ),
                    &member_path,
                );
                false
            }
            (Some(other), MemberKind::NullableObject) => {
                self.report(
                    format!(
                        "\"{}\" member must be an object or null, but is {} instead",
                        name,
                        kind_of(other)
                    ),
                    &member_path,
                );
                false
            }
        }
    }

    fn validate_feature_collection(&mut self, fc: &Map<String, Value>, path: &str) {
        if self.validate_type(fc, path, |t| t == FEATURE_COLLECTION).is_none() {
            return;
        }

        if self.check_crs && fc.contains_key("crs") {
            self.report(CRS_DEFINED, &format!("{}/crs", path));
        }

        if self.validate_member(fc, "features", MemberKind::Array, path) {
            let features = fc["features"].as_array().map(Vec::as_slice).unwrap_or_default();
            for (idx, feature) in features.iter().enumerate() {
                self.feature = Some(idx);
                let feature_path = format!("{}/features/{}", path, idx);
                match feature.as_object() {
                    Some(obj) => self.validate_feature(obj, &feature_path),
                    None => self.report(FEATURE_NOT_OBJECT, &feature_path),
                }
            }
            self.feature = None;
        }

        self.validate_bbox(fc, path);
    }

    fn validate_feature(&mut self, feature: &Map<String, Value>, path: &str) {
        if self.validate_type(feature, path, |t| t == FEATURE).is_none() {
            return;
        }

        if let Some(id) = feature.get("id") {
            if !(id.is_string() || id.is_number()) {
                self.report(INVALID_ID, &format!("{}/id", path));
            }
        }

        self.validate_member(feature, "properties", MemberKind::NullableObject, path);
        if self.validate_member(feature, "geometry", MemberKind::NullableObject, path) {
            if let Some(geometry) = feature["geometry"].as_object() {
                self.validate_geometry(geometry, &format!("{}/geometry", path));
            }
        }

        self.validate_bbox(feature, path);
    }

    fn validate_geometry(&mut self, geometry: &Map<String, Value>, path: &str) {
        let Some(type_name) =
            self.validate_type(geometry, path, |t| t.parse::<GeometryType>().is_ok())
        else {
            return;
        };
        let Ok(geometry_type) = type_name.parse::<GeometryType>() else {
            return;
        };

        match geometry_type.coordinate_depth() {
            None => {
                if self.validate_member(geometry, "geometries", MemberKind::Array, path) {
                    let members =
                        geometry["geometries"].as_array().map(Vec::as_slice).unwrap_or_default();
                    for (idx, member) in members.iter().enumerate() {
                        let member_path = format!("{}/geometries/{}", path, idx);
                        match member.as_object() {
                            Some(obj) => self.validate_geometry(obj, &member_path),
                            None => self.report(MEMBER_GEOMETRY_NOT_OBJECT, &member_path),
                        }
                    }
                }
            }
            Some(expected_depth) => {
                if self.validate_member(geometry, "coordinates", MemberKind::Array, path) {
                    let coordinates = &geometry["coordinates"];
                    let coordinates_path = format!("{}/coordinates", path);
                    let found_depth = array_depth(coordinates);
                    if found_depth == expected_depth {
                        self.validate_positions(coordinates, &coordinates_path, expected_depth);
                    } else {
                        let nesting = if found_depth < expected_depth {
                            "not deep enough"
                        } else {
                            "too much"
                        };
                        self.report(
                            format!(
                                "Array is {} nested, expected depth {} for type '{}', \
                                 found depth {}",
                                nesting, expected_depth, geometry_type, found_depth
                            ),
                            &coordinates_path,
                        );
                    }
                }
            }
        }

        self.validate_bbox(geometry, path);
    }

    /// Descend `depth` array levels; whatever sits at the last level is a position
    fn validate_positions(&mut self, coordinates: &Value, path: &str, depth: usize) {
        match coordinates {
            position if depth <= 1 => self.validate_position(position, path),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.validate_positions(item, &format!("{}/{}", path, i), depth - 1);
                }
            }
            _ => self.report(NESTED_NOT_ARRAY, path),
        }
    }

    fn validate_position(&mut self, position: &Value, path: &str) {
        let Some(values) = position.as_array() else {
            self.report(POSITION_NOT_ARRAY, path);
            return;
        };
        if values.len() < 2 {
            self.report(POSITION_TOO_SHORT, path);
        } else if values.len() > 3 {
            self.report(POSITION_TOO_LONG, path);
        }
        if !values.iter().all(Value::is_number) {
            self.report(POSITION_NOT_NUMERIC, path);
        }
    }

    fn validate_bbox(&mut self, obj: &Map<String, Value>, path: &str) {
        let Some(bbox) = obj.get("bbox") else {
            return;
        };
        let bbox_path = format!("{}/bbox", path);
        let Some(values) = bbox.as_array() else {
            self.report(BBOX_NOT_ARRAY, &bbox_path);
            return;
        };
        if !values.iter().all(Value::is_number) {
            self.report(BBOX_NOT_NUMERIC, &bbox_path);
        }
        if values.len() != 4 && values.len() != 6 {
            self.report(BBOX_WRONG_LENGTH, &bbox_path);
        }
    }
}

/// Nesting depth of an array, following first elements. Empty arrays add nothing.
fn array_depth(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.first().map_or(0, |first| 1 + array_depth(first)),
        _ => 0,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn messages(diagnostics: &[Diagnostic]) -> Vec<&str> {
        diagnostics.iter().map(|d| d.message.as_str()).collect()
    }

    #[test]
    fn test_valid_feature_collection_is_clean() {
        let fc = json!({
            "type": "FeatureCollection",
            "bbox": [0, 0, 1, 1],
            "features": [{
                "type": "Feature",
                "id": 7,
                "properties": {"name": "a"},
                "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}
            }]
        });
        assert!(GeoJsonLinter::default().lint(&fc).is_empty());
    }

    #[test]
    fn test_root_must_be_object() {
        let diagnostics = GeoJsonLinter::default().lint(&json!([1, 2, 3]));
        assert_eq!(messages(&diagnostics), vec![ROOT_NOT_OBJECT]);
        assert_eq!(diagnostics[0].path, "");
        assert_eq!(diagnostics[0].line, Some(1));
    }

    #[test]
    fn test_missing_type_stops_descent() {
        let diagnostics = GeoJsonLinter::default().lint(&json!({"features": "nope"}));
        assert_eq!(messages(&diagnostics), vec![MISSING_TYPE]);
    }

    #[test]
    fn test_invalid_feature_type() {
        let fc = json!({
            "type": "FeatureCollection",
            "features": [{"type": "NotFeature", "geometry": {"type": "Point", "coordinates": [0]}}]
        });
        let diagnostics = GeoJsonLinter::default().lint(&fc);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Invalid type 'NotFeature'");
        assert_eq!(diagnostics[0].path, "/features/0/type");
        assert_eq!(diagnostics[0].feature, Some(0));
        assert!(diagnostics[0].line.is_some());
    }

    #[test]
    fn test_feature_members() {
        let fc = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "id": [1], "geometry": null},
                {"type": "Feature", "properties": 5, "geometry": null},
                "not a feature"
            ]
        });
        let diagnostics = GeoJsonLinter::default().lint(&fc);

        assert_eq!(
            messages(&diagnostics),
            vec![
                INVALID_ID,
                "\"properties\" member required",
                "\"properties\" member must be an object or null, but is a number instead",
                FEATURE_NOT_OBJECT,
            ]
        );
        assert_eq!(diagnostics[1].path, "/features/0");
        assert_eq!(diagnostics[2].path, "/features/1/properties");
        assert_eq!(diagnostics[3].feature, Some(2));
    }

    #[test]
    fn test_features_member_required() {
        let diagnostics = GeoJsonLinter::default().lint(&json!({"type": "FeatureCollection"}));
        assert_eq!(messages(&diagnostics), vec!["\"features\" member required"]);

        let empty = json!({"type": "FeatureCollection", "features": []});
        assert!(GeoJsonLinter::default().lint(&empty).is_empty());
    }

    #[test]
    fn test_mixed_depth_siblings_are_reported() {
        let polygon = json!({
            "type": "Polygon",
            "coordinates": [[[0, 0], [4, 0], [4, 4], [0, 0]], [1, 2], 7]
        });
        let diagnostics = GeoJsonLinter::default().lint(&polygon);

        assert_eq!(
            messages(&diagnostics),
            vec![
                "Coordinate position must be an array",
                "Coordinate position must be an array",
                "Coordinate array must only contain nested arrays",
            ]
        );
        let paths: Vec<&str> = diagnostics.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["/coordinates/1/0", "/coordinates/1/1", "/coordinates/2"]);
    }

    #[test]
    fn test_coordinate_depth() {
        let shallow = json!({"type": "Polygon", "coordinates": [[0, 0], [1, 1]]});
        let diagnostics = GeoJsonLinter::default().lint(&shallow);
        assert_eq!(
            messages(&diagnostics),
            vec![
                "Array is not deep enough nested, expected depth 3 for type 'Polygon', \
                 found depth 2"
            ]
        );
        assert_eq!(diagnostics[0].path, "/coordinates");

        let deep = json!({"type": "Point", "coordinates": [[0, 0]]});
        let diagnostics = GeoJsonLinter::default().lint(&deep);
        assert_eq!(
            messages(&diagnostics),
            vec!["Array is too much nested, expected depth 1 for type 'Point', found depth 2"]
        );
    }

    #[test]
    fn test_position_arity_and_numbers() {
        let line = json!({
            "type": "LineString",
            "coordinates": [[0], [1, 2, 3, 4], [1, "2"]]
        });
        let diagnostics = GeoJsonLinter::default().lint(&line);

        assert_eq!(
            messages(&diagnostics),
            vec![POSITION_TOO_SHORT, POSITION_TOO_LONG, POSITION_NOT_NUMERIC]
        );
        assert_eq!(diagnostics[0].path, "/coordinates/0");
        assert_eq!(diagnostics[2].path, "/coordinates/2");
    }

    #[test]
    fn test_geometry_collection_members() {
        let gc = json!({
            "type": "GeometryCollection",
            "geometries": [
                {"type": "Point", "coordinates": [0, 0]},
                false,
                {"type": "Feature"}
            ]
        });
        let diagnostics = GeoJsonLinter::default().lint(&gc);
        assert_eq!(
            messages(&diagnostics),
            vec![MEMBER_GEOMETRY_NOT_OBJECT, "Invalid type 'Feature'"]
        );
        assert_eq!(diagnostics[1].path, "/geometries/2/type");
    }

    #[test]
    fn test_bbox() {
        let point = json!({"type": "Point", "coordinates": [0, 0], "bbox": [0, "a", 1]});
        let diagnostics = GeoJsonLinter::default().lint(&point);
        assert_eq!(messages(&diagnostics), vec![BBOX_NOT_NUMERIC, BBOX_WRONG_LENGTH]);
    }

    #[test]
    fn test_crs_only_reported_when_enabled() {
        let fc = json!({
            "type": "FeatureCollection",
            "crs": {"type": "name", "properties": {"name": "EPSG:3857"}},
            "features": []
        });
        assert!(GeoJsonLinter::new(false).lint(&fc).is_empty());

        let diagnostics = GeoJsonLinter::new(true).lint(&fc);
        assert_eq!(messages(&diagnostics), vec![CRS_DEFINED]);
        assert_eq!(diagnostics[0].path, "/crs");
    }

    #[test]
    fn test_null_geometry_is_allowed() {
        let feature = json!({"type": "Feature", "properties": null, "geometry": null});
        assert!(GeoJsonLinter::default().lint(&feature).is_empty());
    }

    #[test]
    fn test_report_aggregates_repeated_messages() {
        let fc = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {},
                    "geometry": {"type": "Point", "coordinates": [0]}
                },
                {
                    "type": "Feature",
                    "properties": {},
                    "geometry": {"type": "Point", "coordinates": [1]}
                }
            ]
        });
        let report = GeoJsonLinter::default().lint_report(&fc);

        assert_eq!(report.len(), 1);
        let record = report.get(POSITION_TOO_SHORT).unwrap();
        assert_eq!(
            record.paths,
            vec!["/features/0/geometry/coordinates", "/features/1/geometry/coordinates"]
        );
        assert_eq!(record.features, vec![0, 1]);
        assert!(record.lines.iter().all(Option::is_some));
    }
}
