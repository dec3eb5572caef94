//! Canonical GeoJSON geometry types used across all geovalid crates.
//!
//! These types mirror the GeoJSON geometry grammar one-to-one. Positions keep
//! every value the document carried (including elevation), so checks that need
//! the original coordinates see exactly what was written.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single coordinate position: longitude, latitude and optional elevation.
pub type Position = Vec<f64>;

/// Geometry type classification
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum GeometryType {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
    GeometryCollection,
}

impl GeometryType {
    /// All geometry types accepted by the validation engine
    pub const ALL: [GeometryType; 7] = [
        GeometryType::Point,
        GeometryType::MultiPoint,
        GeometryType::LineString,
        GeometryType::MultiLineString,
        GeometryType::Polygon,
        GeometryType::MultiPolygon,
        GeometryType::GeometryCollection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryType::Point => "Point",
            GeometryType::MultiPoint => "MultiPoint",
            GeometryType::LineString => "LineString",
            GeometryType::MultiLineString => "MultiLineString",
            GeometryType::Polygon => "Polygon",
            GeometryType::MultiPolygon => "MultiPolygon",
            GeometryType::GeometryCollection => "GeometryCollection",
        }
    }

    /// True for MultiPoint, MultiLineString and MultiPolygon
    pub fn is_multi(&self) -> bool {
        matches!(
            self,
            GeometryType::MultiPoint | GeometryType::MultiLineString | GeometryType::MultiPolygon
        )
    }

    /// True for types that are decomposed into member geometries
    pub fn is_container(&self) -> bool {
        self.is_multi() || *self == GeometryType::GeometryCollection
    }

    /// Required nesting depth of the `coordinates` array.
    ///
    /// `None` for GeometryCollection, which has `geometries` instead.
    pub fn coordinate_depth(&self) -> Option<usize> {
        match self {
            GeometryType::Point => Some(1),
            GeometryType::LineString | GeometryType::MultiPoint => Some(2),
            GeometryType::Polygon | GeometryType::MultiLineString => Some(3),
            GeometryType::MultiPolygon => Some(4),
            GeometryType::GeometryCollection => None,
        }
    }
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeometryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GeometryType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown geometry type: {}", s))
    }
}

/// GeoJSON geometry representation
///
/// Serializes and deserializes as a GeoJSON geometry object. Members other than
/// `type`, `coordinates` and `geometries` are ignored on the way in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    GeometryCollection { geometries: Vec<Geometry> },
}

impl Geometry {
    /// Create a Point geometry
    pub fn point(x: f64, y: f64) -> Self {
        Geometry::Point { coordinates: vec![x, y] }
    }

    /// Create a LineString geometry
    pub fn line_string(coords: Vec<Position>) -> Self {
        Geometry::LineString { coordinates: coords }
    }

    /// Create a Polygon geometry
    pub fn polygon(rings: Vec<Vec<Position>>) -> Self {
        Geometry::Polygon { coordinates: rings }
    }

    /// Get the geometry type
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Geometry::Point { .. } => GeometryType::Point,
            Geometry::MultiPoint { .. } => GeometryType::MultiPoint,
            Geometry::LineString { .. } => GeometryType::LineString,
            Geometry::MultiLineString { .. } => GeometryType::MultiLineString,
            Geometry::Polygon { .. } => GeometryType::Polygon,
            Geometry::MultiPolygon { .. } => GeometryType::MultiPolygon,
            Geometry::GeometryCollection { .. } => GeometryType::GeometryCollection,
        }
    }

    /// Split a container into its member geometries.
    ///
    /// Multi-geometries yield their single-part members in order, a
    /// GeometryCollection yields its geometries, and a single geometry yields
    /// itself.
    pub fn explode(self) -> Vec<Geometry> {
        match self {
            Geometry::MultiPoint { coordinates } => {
                coordinates.into_iter().map(|c| Geometry::Point { coordinates: c }).collect()
            }
            Geometry::MultiLineString { coordinates } => coordinates
                .into_iter()
                .map(|c| Geometry::LineString { coordinates: c })
                .collect(),
            Geometry::MultiPolygon { coordinates } => {
                coordinates.into_iter().map(|c| Geometry::Polygon { coordinates: c }).collect()
            }
            Geometry::GeometryCollection { geometries } => geometries,
            single => vec![single],
        }
    }

    /// The coordinate sequences of a single geometry: the rings of a polygon,
    /// the line of a linestring, or a one-position sequence for a point.
    ///
    /// Containers return an empty list.
    pub fn lines(&self) -> Vec<&[Position]> {
        match self {
            Geometry::Point { coordinates } => vec![std::slice::from_ref(coordinates)],
            Geometry::LineString { coordinates } => vec![coordinates.as_slice()],
            Geometry::Polygon { coordinates } => coordinates.iter().map(|r| r.as_slice()).collect(),
            _ => Vec::new(),
        }
    }

    /// Iterate over every position of a single geometry
    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.lines().into_iter().flat_map(|line| line.iter())
    }

    /// Serialize only the `coordinates` member.
    ///
    /// Returns `None` for GeometryCollection.
    pub fn coordinates_json(&self) -> Option<serde_json::Value> {
        let value = match self {
            Geometry::Point { coordinates } => serde_json::to_value(coordinates),
            Geometry::MultiPoint { coordinates } | Geometry::LineString { coordinates } => {
                serde_json::to_value(coordinates)
            }
            Geometry::MultiLineString { coordinates } | Geometry::Polygon { coordinates } => {
                serde_json::to_value(coordinates)
            }
            Geometry::MultiPolygon { coordinates } => serde_json::to_value(coordinates),
            Geometry::GeometryCollection { .. } => return None,
        };
        value.ok()
    }

    /// Try to parse from a serde_json::Value (GeoJSON)
    pub fn from_geojson(value: &serde_json::Value) -> std::result::Result<Self, serde_json::Error> {
        Geometry::deserialize(value)
    }

    /// Convert to serde_json::Value (GeoJSON)
    pub fn to_geojson(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_geometry_type_parsing() {
        assert_eq!("Polygon".parse::<GeometryType>().unwrap(), GeometryType::Polygon);
        assert_eq!(
            "GeometryCollection".parse::<GeometryType>().unwrap(),
            GeometryType::GeometryCollection
        );
        assert!("polygon".parse::<GeometryType>().is_err());
        assert!("Feature".parse::<GeometryType>().is_err());
    }

    #[test]
    fn test_coordinate_depths() {
        assert_eq!(GeometryType::Point.coordinate_depth(), Some(1));
        assert_eq!(GeometryType::MultiPoint.coordinate_depth(), Some(2));
        assert_eq!(GeometryType::MultiLineString.coordinate_depth(), Some(3));
        assert_eq!(GeometryType::MultiPolygon.coordinate_depth(), Some(4));
        assert_eq!(GeometryType::GeometryCollection.coordinate_depth(), None);
    }

    #[test]
    fn test_parse_keeps_original_coordinates() {
        let value = json!({
            "type": "Polygon",
            "bbox": [0, 0, 1, 1],
            "coordinates": [[[0, 0, 5], [1, 1], [1, 0]]]
        });
        let geometry = Geometry::from_geojson(&value).unwrap();

        let Geometry::Polygon { coordinates } = &geometry else {
            panic!("Expected Polygon geometry");
        };
        assert_eq!(coordinates[0].len(), 3);
        assert_eq!(coordinates[0][0], vec![0.0, 0.0, 5.0]);
    }

    #[test]
    fn test_explode_multipolygon() {
        let value = json!({
            "type": "MultiPolygon",
            "coordinates": [
                [[[0, 0], [1, 0], [1, 1], [0, 0]]],
                [[[5, 5], [6, 5], [6, 6], [5, 5]]]
            ]
        });
        let members = Geometry::from_geojson(&value).unwrap().explode();

        assert_eq!(members.len(), 2);
        assert!(members.iter().all(|g| g.geometry_type() == GeometryType::Polygon));
    }

    #[test]
    fn test_lines_and_positions() {
        let polygon = Geometry::polygon(vec![
            vec![vec![0.0, 0.0], vec![4.0, 0.0], vec![4.0, 4.0], vec![0.0, 0.0]],
            vec![vec![1.0, 1.0], vec![2.0, 2.0], vec![2.0, 1.0], vec![1.0, 1.0]],
        ]);
        assert_eq!(polygon.lines().len(), 2);
        assert_eq!(polygon.positions().count(), 8);

        let point = Geometry::point(1.0, 2.0);
        assert_eq!(point.positions().count(), 1);
    }

    #[test]
    fn test_unknown_type_fails_to_parse() {
        let value = json!({"type": "Circle", "coordinates": [0, 0]});
        assert!(Geometry::from_geojson(&value).is_err());
    }
}
