//! Planar geometry kernel adapter
//!
//! Validation only needs a handful of planar predicates. They are reached
//! through [`GeometryKernel`] so the engines never depend on a particular
//! geometry library directly; [`GeoKernel`] implements them with the `geo` crate.

use geo::algorithm::intersects::Intersects;
use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::algorithm::winding_order::{Winding, WindingOrder};
use geo::{Coord, Line, LineString, Polygon};
use geovalid_core::models::{Geometry, Position};

/// Ring orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Clockwise,
    CounterClockwise,
}

/// Planar predicates used by the kernel-view checks and fixes
pub trait GeometryKernel {
    /// Build the kernel view of a geometry. Rings come back closed.
    fn to_kernel(&self, geometry: &Geometry) -> geo::Geometry<f64>;

    /// Orientation of a ring, `None` when the ring is degenerate
    fn orientation(&self, ring: &LineString<f64>) -> Option<Orientation>;

    /// Whether two rings share at least one point
    fn rings_intersect(&self, a: &LineString<f64>, b: &LineString<f64>) -> bool;

    /// Whether a ring crosses or touches itself
    fn ring_self_intersects(&self, ring: &LineString<f64>) -> bool;
}

/// Kernel backed by the `geo` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoKernel;

impl GeometryKernel for GeoKernel {
    fn to_kernel(&self, geometry: &Geometry) -> geo::Geometry<f64> {
        to_geo_geometry(geometry)
    }

    fn orientation(&self, ring: &LineString<f64>) -> Option<Orientation> {
        let mut ring = ring.clone();
        ring.close();
        match ring.winding_order()? {
            WindingOrder::Clockwise => Some(Orientation::Clockwise),
            WindingOrder::CounterClockwise => Some(Orientation::CounterClockwise),
        }
    }

    fn rings_intersect(&self, a: &LineString<f64>, b: &LineString<f64>) -> bool {
        a.intersects(b)
    }

    fn ring_self_intersects(&self, ring: &LineString<f64>) -> bool {
        let segments: Vec<Line<f64>> = ring.lines().filter(|l| l.start != l.end).collect();
        let count = segments.len();
        if count < 3 {
            return false;
        }
        let closed = segments[0].start == segments[count - 1].end;

        for i in 0..count {
            for j in (i + 1)..count {
                let adjacent = j == i + 1 || (closed && i == 0 && j == count - 1);
                match line_intersection(segments[i], segments[j]) {
                    None => {}
                    // Neighbouring segments always share their joint
                    Some(LineIntersection::SinglePoint { .. }) if adjacent => {}
                    Some(_) => return true,
                }
            }
        }
        false
    }
}

fn to_coord(position: &Position) -> Coord<f64> {
    Coord {
        x: position.first().copied().unwrap_or(f64::NAN),
        y: position.get(1).copied().unwrap_or(f64::NAN),
    }
}

fn to_line_string(positions: &[Position]) -> LineString<f64> {
    LineString::new(positions.iter().map(to_coord).collect())
}

fn to_polygon(rings: &[Vec<Position>]) -> Polygon<f64> {
    match rings.split_first() {
        Some((exterior, interiors)) => Polygon::new(
            to_line_string(exterior),
            interiors.iter().map(|ring| to_line_string(ring)).collect(),
        ),
        None => Polygon::new(LineString::new(vec![]), vec![]),
    }
}

/// Convert a document geometry to a `geo::Geometry`.
///
/// Only longitude and latitude are carried over.
pub fn to_geo_geometry(geometry: &Geometry) -> geo::Geometry<f64> {
    match geometry {
        Geometry::Point { coordinates } => geo::Geometry::Point(geo::Point(to_coord(coordinates))),
        Geometry::MultiPoint { coordinates } => geo::Geometry::MultiPoint(geo::MultiPoint::new(
            coordinates.iter().map(|c| geo::Point(to_coord(c))).collect(),
        )),
        Geometry::LineString { coordinates } => {
            geo::Geometry::LineString(to_line_string(coordinates))
        }
        Geometry::MultiLineString { coordinates } => geo::Geometry::MultiLineString(
            geo::MultiLineString::new(coordinates.iter().map(|l| to_line_string(l)).collect()),
        ),
        Geometry::Polygon { coordinates } => geo::Geometry::Polygon(to_polygon(coordinates)),
        Geometry::MultiPolygon { coordinates } => geo::Geometry::MultiPolygon(
            geo::MultiPolygon::new(coordinates.iter().map(|p| to_polygon(p)).collect()),
        ),
        Geometry::GeometryCollection { geometries } => geo::Geometry::GeometryCollection(
            geo::GeometryCollection::new_from(geometries.iter().map(to_geo_geometry).collect()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(coords: &[(f64, f64)]) -> LineString<f64> {
        LineString::from(coords.to_vec())
    }

    #[test]
    fn test_polygon_rings_are_closed() {
        let geometry =
            Geometry::polygon(vec![vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![1.0, 0.0]]]);
        let geo::Geometry::Polygon(polygon) = GeoKernel.to_kernel(&geometry) else {
            panic!("Expected Polygon geometry");
        };
        assert!(polygon.exterior().is_closed());
        assert_eq!(polygon.exterior().0.len(), 4);
    }

    #[test]
    fn test_orientation() {
        let ccw = ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        let cw = ring(&[(0.0, 0.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)]);
        let flat = ring(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (0.0, 0.0)]);

        assert_eq!(GeoKernel.orientation(&ccw), Some(Orientation::CounterClockwise));
        assert_eq!(GeoKernel.orientation(&cw), Some(Orientation::Clockwise));
        assert_eq!(GeoKernel.orientation(&flat), None);
    }

    #[test]
    fn test_orientation_of_unclosed_ring() {
        let cw = ring(&[(0.0, 0.0), (1.0, 1.0), (1.0, 0.0)]);
        assert_eq!(GeoKernel.orientation(&cw), Some(Orientation::Clockwise));
    }

    #[test]
    fn test_self_intersection() {
        let bowtie = ring(&[(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0), (0.0, 0.0)]);
        let square = ring(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0), (0.0, 0.0)]);

        assert!(GeoKernel.ring_self_intersects(&bowtie));
        assert!(!GeoKernel.ring_self_intersects(&square));
    }

    #[test]
    fn test_rings_intersect() {
        let exterior = ring(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0), (0.0, 0.0)]);
        let inside = ring(&[(1.0, 1.0), (1.0, 2.0), (2.0, 2.0), (1.0, 1.0)]);
        let touching = ring(&[(0.0, 0.0), (1.0, 2.0), (2.0, 2.0), (0.0, 0.0)]);

        assert!(!GeoKernel.rings_intersect(&exterior, &inside));
        assert!(GeoKernel.rings_intersect(&exterior, &touching));
    }
}
