//! Criterion check functions
//!
//! Raw checks look at the coordinates exactly as written, because the kernel
//! view has its rings closed already. Kernel checks work on the `geo` view
//! through a [`GeometryKernel`].

use crate::kernel::{GeometryKernel, Orientation};
use geovalid_core::config::{DEFAULT_MAX_VERTICES, DEFAULT_PRECISION};
use geovalid_core::models::{Geometry, Position};
use std::collections::HashSet;

/// Tunables for the raw checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckSettings {
    /// Maximum number of decimal places before a value counts as excessive
    pub precision: usize,
    /// Maximum number of positions in a single ring or line
    pub max_vertices: usize,
    /// Only scan the first N positions of each ring for precision and
    /// dimension checks. `None` scans everything.
    pub sample_size: Option<usize>,
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self { precision: DEFAULT_PRECISION, max_vertices: DEFAULT_MAX_VERTICES, sample_size: None }
    }
}

impl CheckSettings {
    fn sampled<'a>(&self, line: &'a [Position]) -> &'a [Position] {
        match self.sample_size {
            Some(n) if n < line.len() => &line[..n],
            _ => line,
        }
    }
}

/// Hashable identity of a position; `-0.0` and `0.0` are the same node
pub(crate) fn position_key(position: &Position) -> Vec<u64> {
    position.iter().map(|v| if *v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() }).collect()
}

fn is_closed(line: &[Position]) -> bool {
    match (line.first(), line.last()) {
        (Some(first), Some(last)) => first == last,
        _ => true,
    }
}

fn unique_count(line: &[Position]) -> usize {
    line.iter().map(position_key).collect::<HashSet<_>>().len()
}

fn decimal_places(value: f64) -> usize {
    let text = value.to_string();
    text.split_once('.').map_or(0, |(_, fraction)| fraction.len())
}

pub fn unclosed(geometry: &Geometry, _: &CheckSettings) -> bool {
    geometry.lines().into_iter().any(|ring| !is_closed(ring))
}

pub fn less_three_unique_nodes(geometry: &Geometry, _: &CheckSettings) -> bool {
    geometry.lines().into_iter().any(|ring| unique_count(ring) < 3)
}

/// Repeated positions, not counting the duplicate that closes a ring
pub fn duplicate_nodes(geometry: &Geometry, _: &CheckSettings) -> bool {
    geometry.lines().into_iter().any(|line| {
        let unique = unique_count(line);
        let closing_only = is_closed(line) && unique + 1 == line.len();
        unique < line.len() && !closing_only
    })
}

pub fn outside_lat_lon_boundaries(geometry: &Geometry, _: &CheckSettings) -> bool {
    geometry.positions().any(|position| {
        let lon = position.first().copied().unwrap_or_default();
        let lat = position.get(1).copied().unwrap_or_default();
        !((-180.0..=180.0).contains(&lon) && (-90.0..=90.0).contains(&lat))
    })
}

pub fn excessive_coordinate_precision(geometry: &Geometry, settings: &CheckSettings) -> bool {
    geometry.lines().into_iter().any(|line| {
        settings
            .sampled(line)
            .iter()
            .flat_map(|position| position.iter().take(2))
            .any(|value| decimal_places(*value) > settings.precision)
    })
}

pub fn excessive_vertices(geometry: &Geometry, settings: &CheckSettings) -> bool {
    geometry.lines().into_iter().any(|line| line.len() > settings.max_vertices)
}

pub fn more_than_2d_coordinates(geometry: &Geometry, settings: &CheckSettings) -> bool {
    geometry
        .lines()
        .into_iter()
        .any(|line| settings.sampled(line).iter().any(|position| position.len() > 2))
}

/// A jump of more than half the globe between consecutive positions
pub fn crosses_antimeridian(geometry: &Geometry, _: &CheckSettings) -> bool {
    let normalized = |position: &Position| {
        let lon = position.first().copied().unwrap_or_default();
        (lon + 180.0).rem_euclid(360.0) - 180.0
    };
    geometry.lines().into_iter().any(|line| {
        line.windows(2).any(|pair| (normalized(&pair[1]) - normalized(&pair[0])).abs() > 180.0)
    })
}

pub fn exterior_not_ccw(kernel: &dyn GeometryKernel, geometry: &geo::Geometry<f64>) -> bool {
    match geometry {
        geo::Geometry::Polygon(polygon) => {
            kernel.orientation(polygon.exterior()) == Some(Orientation::Clockwise)
        }
        _ => false,
    }
}

pub fn interior_not_cw(kernel: &dyn GeometryKernel, geometry: &geo::Geometry<f64>) -> bool {
    match geometry {
        geo::Geometry::Polygon(polygon) => polygon
            .interiors()
            .iter()
            .any(|ring| kernel.orientation(ring) == Some(Orientation::CounterClockwise)),
        _ => false,
    }
}

pub fn inner_and_exterior_ring_intersect(
    kernel: &dyn GeometryKernel,
    geometry: &geo::Geometry<f64>,
) -> bool {
    match geometry {
        geo::Geometry::Polygon(polygon) => polygon
            .interiors()
            .iter()
            .any(|ring| kernel.rings_intersect(polygon.exterior(), ring)),
        _ => false,
    }
}

pub fn holes(_: &dyn GeometryKernel, geometry: &geo::Geometry<f64>) -> bool {
    matches!(geometry, geo::Geometry::Polygon(polygon) if !polygon.interiors().is_empty())
}

pub fn self_intersection(kernel: &dyn GeometryKernel, geometry: &geo::Geometry<f64>) -> bool {
    match geometry {
        geo::Geometry::Polygon(polygon) => std::iter::once(polygon.exterior())
            .chain(polygon.interiors())
            .any(|ring| kernel.ring_self_intersects(ring)),
        _ => false,
    }
}
