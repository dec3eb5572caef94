//! Criterion registry
//!
//! Every validation criterion is a [`Criterion`] variant. Its category,
//! the geometry types it applies to, and the view of the geometry its check
//! needs are fixed in [`Criterion::descriptor`]; the check and fix functions are
//! bound in [`Criterion::check`] and [`Criterion::fixer`].

use crate::checks::{self, CheckSettings};
use crate::fix::{self, FixFn};
use crate::kernel::GeometryKernel;
use geovalid_core::error::{Error, Result};
use geovalid_core::models::{Geometry, GeometryType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use GeometryType::{LineString, Point, Polygon};

/// Criterion category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Not valid according to the GeoJSON specification
    Invalid,
    /// Valid, but known to cause trouble in common tools
    Problematic,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Invalid => f.write_str("invalid"),
            Category::Problematic => f.write_str("problematic"),
        }
    }
}

/// The view of a geometry a check works on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Coordinates exactly as written in the document
    RawCoordinates,
    /// Kernel geometry; rings are already closed
    KernelGeometry,
}

/// Validation criteria, in registry order
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Unclosed,
    LessThreeUniqueNodes,
    DuplicateNodes,
    ExteriorNotCcw,
    InteriorNotCw,
    InnerAndExteriorRingIntersect,
    OutsideLatLonBoundaries,
    Holes,
    SelfIntersection,
    ExcessiveCoordinatePrecision,
    ExcessiveVertices,
    #[serde(rename = "more_than_2d_coordinates")]
    MoreThan2dCoordinates,
    CrossesAntimeridian,
}

/// Static description of a criterion
#[derive(Debug, Clone, Copy)]
pub struct CriterionDescriptor {
    pub criterion: Criterion,
    pub name: &'static str,
    pub category: Category,
    pub applicable_types: &'static [GeometryType],
    pub input_kind: InputKind,
}

impl CriterionDescriptor {
    pub fn applies_to(&self, geometry_type: GeometryType) -> bool {
        self.applicable_types.contains(&geometry_type)
    }
}

/// A check bound to the view it needs
#[derive(Clone, Copy)]
pub enum Check {
    Raw(fn(&Geometry, &CheckSettings) -> bool),
    Kernel(fn(&dyn GeometryKernel, &geo::Geometry<f64>) -> bool),
}

impl Criterion {
    pub const ALL: [Criterion; 13] = [
        Criterion::Unclosed,
        Criterion::LessThreeUniqueNodes,
        Criterion::DuplicateNodes,
        Criterion::ExteriorNotCcw,
        Criterion::InteriorNotCw,
        Criterion::InnerAndExteriorRingIntersect,
        Criterion::OutsideLatLonBoundaries,
        Criterion::Holes,
        Criterion::SelfIntersection,
        Criterion::ExcessiveCoordinatePrecision,
        Criterion::ExcessiveVertices,
        Criterion::MoreThan2dCoordinates,
        Criterion::CrossesAntimeridian,
    ];

    /// Criteria with a registered fix, in the order fixes are applied
    pub const FIXABLE: [Criterion; 4] = [
        Criterion::Unclosed,
        Criterion::DuplicateNodes,
        Criterion::ExteriorNotCcw,
        Criterion::InteriorNotCw,
    ];

    pub fn descriptor(&self) -> CriterionDescriptor {
        use Category::{Invalid, Problematic};
        use InputKind::{KernelGeometry, RawCoordinates};

        let (name, category, applicable_types, input_kind): (_, _, &'static [GeometryType], _) =
            match self {
                Criterion::Unclosed => ("unclosed", Invalid, &[Polygon], RawCoordinates),
                Criterion::LessThreeUniqueNodes => {
                    ("less_three_unique_nodes", Invalid, &[Polygon], RawCoordinates)
                }
                Criterion::DuplicateNodes => {
                    ("duplicate_nodes", Invalid, &[LineString, Polygon], RawCoordinates)
                }
                Criterion::ExteriorNotCcw => {
                    ("exterior_not_ccw", Invalid, &[Polygon], KernelGeometry)
                }
                Criterion::InteriorNotCw => {
                    ("interior_not_cw", Invalid, &[Polygon], KernelGeometry)
                }
                Criterion::InnerAndExteriorRingIntersect => {
                    ("inner_and_exterior_ring_intersect", Invalid, &[Polygon], KernelGeometry)
                }
                Criterion::OutsideLatLonBoundaries => (
                    "outside_lat_lon_boundaries",
                    Invalid,
                    &[Point, LineString, Polygon],
                    RawCoordinates,
                ),
                Criterion::Holes => ("holes", Problematic, &[Polygon], KernelGeometry),
                Criterion::SelfIntersection => {
                    ("self_intersection", Problematic, &[Polygon], KernelGeometry)
                }
                Criterion::ExcessiveCoordinatePrecision => (
                    "excessive_coordinate_precision",
                    Problematic,
                    &[Point, LineString, Polygon],
                    RawCoordinates,
                ),
                Criterion::ExcessiveVertices => {
                    ("excessive_vertices", Problematic, &[LineString, Polygon], RawCoordinates)
                }
                Criterion::MoreThan2dCoordinates => (
                    "more_than_2d_coordinates",
                    Problematic,
                    &[Point, LineString, Polygon],
                    RawCoordinates,
                ),
                Criterion::CrossesAntimeridian => {
                    ("crosses_antimeridian", Problematic, &[LineString, Polygon], RawCoordinates)
                }
            };

        CriterionDescriptor { criterion: *self, name, category, applicable_types, input_kind }
    }

    pub fn name(&self) -> &'static str {
        self.descriptor().name
    }

    pub fn category(&self) -> Category {
        self.descriptor().category
    }

    /// The check function, bound to the view named by the descriptor
    pub fn check(&self) -> Check {
        match self {
            Criterion::Unclosed => Check::Raw(checks::unclosed),
            Criterion::LessThreeUniqueNodes => Check::Raw(checks::less_three_unique_nodes),
            Criterion::DuplicateNodes => Check::Raw(checks::duplicate_nodes),
            Criterion::ExteriorNotCcw => Check::Kernel(checks::exterior_not_ccw),
            Criterion::InteriorNotCw => Check::Kernel(checks::interior_not_cw),
            Criterion::InnerAndExteriorRingIntersect => {
                Check::Kernel(checks::inner_and_exterior_ring_intersect)
            }
            Criterion::OutsideLatLonBoundaries => Check::Raw(checks::outside_lat_lon_boundaries),
            Criterion::Holes => Check::Kernel(checks::holes),
            Criterion::SelfIntersection => Check::Kernel(checks::self_intersection),
            Criterion::ExcessiveCoordinatePrecision => {
                Check::Raw(checks::excessive_coordinate_precision)
            }
            Criterion::ExcessiveVertices => Check::Raw(checks::excessive_vertices),
            Criterion::MoreThan2dCoordinates => Check::Raw(checks::more_than_2d_coordinates),
            Criterion::CrossesAntimeridian => Check::Raw(checks::crosses_antimeridian),
        }
    }

    /// The fix function, if this criterion can be repaired automatically
    pub fn fixer(&self) -> Option<FixFn> {
        match self {
            Criterion::Unclosed => Some(fix::close_rings),
            Criterion::DuplicateNodes => Some(fix::remove_duplicate_nodes),
            Criterion::ExteriorNotCcw => Some(fix::orient_exterior_ccw),
            Criterion::InteriorNotCw => Some(fix::orient_interiors_cw),
            _ => None,
        }
    }

    pub fn fixable(&self) -> bool {
        self.fixer().is_some()
    }

    /// All criteria of a category, in registry order
    pub fn of_category(category: Category) -> impl Iterator<Item = Criterion> {
        Criterion::ALL.into_iter().filter(move |c| c.category() == category)
    }

    /// Names of all criteria of a category, in registry order
    pub fn names(category: Category) -> Vec<&'static str> {
        Criterion::of_category(category).map(|c| c.name()).collect()
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Criterion {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Criterion::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| format!("Unknown criterion: {}", s))
    }
}

/// Resolve selected criterion names against one category of the registry
pub fn check_criteria<S: AsRef<str>>(selected: &[S], category: Category) -> Result<Vec<Criterion>> {
    let criteria = selected
        .iter()
        .map(|name| {
            let name = name.as_ref();
            name.parse::<Criterion>()
                .ok()
                .filter(|c| c.category() == category)
                .ok_or_else(|| Error::UnknownCriterion {
                    name: name.to_string(),
                    category: category.to_string(),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    if !criteria.is_empty() {
        tracing::info!(
            "Validation criteria '{}': {}",
            category,
            criteria.iter().map(Criterion::name).collect::<Vec<_>>().join(", ")
        );
    }
    Ok(criteria)
}
