use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Kind of place an agent can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlaceKind {
    Household,
    School,
    Workplace,
}

impl PlaceKind {
    pub const ALL: [PlaceKind; 3] = [PlaceKind::Household, PlaceKind::School, PlaceKind::Workplace];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceKind::Household => "household",
            PlaceKind::School => "school",
            PlaceKind::Workplace => "workplace",
        }
    }
}

impl fmt::Display for PlaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fixed location with an ID unique within its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub kind: PlaceKind,
    pub id: u32,
    pub x: f64,
    pub y: f64,
}

/// A synthetic individual.
///
/// `school_id` and `workplace_id` are `0` when the agent is not attached to a
/// place of that kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub is_student: bool,
    pub is_worker: bool,
    pub age: u32,
    pub x: f64,
    pub y: f64,
    pub household_id: u32,
    pub school_id: u32,
    pub workplace_id: u32,
    pub infected: bool,
}

/// Closed interval on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Boundary-inclusive containment.
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// True when both ends are finite, `min < max`, and the width `max - min`
    /// is itself finite.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.min < self.max
            && (self.max - self.min).is_finite()
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Bounding rectangle for all generated places.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SpatialBounds {
    pub x: Bounds,
    pub y: Bounds,
}

impl SpatialBounds {
    pub const fn new(x: Bounds, y: Bounds) -> Self {
        Self { x, y }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.x.contains(x) && self.y.contains(y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        let bounds = Bounds::new(10.0, 150.0);
        assert!(bounds.contains(10.0));
        assert!(bounds.contains(150.0));
        assert!(!bounds.contains(9.0));
        assert!(!bounds.contains(151.0));
    }

    #[test]
    fn inverted_or_degenerate_bounds_are_invalid() {
        assert!(!Bounds::new(5.0, 5.0).is_valid());
        assert!(!Bounds::new(6.0, 5.0).is_valid());
        assert!(!Bounds::new(0.0, f64::INFINITY).is_valid());
        assert!(!Bounds::new(-1e308, 1e308).is_valid());
        assert!(!Bounds::new(f64::MIN, f64::MAX).is_valid());
        assert!(Bounds::new(0.0, 1.4804).is_valid());
    }
}
