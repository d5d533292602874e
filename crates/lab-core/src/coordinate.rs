//! Cartesian coordinates in millimeters.
//!
//! All labware geometry is expressed in a right-handed coordinate system
//! with the origin at the front-left-bottom corner of the parent resource.
//! Locations stored on a resource are relative to its parent; absolute
//! locations are obtained by summing along the tree.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A point in 3D space, in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The origin, `(0, 0, 0)`.
    pub fn zero() -> Self {
        Self::default()
    }
}

impl Add for Coordinate {
    type Output = Coordinate;

    fn add(self, rhs: Coordinate) -> Coordinate {
        Coordinate::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Coordinate {
    type Output = Coordinate;

    fn sub(self, rhs: Coordinate) -> Coordinate {
        Coordinate::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::fmt::Display for Coordinate {
    /// Formats as `(100.000, 063.000, 100.000)`, the fixed-width layout
    /// used by deck summaries.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:07.3}, {:07.3}, {:07.3})", self.x, self.y, self.z)
    }
}
