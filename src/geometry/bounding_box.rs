//! Axis-aligned bounding boxes.
//!
//! This module provides 2D bounding boxes in scaled integer coordinates
//! and 3D bounding boxes in millimetre floating-point coordinates (the
//! mesh domain), mirroring BambuStudio's BoundingBox classes.

use super::{Point, Vec3};
use crate::{Coord, CoordF};
use serde::{Deserialize, Serialize};

/// A 2D axis-aligned bounding box in scaled integer coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
    defined: bool,
}

impl BoundingBox {
    /// Create an undefined (empty) bounding box.
    pub fn new() -> Self {
        Self {
            min: Point::new(Coord::MAX, Coord::MAX),
            max: Point::new(Coord::MIN, Coord::MIN),
            defined: false,
        }
    }

    /// Create a bounding box covering a set of points.
    pub fn from_points(points: &[Point]) -> Self {
        let mut bb = Self::new();
        for p in points {
            bb.merge_point(*p);
        }
        bb
    }

    /// Expand to contain a point.
    pub fn merge_point(&mut self, p: Point) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.defined = true;
    }

    /// Whether any point has been merged.
    #[inline]
    pub fn is_defined(&self) -> bool {
        self.defined
    }

    /// Size of the box (zero when undefined).
    pub fn size(&self) -> Point {
        if self.defined {
            self.max - self.min
        } else {
            Point::zero()
        }
    }

    /// Check whether a point lies inside the box (inclusive).
    pub fn contains(&self, p: &Point) -> bool {
        self.defined
            && p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new()
    }
}

/// A 3D axis-aligned bounding box in millimetre coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox3F {
    pub min: Vec3,
    pub max: Vec3,
    defined: bool,
}

impl BoundingBox3F {
    /// Create an undefined (empty) bounding box.
    pub fn new() -> Self {
        Self {
            min: Vec3::new(CoordF::MAX, CoordF::MAX, CoordF::MAX),
            max: Vec3::new(CoordF::MIN, CoordF::MIN, CoordF::MIN),
            defined: false,
        }
    }

    /// Expand to contain a point.
    pub fn merge_point(&mut self, p: Vec3) {
        self.min = self.min.min_components(&p);
        self.max = self.max.max_components(&p);
        self.defined = true;
    }

    /// Whether any point has been merged.
    #[inline]
    pub fn is_defined(&self) -> bool {
        self.defined
    }

    /// Size of the box (zero when undefined).
    pub fn size(&self) -> Vec3 {
        if self.defined {
            self.max - self.min
        } else {
            Vec3::zero()
        }
    }

    /// Center of the box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

impl Default for BoundingBox3F {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_from_points() {
        let bb = BoundingBox::from_points(&[
            Point::new(10, -20),
            Point::new(-5, 40),
            Point::new(0, 0),
        ]);
        assert!(bb.is_defined());
        assert_eq!(bb.min, Point::new(-5, -20));
        assert_eq!(bb.max, Point::new(10, 40));
        assert_eq!(bb.size(), Point::new(15, 60));
    }

    #[test]
    fn test_bounding_box_empty() {
        let bb = BoundingBox::new();
        assert!(!bb.is_defined());
        assert_eq!(bb.size(), Point::zero());
        assert!(!bb.contains(&Point::zero()));
    }

    #[test]
    fn test_bounding_box_contains() {
        let bb = BoundingBox::from_points(&[Point::new(0, 0), Point::new(100, 100)]);
        assert!(bb.contains(&Point::new(50, 50)));
        assert!(bb.contains(&Point::new(0, 100)));
        assert!(!bb.contains(&Point::new(-1, 50)));
    }

    #[test]
    fn test_bounding_box3f_merge() {
        let mut bb = BoundingBox3F::new();
        bb.merge_point(Vec3::new(1.0, 2.0, 3.0));
        bb.merge_point(Vec3::new(-1.0, 5.0, 0.0));
        assert!(bb.is_defined());
        assert_eq!(bb.min, Vec3::new(-1.0, 2.0, 0.0));
        assert_eq!(bb.max, Vec3::new(1.0, 5.0, 3.0));
        assert_eq!(bb.center(), Vec3::new(0.0, 3.5, 1.5));
        assert_eq!(bb.size(), Vec3::new(2.0, 3.0, 3.0));
        assert_eq!(BoundingBox3F::new().size(), Vec3::zero());
    }
}
