//! Point types with scaled integer and floating-point coordinates.
//!
//! This module provides the 2D and 3D point types used throughout the
//! slicing core, mirroring BambuStudio's Point classes. All geometric
//! predicates operate on the scaled integer types; floating point is only
//! used at the mesh-ingestion boundary.

use crate::{scale, unscale, Coord, CoordF};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// A 2D point with scaled integer coordinates.
///
/// Equality and ordering are exact; products are widened to `i128` so no
/// predicate loses precision to cancellation.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: Coord,
    pub y: Coord,
}

impl Point {
    /// Create a new point from scaled coordinates.
    #[inline]
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    /// Create a point from millimetre coordinates, scaling them.
    #[inline]
    pub fn new_scale(x: CoordF, y: CoordF) -> Self {
        Self {
            x: scale(x),
            y: scale(y),
        }
    }

    /// The origin.
    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0, y: 0 }
    }

    /// Dot product, widened to `i128`.
    #[inline]
    pub fn dot(&self, other: &Point) -> i128 {
        self.x as i128 * other.x as i128 + self.y as i128 * other.y as i128
    }

    /// 2D cross product (z component of the 3D cross), widened to `i128`.
    #[inline]
    pub fn cross(&self, other: &Point) -> i128 {
        self.x as i128 * other.y as i128 - self.y as i128 * other.x as i128
    }

    /// Squared length, widened to `i128`.
    #[inline]
    pub fn length_squared(&self) -> i128 {
        self.dot(self)
    }

    /// Length in scaled units.
    #[inline]
    pub fn length(&self) -> CoordF {
        (self.length_squared() as CoordF).sqrt()
    }

    /// Squared distance to another point, widened to `i128`.
    #[inline]
    pub fn distance_squared(&self, other: &Point) -> i128 {
        (*self - *other).length_squared()
    }

    /// Distance to another point in scaled units.
    #[inline]
    pub fn distance(&self, other: &Point) -> CoordF {
        (self.distance_squared(other) as CoordF).sqrt()
    }

    /// Check whether two points coincide within a tolerance (per axis).
    #[inline]
    pub fn coincides_with(&self, other: &Point, tolerance: Coord) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }

    /// Convert to a floating-point point in millimetres.
    #[inline]
    pub fn to_mm(&self) -> PointF {
        PointF {
            x: unscale(self.x),
            y: unscale(self.y),
        }
    }

    /// Convert to a floating-point point in scaled units.
    #[inline]
    pub fn to_f64(&self) -> PointF {
        PointF {
            x: self.x as CoordF,
            y: self.y as CoordF,
        }
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", unscale(self.x), unscale(self.y))
    }
}

impl Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl AddAssign for Point {
    #[inline]
    fn add_assign(&mut self, other: Point) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl Sub for Point {
    type Output = Point;

    #[inline]
    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

impl SubAssign for Point {
    #[inline]
    fn sub_assign(&mut self, other: Point) {
        self.x -= other.x;
        self.y -= other.y;
    }
}

impl Neg for Point {
    type Output = Point;

    #[inline]
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl Mul<CoordF> for Point {
    type Output = Point;

    #[inline]
    fn mul(self, factor: CoordF) -> Point {
        Point::new(
            (self.x as CoordF * factor).round() as Coord,
            (self.y as CoordF * factor).round() as Coord,
        )
    }
}

/// Type alias for a collection of points.
pub type Points = Vec<Point>;

/// A 3D point with scaled integer coordinates.
///
/// Used by the plane intersection predicate, which performs all its
/// comparisons and interpolation in the integer domain.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point3 {
    pub x: Coord,
    pub y: Coord,
    pub z: Coord,
}

impl Point3 {
    /// Create a new 3D point from scaled coordinates.
    #[inline]
    pub const fn new(x: Coord, y: Coord, z: Coord) -> Self {
        Self { x, y, z }
    }

    /// Create a 3D point from millimetre coordinates, scaling them.
    #[inline]
    pub fn new_scale(x: CoordF, y: CoordF, z: CoordF) -> Self {
        Self {
            x: scale(x),
            y: scale(y),
            z: scale(z),
        }
    }

    /// Project onto the XY plane.
    #[inline]
    pub fn xy(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl fmt::Debug for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A 2D point with floating-point coordinates.
///
/// Used where exactness does not matter: tangent directions, angles and
/// gap-closing scores.
#[derive(Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointF {
    pub x: CoordF,
    pub y: CoordF,
}

impl PointF {
    /// Create a new floating-point point.
    #[inline]
    pub const fn new(x: CoordF, y: CoordF) -> Self {
        Self { x, y }
    }

    /// Dot product.
    #[inline]
    pub fn dot(&self, other: &PointF) -> CoordF {
        self.x * other.x + self.y * other.y
    }

    /// 2D cross product.
    #[inline]
    pub fn cross(&self, other: &PointF) -> CoordF {
        self.x * other.y - self.y * other.x
    }

    /// Length.
    #[inline]
    pub fn length(&self) -> CoordF {
        self.dot(self).sqrt()
    }

    /// Squared distance to another point.
    #[inline]
    pub fn distance_squared(&self, other: &PointF) -> CoordF {
        let d = *self - *other;
        d.dot(&d)
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(&self, other: &PointF) -> CoordF {
        self.distance_squared(other).sqrt()
    }

    /// Perpendicular vector (rotated 90 degrees counter-clockwise).
    #[inline]
    pub fn perp(&self) -> PointF {
        PointF::new(-self.y, self.x)
    }

    /// Normalize to unit length. Returns the zero vector unchanged.
    pub fn normalize(&self) -> PointF {
        let len = self.length();
        if len > 0.0 {
            PointF::new(self.x / len, self.y / len)
        } else {
            *self
        }
    }

    /// Angle from the positive x-axis, in radians.
    #[inline]
    pub fn angle(&self) -> CoordF {
        self.y.atan2(self.x)
    }
}

impl fmt::Debug for PointF {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.x, self.y)
    }
}

impl Add for PointF {
    type Output = PointF;

    #[inline]
    fn add(self, other: PointF) -> PointF {
        PointF::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for PointF {
    type Output = PointF;

    #[inline]
    fn sub(self, other: PointF) -> PointF {
        PointF::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<CoordF> for PointF {
    type Output = PointF;

    #[inline]
    fn mul(self, factor: CoordF) -> PointF {
        PointF::new(self.x * factor, self.y * factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_new_scale() {
        let p = Point::new_scale(1.0, -0.5);
        assert_eq!(p.x, 1_000_000);
        assert_eq!(p.y, -500_000);
    }

    #[test]
    fn test_point_exact_equality() {
        // Converting the same millimetre value twice yields identical coords
        let a = Point::new_scale(1.2345, 6.789);
        let b = Point::new_scale(1.2345, 6.789);
        assert_eq!(a, b);
    }

    #[test]
    fn test_point_arithmetic() {
        let a = Point::new(10, 20);
        let b = Point::new(3, 4);
        assert_eq!(a + b, Point::new(13, 24));
        assert_eq!(a - b, Point::new(7, 16));
        assert_eq!(-b, Point::new(-3, -4));
    }

    #[test]
    fn test_point_cross_dot() {
        let a = Point::new(1, 0);
        let b = Point::new(0, 1);
        assert_eq!(a.cross(&b), 1);
        assert_eq!(a.dot(&b), 0);
    }

    #[test]
    fn test_point_cross_no_overflow() {
        // Values near the top of the plausible coordinate range must not
        // overflow the widened products.
        let a = Point::new(2_000_000_000_000, 1);
        let b = Point::new(1, 2_000_000_000_000);
        assert_eq!(a.cross(&b), 4_000_000_000_000_000_000_000_000 - 1);
    }

    #[test]
    fn test_point_distance() {
        let a = Point::new(0, 0);
        let b = Point::new(3_000_000, 4_000_000);
        assert_eq!(a.distance_squared(&b), 25_000_000_000_000);
        assert!((a.distance(&b) - 5_000_000.0).abs() < 1.0);
        assert!((b.length() - 5_000_000.0).abs() < 1.0);
        let mm = b.to_mm();
        assert!((mm.x - 3.0).abs() < 1e-9);
        assert!((mm.y - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_point_coincides_with() {
        let a = Point::new(100, 100);
        let b = Point::new(105, 98);
        assert!(a.coincides_with(&b, 5));
        assert!(!a.coincides_with(&b, 2));
    }

    #[test]
    fn test_point3_xy() {
        let p = Point3::new_scale(1.0, 2.0, 3.0);
        assert_eq!(p, Point3::new(1_000_000, 2_000_000, 3_000_000));
        assert_eq!(p.xy(), Point::new(1_000_000, 2_000_000));
        assert_eq!(p.z, 3_000_000);
    }

    #[test]
    fn test_pointf_normalize() {
        let v = PointF::new(3.0, 4.0);
        let n = v.normalize();
        assert!((n.length() - 1.0).abs() < 1e-12);
        assert!((n.x - 0.6).abs() < 1e-12);

        let zero = PointF::new(0.0, 0.0);
        assert_eq!(zero.normalize(), zero);
    }

    #[test]
    fn test_pointf_perp() {
        let v = PointF::new(1.0, 0.0);
        let p = v.perp();
        assert!((p.x - 0.0).abs() < 1e-12);
        assert!((p.y - 1.0).abs() < 1e-12);
        // perp is a 90 degree CCW rotation
        assert!((v.cross(&p) - 1.0).abs() < 1e-12);
        assert!((p.angle() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }
}
