//! Polyline type for open paths.
//!
//! This module provides the Polyline type representing an open path (sequence of
//! connected line segments), mirroring BambuStudio's Polyline class. The segment
//! chaining engine uses polylines as its working representation while stitching
//! slice segments into closed contours.

use super::{Point, PointF, Polygon};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Deref, Index};

/// An open polyline defined by a sequence of points.
///
/// Unlike a Polygon, a Polyline is not implicitly closed - it's a path from
/// the first point to the last point.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Point>,
}

impl Polyline {
    /// Create a new empty polyline.
    #[inline]
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create a polyline from a vector of points.
    #[inline]
    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Get the points of this polyline.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Consume the polyline and return its points.
    #[inline]
    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    /// Get the number of points in the polyline.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the polyline is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Add a point to the polyline.
    #[inline]
    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Get the first point, panicking if empty.
    #[inline]
    pub fn first_point(&self) -> Point {
        self.points[0]
    }

    /// Get the last point, panicking if empty.
    #[inline]
    pub fn last_point(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// Reverse the order of points in the polyline.
    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Check if this polyline is closed (first point equals last point).
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.points.len() >= 2 && self.points.first() == self.points.last()
    }

    /// Append another polyline to this one.
    pub fn append(&mut self, other: &Polyline) {
        self.points.extend_from_slice(&other.points);
    }

    /// Outward unit tangent at the last point (direction the path would
    /// continue in). None when the polyline has fewer than two distinct
    /// trailing points.
    pub fn end_direction(&self) -> Option<PointF> {
        let n = self.points.len();
        if n < 2 {
            return None;
        }
        let dir = (self.points[n - 1] - self.points[n - 2]).to_f64();
        if dir.length() > 0.0 {
            Some(dir.normalize())
        } else {
            None
        }
    }

    /// Outward unit tangent at the first point (direction away from the
    /// path).
    pub fn start_direction(&self) -> Option<PointF> {
        let n = self.points.len();
        if n < 2 {
            return None;
        }
        let dir = (self.points[0] - self.points[1]).to_f64();
        if dir.length() > 0.0 {
            Some(dir.normalize())
        } else {
            None
        }
    }

    /// Convert to a closed polygon. The duplicated closing point, if the
    /// ends already coincide, is dropped.
    pub fn into_polygon(mut self) -> Polygon {
        if self.is_closed() {
            self.points.pop();
        }
        Polygon::from_points(self.points)
    }

    /// Convert to an open polygon (for unresolved chains).
    pub fn into_open_polygon(self) -> Polygon {
        Polygon::open_from_points(self.points)
    }
}

impl fmt::Debug for Polyline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Polyline({} points)", self.points.len())
    }
}

impl Deref for Polyline {
    type Target = [Point];

    fn deref(&self) -> &Self::Target {
        &self.points
    }
}

impl Index<usize> for Polyline {
    type Output = Point;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl FromIterator<Point> for Polyline {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Point>> for Polyline {
    fn from(points: Vec<Point>) -> Self {
        Self::from_points(points)
    }
}

/// Type alias for a collection of polylines.
pub type Polylines = Vec<Polyline>;

#[cfg(test)]
mod tests {
    use super::*;

    fn make_polyline() -> Polyline {
        Polyline::from_points(vec![
            Point::new(0, 0),
            Point::new(100, 0),
            Point::new(100, 100),
            Point::new(0, 100),
        ])
    }

    #[test]
    fn test_polyline_new() {
        let pl = Polyline::new();
        assert!(pl.is_empty());
        assert_eq!(pl.len(), 0);
    }

    #[test]
    fn test_polyline_first_last() {
        let pl = make_polyline();
        assert_eq!(pl.first_point(), Point::new(0, 0));
        assert_eq!(pl.last_point(), Point::new(0, 100));
    }

    #[test]
    fn test_polyline_is_closed() {
        let pl = make_polyline();
        assert!(!pl.is_closed());

        let closed = Polyline::from_points(vec![
            Point::new(0, 0),
            Point::new(100, 0),
            Point::new(100, 100),
            Point::new(0, 0),
        ]);
        assert!(closed.is_closed());
    }

    #[test]
    fn test_polyline_reverse() {
        let mut pl = make_polyline();
        pl.reverse();
        assert_eq!(pl.first_point(), Point::new(0, 100));
        assert_eq!(pl.last_point(), Point::new(0, 0));
    }

    #[test]
    fn test_polyline_append() {
        let mut pl1 = Polyline::from_points(vec![Point::new(0, 0), Point::new(100, 0)]);
        let pl2 = Polyline::from_points(vec![Point::new(100, 0), Point::new(100, 100)]);
        pl1.append(&pl2);
        assert_eq!(pl1.len(), 4);
    }

    #[test]
    fn test_polyline_end_direction() {
        let pl = make_polyline();
        let dir = pl.end_direction().unwrap();
        // Last edge runs in -x
        assert!((dir.x + 1.0).abs() < 1e-12);
        assert!(dir.y.abs() < 1e-12);

        let start = pl.start_direction().unwrap();
        // First edge runs in +x, so outward direction at the start is -x
        assert!((start.x + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_polyline_into_polygon_drops_closing_point() {
        let closed = Polyline::from_points(vec![
            Point::new(0, 0),
            Point::new(100, 0),
            Point::new(100, 100),
            Point::new(0, 0),
        ]);
        let poly = closed.into_polygon();
        assert!(poly.is_closed());
        assert_eq!(poly.len(), 3);
    }
}
