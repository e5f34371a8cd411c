//! Polygon type for layer contours.
//!
//! A polygon is an ordered sequence of points, usually closed (the last
//! point connects back to the first without being stored twice). The
//! chaining engine may also emit open polygons for polylines it could not
//! reconnect; the `closed` flag distinguishes the two so downstream
//! consumers can decide how to treat them.

use super::{BoundingBox, Line, Point};
use crate::{Coord, CoordF, SCALING_FACTOR};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Deref, Index};

/// A polygonal contour with an explicit closed flag.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Polygon {
    points: Vec<Point>,
    closed: bool,
}

impl Polygon {
    /// Create a closed polygon from a vector of points.
    ///
    /// The points must not repeat the first point at the end; closure is
    /// implicit.
    #[inline]
    pub fn from_points(points: Vec<Point>) -> Self {
        Self {
            points,
            closed: true,
        }
    }

    /// Create an open polygon (an unreconnected polyline emitted as a
    /// diagnostic result).
    #[inline]
    pub fn open_from_points(points: Vec<Point>) -> Self {
        Self {
            points,
            closed: false,
        }
    }

    /// Get the points of this polygon.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Whether the contour is closed.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Get the number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the polygon has no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// A closed polygon needs at least 3 points to bound area.
    #[inline]
    pub fn is_valid(&self) -> bool {
        if self.closed {
            self.points.len() >= 3
        } else {
            self.points.len() >= 2
        }
    }

    /// Reverse the point order (flips orientation).
    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Get the edges of the polygon, including the closing edge when closed.
    pub fn edges(&self) -> Vec<Line> {
        if self.points.len() < 2 {
            return Vec::new();
        }
        let mut edges = Vec::with_capacity(self.points.len());
        for i in 0..(self.points.len() - 1) {
            edges.push(Line::new(self.points[i], self.points[i + 1]));
        }
        if self.closed {
            edges.push(Line::new(self.points[self.points.len() - 1], self.points[0]));
        }
        edges
    }

    /// Signed area by the shoelace formula, in squared scaled units.
    ///
    /// Positive for counter-clockwise orientation. Zero for open polygons.
    pub fn signed_area(&self) -> CoordF {
        if !self.closed || self.points.len() < 3 {
            return 0.0;
        }
        let mut sum: i128 = 0;
        let n = self.points.len();
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            sum += a.x as i128 * b.y as i128 - b.x as i128 * a.y as i128;
        }
        sum as CoordF / 2.0
    }

    /// Absolute area in squared scaled units.
    #[inline]
    pub fn area(&self) -> CoordF {
        self.signed_area().abs()
    }

    /// Absolute area in square millimetres.
    #[inline]
    pub fn area_mm2(&self) -> CoordF {
        self.area() / (SCALING_FACTOR * SCALING_FACTOR)
    }

    /// Whether the polygon winds counter-clockwise.
    #[inline]
    pub fn is_counter_clockwise(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// Perimeter length in scaled units. Open polygons measure the path only.
    pub fn perimeter(&self) -> CoordF {
        self.edges().iter().map(|e| e.length()).sum()
    }

    /// Get the bounding box of the polygon.
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.points)
    }

    /// Even-odd point containment test in exact integer arithmetic.
    ///
    /// Points exactly on an edge may be classified either way. Always
    /// false for open polygons.
    pub fn contains_point(&self, p: &Point) -> bool {
        if !self.closed || self.points.len() < 3 {
            return false;
        }
        let n = self.points.len();
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[j];
            if (a.y > p.y) != (b.y > p.y) {
                // p.x < a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y),
                // cross-multiplied to stay in integers
                let dy = (b.y - a.y) as i128;
                let lhs = (p.x - a.x) as i128 * dy;
                let rhs = (p.y - a.y) as i128 * (b.x - a.x) as i128;
                if (dy > 0 && lhs < rhs) || (dy < 0 && lhs > rhs) {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// Remove points that lie within `tolerance` of the line through their
    /// neighbors, and consecutive duplicates.
    ///
    /// Interpolated slice points frequently land exactly on a facet fold
    /// line; dropping them keeps contours minimal.
    pub fn simplify_collinear(&mut self, tolerance: Coord) {
        if self.points.len() < 3 {
            return;
        }

        let closed = self.closed;
        let points = std::mem::take(&mut self.points);
        let n = points.len();
        let mut kept: Vec<Point> = Vec::with_capacity(n);

        for i in 0..n {
            let curr = points[i];

            // Drop exact duplicates of the previously kept point
            if let Some(&prev) = kept.last() {
                if prev.coincides_with(&curr, 0) {
                    continue;
                }
            }
            kept.push(curr);
        }

        // For a closed contour the first point can duplicate the last
        if closed && kept.len() >= 2 && kept[0].coincides_with(kept.last().unwrap(), 0) {
            kept.pop();
        }

        // Collinearity pass; for open contours the endpoints always stay
        let m = kept.len();
        if m >= 3 {
            let mut result: Vec<Point> = Vec::with_capacity(m);
            let range = if closed { 0..m } else { 1..m - 1 };
            if !closed {
                result.push(kept[0]);
            }
            for i in range {
                let prev = kept[(i + m - 1) % m];
                let curr = kept[i];
                let next = kept[(i + 1) % m];
                let line = Line::new(prev, next);
                if line.is_point() || line.distance_to_point_infinite(&curr) > tolerance as CoordF {
                    result.push(curr);
                }
            }
            if !closed {
                result.push(kept[m - 1]);
            }
            if result.len() >= if closed { 3 } else { 2 } {
                self.points = result;
                return;
            }
        }
        self.points = kept;
    }
}

impl fmt::Debug for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Polygon({} points, {})",
            self.points.len(),
            if self.closed { "closed" } else { "open" }
        )
    }
}

impl Deref for Polygon {
    type Target = [Point];

    fn deref(&self) -> &Self::Target {
        &self.points
    }
}

impl Index<usize> for Polygon {
    type Output = Point;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

/// Type alias for a collection of polygons.
pub type Polygons = Vec<Polygon>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale;

    fn unit_square_mm() -> Polygon {
        Polygon::from_points(vec![
            Point::new_scale(0.0, 0.0),
            Point::new_scale(1.0, 0.0),
            Point::new_scale(1.0, 1.0),
            Point::new_scale(0.0, 1.0),
        ])
    }

    #[test]
    fn test_polygon_area() {
        let square = unit_square_mm();
        assert!((square.area_mm2() - 1.0).abs() < 1e-9);
        assert!(square.is_counter_clockwise());
        assert!((square.perimeter() - 4_000_000.0).abs() < 1.0);
        let bb = square.bounding_box();
        assert_eq!(bb.size(), Point::new_scale(1.0, 1.0));
    }

    #[test]
    fn test_polygon_reverse_flips_orientation() {
        let mut square = unit_square_mm();
        let area = square.signed_area();
        square.reverse();
        assert!((square.signed_area() + area).abs() < 1e-6);
    }

    #[test]
    fn test_polygon_open_has_no_area() {
        let open = Polygon::open_from_points(vec![
            Point::new(0, 0),
            Point::new(100, 0),
            Point::new(100, 100),
        ]);
        assert!(!open.is_closed());
        assert_eq!(open.signed_area(), 0.0);
        assert!(!open.contains_point(&Point::new(50, 25)));
    }

    #[test]
    fn test_polygon_contains_point() {
        let square = unit_square_mm();
        assert!(square.contains_point(&Point::new_scale(0.5, 0.5)));
        assert!(!square.contains_point(&Point::new_scale(1.5, 0.5)));
        assert!(!square.contains_point(&Point::new_scale(-0.5, 0.5)));
    }

    #[test]
    fn test_polygon_edges_closed() {
        let square = unit_square_mm();
        let edges = square.edges();
        assert_eq!(edges.len(), 4);
        assert_eq!(edges[3].b, square[0]);
    }

    #[test]
    fn test_polygon_simplify_collinear() {
        // Square with redundant midpoints on each side
        let mut poly = Polygon::from_points(vec![
            Point::new(0, 0),
            Point::new(scale(0.5), 0),
            Point::new(scale(1.0), 0),
            Point::new(scale(1.0), scale(0.5)),
            Point::new(scale(1.0), scale(1.0)),
            Point::new(scale(0.5), scale(1.0)),
            Point::new(0, scale(1.0)),
            Point::new(0, scale(0.5)),
        ]);
        let area_before = poly.area();
        poly.simplify_collinear(10);
        assert_eq!(poly.len(), 4);
        assert!((poly.area() - area_before).abs() < 1.0);
    }

    #[test]
    fn test_polygon_simplify_keeps_corners() {
        let mut square = unit_square_mm();
        square.simplify_collinear(10);
        assert_eq!(square.len(), 4);
    }

    #[test]
    fn test_polygon_simplify_drops_duplicates() {
        let mut poly = Polygon::from_points(vec![
            Point::new(0, 0),
            Point::new(0, 0),
            Point::new(100, 0),
            Point::new(100, 100),
            Point::new(0, 100),
        ]);
        poly.simplify_collinear(0);
        assert_eq!(poly.len(), 4);
    }
}
