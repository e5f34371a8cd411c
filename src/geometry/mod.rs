//! Geometry primitives for the slicing core.
//!
//! This module provides the fundamental geometric types used throughout the
//! slicing pipeline:
//! - [`Point`] and [`Point3`] - 2D and 3D points with integer coordinates (scaled)
//! - [`PointF`] and [`Vec3`] - floating-point points/vectors (unscaled)
//! - [`Line`] - Line segment between two points
//! - [`Polygon`] - Contour with an explicit closed flag
//! - [`Polyline`] - Open polyline (path)
//! - [`BoundingBox`] and [`BoundingBox3F`] - Axis-aligned bounding boxes
//! - [`AABBTree`] - Bounding volume hierarchy over mesh triangles
//!
//! ## Coordinate System
//!
//! The slicer uses scaled integer coordinates internally to avoid floating-point
//! precision issues. Coordinates are scaled by `SCALING_FACTOR` (1,000,000), so
//! 1 unit = 1 nanometer.
//!
//! - Use `scale()` to convert from mm to internal units
//! - Use `unscale()` to convert from internal units to mm

pub mod aabb_tree;
mod bounding_box;
mod line;
mod point;
mod polygon;
mod polyline;

pub use aabb_tree::{
    ray_box_intersect, ray_triangle_intersect, AABBNode, AABBTree, RayHit, Vec3, AABB3,
};
pub use bounding_box::{BoundingBox, BoundingBox3F};
pub use line::{Line, Lines};
pub use point::{Point, Point3, PointF, Points};
pub use polygon::{Polygon, Polygons};
pub use polyline::{Polyline, Polylines};
