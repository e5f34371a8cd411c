//! # Slicer Core
//!
//! The mesh-to-layer slicing core of a 3D printing pipeline: converts a
//! triangle mesh into an ordered sequence of horizontal 2D layers, each a
//! set of closed polygonal contours ready for downstream perimeter, infill
//! and support generation.
//!
//! The crate provides:
//! - Fixed-point geometry primitives ([`geometry`])
//! - An indexed triangle mesh with edge connectivity ([`mesh`])
//! - An AABB tree over mesh triangles for plane and ray queries
//! - A total triangle-plane intersection predicate and a three-phase
//!   segment chaining engine ([`slice`])
//!
//! ## Example
//!
//! ```rust,ignore
//! use slicer_core::{Slicer, SlicerConfig, TriangleMesh, uniform_z_heights};
//!
//! let mesh = TriangleMesh::cube(10.0);
//! let zs = uniform_z_heights(&mesh, 0.2, 0.2);
//! let result = Slicer::new(SlicerConfig::default()).slice(&mesh, &zs)?;
//! for layer in &result.layers {
//!     println!("z={:.3}mm: {} polygons", layer.z_mm(), layer.polygons.len());
//! }
//! ```

pub mod geometry;
pub mod mesh;
pub mod slice;

pub use geometry::{
    ray_box_intersect, ray_triangle_intersect, AABBNode, AABBTree, BoundingBox, BoundingBox3F,
    Line, Point, Point3, PointF, Polygon, Polygons, Polyline, Polylines, RayHit, Vec3, AABB3,
};
pub use mesh::{EdgeMap, MeshStats, Triangle, TriangleMesh};
pub use slice::{
    chain_segments, slice_triangle, uniform_z_heights, ChainConfig, ChainDiagnostics, EndpointTag,
    Layer, SegmentKind, SliceResult, SliceSegment, SliceStats, Slicer, SlicerConfig,
};

/// Coordinate type used throughout the slicer.
/// Using i64 for integer coordinates (scaled by SCALING_FACTOR) to avoid floating-point issues.
pub type Coord = i64;

/// Floating-point coordinate type for unscaled values.
pub type CoordF = f64;

/// Scaling factor: coordinates are stored as integers scaled by this factor.
/// 1 unit = 1 nanometer, so 1mm = 1_000_000 units.
/// This matches BambuStudio/PrusaSlicer's internal scaling.
pub const SCALING_FACTOR: f64 = 1_000_000.0;

/// Scale a floating-point coordinate to integer.
#[inline]
pub fn scale(v: CoordF) -> Coord {
    (v * SCALING_FACTOR).round() as Coord
}

/// Unscale an integer coordinate to floating-point.
#[inline]
pub fn unscale(v: Coord) -> CoordF {
    v as CoordF / SCALING_FACTOR
}

/// Result type used throughout the slicer.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for slicer operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Mesh error: {0}")]
    Mesh(String),

    #[error("Slicing error: {0}")]
    Slicing(String),

    #[error("Invalid geometry: {0}")]
    Geometry(String),

    #[error("Cancelled")]
    Cancelled,
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaling() {
        // 1mm should scale to 1_000_000
        assert_eq!(scale(1.0), 1_000_000);

        // And back
        assert!((unscale(1_000_000) - 1.0).abs() < 1e-10);

        // Test sub-millimeter precision
        assert_eq!(scale(0.001), 1_000); // 1 micron
        assert_eq!(scale(0.0001), 100); // 100 nanometers
    }

    #[test]
    fn test_scaling_round_trip() {
        // Two coords converted from the same millimetre value are identical
        for mm in [0.0, 0.2, 1.5, -3.75, 123.456789] {
            assert_eq!(scale(mm), scale(mm));
            // Round trip is exact within one scale unit
            assert!((unscale(scale(mm)) - mm).abs() <= 1.0 / SCALING_FACTOR);
        }
    }
}
