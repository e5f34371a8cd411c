//! Topology-tagged intersection segments.
//!
//! The plane predicate emits line segments tagged with the mesh features
//! they came from. The chaining engine prefers joining segments through
//! these tags (mesh connectivity) over numeric endpoint proximity, which
//! is what makes reconnection robust against floating-point noise.

use crate::geometry::Line;
use serde::{Deserialize, Serialize};

/// The mesh feature a segment endpoint lies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndpointTag {
    /// The endpoint is a mesh vertex.
    Vertex(u32),
    /// The endpoint was interpolated on a mesh edge.
    Edge(u32),
    /// No associated mesh feature.
    Free,
}

impl EndpointTag {
    /// Whether two tags reference the same mesh feature. `Free` never
    /// matches anything, including itself.
    #[inline]
    pub fn matches(&self, other: &EndpointTag) -> bool {
        !matches!(self, EndpointTag::Free) && self == other
    }
}

/// How a triangle intersected the slicing plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentKind {
    /// Generic case: the plane cuts through two edges of the triangle.
    Crossing,
    /// One vertex lies on the plane, the other two straddle it.
    VertexOnPlane {
        /// The on-plane vertex.
        vertex: u32,
    },
    /// Two vertices lie on the plane: the shared edge itself.
    EdgeOnPlane {
        /// The on-plane mesh edge.
        edge: u32,
        /// True when the rest of the triangle lies below the plane (the
        /// segment is the upper rim of the face).
        top: bool,
    },
    /// All three vertices lie on the plane; one segment per triangle edge.
    FaceOnPlane {
        /// The mesh edge this segment runs along.
        edge: u32,
        /// True when the face normal points up.
        top: bool,
    },
}

/// A line segment emitted by the plane predicate for one triangle.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SliceSegment {
    /// The 2D segment in scaled coordinates.
    pub line: Line,
    /// The triangle that produced it.
    pub triangle_id: u32,
    /// Mesh features of the two endpoints, `tags[0]` for `line.a`.
    pub tags: [EndpointTag; 2],
    /// Intersection classification.
    pub kind: SegmentKind,
}

impl SliceSegment {
    /// Tag of one endpoint (0 = `line.a`, 1 = `line.b`).
    #[inline]
    pub fn tag(&self, end: usize) -> EndpointTag {
        self.tags[end]
    }
}
