//! Triangle-plane intersection predicate.
//!
//! Classifies one triangle against a horizontal plane and emits zero to
//! three topology-tagged segments. The predicate is total: every
//! triangle/plane pair falls into exactly one of the five vertex-sign
//! cases below, including all the degenerate ones that a naive
//! implementation drops (vertex on plane, edge on plane, face on plane).
//!
//! All comparisons and interpolation happen in the scaled integer domain;
//! the only floating-point input is the vertex positions, converted once
//! on entry.

use super::segment::{EndpointTag, SegmentKind, SliceSegment};
use crate::geometry::{Line, Point, Point3};
use crate::mesh::TriangleMesh;
use crate::{scale, Coord, CoordF};

/// Half-band around the plane inside which a vertex counts as lying on
/// it. Vertex coordinates have passed through float-to-fixed conversion,
/// so an exact zero test would misclassify values that rounded across
/// the plane; the band covers the at most half-unit rounding of the
/// vertex plus the half-unit rounding of the plane height itself.
pub const Z_EPSILON: Coord = 1;

/// Which side of the plane a vertex lies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum VertexSign {
    Above,
    Below,
    On,
}

fn classify(d: Coord) -> VertexSign {
    if d.abs() <= Z_EPSILON {
        VertexSign::On
    } else if d > 0 {
        VertexSign::Above
    } else {
        VertexSign::Below
    }
}

/// Interpolate the intersection of an edge with the plane at `zc`, in
/// integer arithmetic.
///
/// Endpoints are ordered by vertex index first so the two triangles
/// sharing the edge compute bit-identical coordinates.
fn interpolate_edge(pa: Point3, pb: Point3, ia: u32, ib: u32, zc: Coord) -> Point {
    let (p0, p1) = if ia < ib { (pa, pb) } else { (pb, pa) };
    let num = (zc - p1.z) as i128;
    let den = (p0.z - p1.z) as i128;
    let x = p1.x as i128 + (p0.x - p1.x) as i128 * num / den;
    let y = p1.y as i128 + (p0.y - p1.y) as i128 * num / den;
    Point::new(x as Coord, y as Coord)
}

/// Slice one triangle of a mesh against the horizontal plane at `z`
/// (millimetres). Returns 0..3 tagged segments.
///
/// Degenerate triangles produce nothing; they are excluded from slicing
/// and already counted by the mesh diagnostics. Zero-length segments are
/// suppressed since they carry no contour information.
pub fn slice_triangle(mesh: &TriangleMesh, triangle_id: u32, z: CoordF) -> Vec<SliceSegment> {
    let tri = mesh.triangle(triangle_id as usize);
    if tri.degenerate {
        return Vec::new();
    }

    let verts = mesh.triangle_vertices(triangle_id as usize);
    let zc = scale(z);
    let p: [Point3; 3] = [
        Point3::new_scale(verts[0].x, verts[0].y, verts[0].z),
        Point3::new_scale(verts[1].x, verts[1].y, verts[1].z),
        Point3::new_scale(verts[2].x, verts[2].y, verts[2].z),
    ];
    let sign: [VertexSign; 3] = [
        classify(p[0].z - zc),
        classify(p[1].z - zc),
        classify(p[2].z - zc),
    ];

    let on = sign.iter().filter(|s| **s == VertexSign::On).count();
    let above = sign.iter().filter(|s| **s == VertexSign::Above).count();
    let below = sign.iter().filter(|s| **s == VertexSign::Below).count();

    let mut segments = Vec::new();
    let mut emit = |line: Line, tags: [EndpointTag; 2], kind: SegmentKind| {
        if !line.is_point() {
            segments.push(SliceSegment {
                line,
                triangle_id,
                tags,
                kind,
            });
        }
    };

    match (on, above, below) {
        // Face lies in the plane: one segment per edge, wound by the
        // face normal's Z sign so top and bottom faces stay
        // distinguishable downstream.
        (3, _, _) => {
            let top = tri.normal.z > 0.0;
            for k in 0..3 {
                let l = (k + 1) % 3;
                let (from, to) = if top { (k, l) } else { (l, k) };
                emit(
                    Line::new(p[from].xy(), p[to].xy()),
                    [
                        EndpointTag::Vertex(tri.vertices[from]),
                        EndpointTag::Vertex(tri.vertices[to]),
                    ],
                    SegmentKind::FaceOnPlane {
                        edge: tri.edges[k],
                        top,
                    },
                );
            }
        }

        // The shared edge of two on-plane vertices lies in the plane.
        // Oriented consistently with the winding: the upper rim of a
        // face below the plane runs opposite to the lower rim of a face
        // above it.
        (2, _, _) => {
            // The off-plane vertex identifies the on-plane edge: the
            // other two positions are always cyclically adjacent
            let third = sign
                .iter()
                .position(|s| *s != VertexSign::On)
                .unwrap_or(0);
            let k = (third + 1) % 3;
            let l = (k + 1) % 3;
            let top = sign[third] == VertexSign::Below;
            let (from, to) = if top { (l, k) } else { (k, l) };
            emit(
                Line::new(p[from].xy(), p[to].xy()),
                [
                    EndpointTag::Vertex(tri.vertices[from]),
                    EndpointTag::Vertex(tri.vertices[to]),
                ],
                SegmentKind::EdgeOnPlane {
                    edge: tri.edges[k],
                    top,
                },
            );
        }

        // One vertex on the plane, the other two straddling it: segment
        // from the vertex to the interpolated point on the opposite edge.
        (1, 1, 1) => {
            let j = sign
                .iter()
                .position(|s| *s == VertexSign::On)
                .unwrap_or(0);
            let a = (j + 1) % 3;
            let b = (j + 2) % 3;
            let cut = interpolate_edge(p[a], p[b], tri.vertices[a], tri.vertices[b], zc);
            emit(
                Line::new(p[j].xy(), cut),
                [
                    EndpointTag::Vertex(tri.vertices[j]),
                    EndpointTag::Edge(tri.edges[a]),
                ],
                SegmentKind::VertexOnPlane {
                    vertex: tri.vertices[j],
                },
            );
        }

        // One vertex on the plane, the others on the same side: the
        // plane only touches a point, not the interior.
        (1, _, _) => {}

        // Generic crossing: exactly two edges straddle the plane.
        (0, _, _) if above > 0 && below > 0 => {
            let mut cuts: Vec<(Point, u32)> = Vec::with_capacity(2);
            for k in 0..3 {
                let l = (k + 1) % 3;
                if sign[k] != sign[l] {
                    let cut =
                        interpolate_edge(p[k], p[l], tri.vertices[k], tri.vertices[l], zc);
                    cuts.push((cut, tri.edges[k]));
                }
            }
            debug_assert_eq!(cuts.len(), 2);
            if cuts.len() == 2 {
                emit(
                    Line::new(cuts[0].0, cuts[1].0),
                    [EndpointTag::Edge(cuts[0].1), EndpointTag::Edge(cuts[1].1)],
                    SegmentKind::Crossing,
                );
            }
        }

        // Entirely above or entirely below.
        _ => {}
    }

    segments
}
