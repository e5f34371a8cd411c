//! Triangle mesh with edge connectivity.
//!
//! This module provides the indexed triangle mesh the slicing core
//! consumes: a vertex array, a triangle array with per-triangle edge ids
//! and face normals, and an [`EdgeMap`] recording which triangles share
//! each edge. The edge ids are what lets the chaining engine join slice
//! segments through mesh connectivity instead of numeric proximity.
//!
//! Ingestion is tolerant: degenerate triangles are flagged and excluded
//! from slicing, boundary and non-manifold edges are counted but never
//! rejected. A single bad primitive must not abort the slice.

use crate::geometry::{BoundingBox3F, Vec3};
use crate::CoordF;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Triangles with less than this area (mm²) are considered degenerate.
const AREA_EPSILON: CoordF = 1e-9;

/// A triangle of the mesh: three vertex indices, three edge ids (shared
/// with adjacent triangles) and a precomputed face normal.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Triangle {
    /// Vertex indices into the mesh's vertex array.
    pub vertices: [u32; 3],
    /// Edge ids; `edges[i]` connects `vertices[i]` to `vertices[(i+1)%3]`.
    pub edges: [u32; 3],
    /// Unit face normal (zero for degenerate triangles).
    pub normal: Vec3,
    /// Degenerate triangles are excluded from the spatial index and from
    /// intersection testing.
    pub degenerate: bool,
}

/// Edge connectivity of a mesh: for every undirected edge (keyed by its
/// sorted vertex-index pair at build time), the triangles incident to it.
///
/// Built once per mesh in O(T), immutable thereafter. A manifold edge has
/// exactly 2 incident triangles; boundary edges have 1, non-manifold
/// edges more than 2 - both are tolerated.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EdgeMap {
    /// Vertex pair of each edge, indexed by edge id.
    endpoints: Vec<(u32, u32)>,
    /// Incident triangle ids, indexed by edge id.
    incidence: Vec<Vec<u32>>,
}

impl EdgeMap {
    /// Number of distinct edges.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.endpoints.len()
    }

    /// Vertex indices of an edge.
    #[inline]
    pub fn endpoints(&self, edge_id: u32) -> (u32, u32) {
        self.endpoints[edge_id as usize]
    }

    /// Triangles incident to an edge.
    #[inline]
    pub fn triangles(&self, edge_id: u32) -> &[u32] {
        &self.incidence[edge_id as usize]
    }

    /// Whether an edge belongs to exactly one triangle.
    #[inline]
    pub fn is_boundary(&self, edge_id: u32) -> bool {
        self.incidence[edge_id as usize].len() == 1
    }

    /// Whether an edge belongs to exactly two triangles.
    #[inline]
    pub fn is_manifold(&self, edge_id: u32) -> bool {
        self.incidence[edge_id as usize].len() == 2
    }
}

/// Diagnostic counters collected while building a mesh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshStats {
    pub vertices: usize,
    pub triangles: usize,
    pub edges: usize,
    /// Triangles with repeated vertices or near-zero area.
    pub degenerate_triangles: usize,
    /// Edges incident to exactly one triangle.
    pub open_edges: usize,
    /// Edges incident to more than two triangles.
    pub non_manifold_edges: usize,
}

impl MeshStats {
    /// A closed manifold mesh has no open and no non-manifold edges.
    #[inline]
    pub fn is_manifold(&self) -> bool {
        self.open_edges == 0 && self.non_manifold_edges == 0
    }
}

/// An indexed triangle mesh with derived edge connectivity.
///
/// Built once and immutable for the duration of slicing; shared read-only
/// across all layer computations.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TriangleMesh {
    vertices: Vec<Vec3>,
    triangles: Vec<Triangle>,
    edge_map: EdgeMap,
    stats: MeshStats,
}

impl TriangleMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mesh from a vertex array and triangle index triples (the
    /// input contract of mesh/file-format collaborators).
    ///
    /// Triangles referencing out-of-range vertices are dropped with a
    /// warning; degenerate triangles are kept but flagged so diagnostics
    /// stay accurate.
    pub fn from_indexed(vertices: Vec<Vec3>, indices: &[[u32; 3]]) -> Self {
        let vertex_count = vertices.len() as u32;
        let mut triangles: Vec<Triangle> = Vec::with_capacity(indices.len());
        let mut dropped = 0usize;

        for tri in indices {
            if tri.iter().any(|&v| v >= vertex_count) {
                dropped += 1;
                continue;
            }
            let v0 = vertices[tri[0] as usize];
            let v1 = vertices[tri[1] as usize];
            let v2 = vertices[tri[2] as usize];

            let cross = (v1 - v0).cross(&(v2 - v0));
            let doubled_area = cross.length();
            let repeated = tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2];
            let degenerate = repeated || doubled_area < 2.0 * AREA_EPSILON;

            triangles.push(Triangle {
                vertices: *tri,
                edges: [0; 3],
                normal: if degenerate {
                    Vec3::zero()
                } else {
                    cross.normalized()
                },
                degenerate,
            });
        }

        if dropped > 0 {
            warn!(
                "dropped {} triangles with out-of-range vertex indices",
                dropped
            );
        }

        let edge_map = build_edge_map(&mut triangles);

        let mut stats = MeshStats {
            vertices: vertices.len(),
            triangles: triangles.len(),
            edges: edge_map.edge_count(),
            degenerate_triangles: triangles.iter().filter(|t| t.degenerate).count(),
            open_edges: 0,
            non_manifold_edges: 0,
        };
        for edge in &edge_map.incidence {
            match edge.len() {
                1 => stats.open_edges += 1,
                2 => {}
                _ => stats.non_manifold_edges += 1,
            }
        }

        if stats.non_manifold_edges > 0 {
            warn!(
                "mesh has {} non-manifold edges; slicing continues but contours may not close",
                stats.non_manifold_edges
            );
        }
        debug!(
            "mesh built: {} vertices, {} triangles ({} degenerate), {} edges ({} open)",
            stats.vertices, stats.triangles, stats.degenerate_triangles, stats.edges,
            stats.open_edges
        );

        Self {
            vertices,
            triangles,
            edge_map,
            stats,
        }
    }

    /// An axis-aligned cube spanning `[0, size]` on every axis, built
    /// from 12 triangles with outward normals. Used by tests and demos.
    pub fn cube(size: CoordF) -> Self {
        let s = size;
        let vertices = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(s, 0.0, 0.0),
            Vec3::new(s, s, 0.0),
            Vec3::new(0.0, s, 0.0),
            Vec3::new(0.0, 0.0, s),
            Vec3::new(s, 0.0, s),
            Vec3::new(s, s, s),
            Vec3::new(0.0, s, s),
        ];
        let indices = [
            // bottom (-z)
            [0, 3, 2],
            [0, 2, 1],
            // top (+z)
            [4, 5, 6],
            [4, 6, 7],
            // front (-y)
            [0, 1, 5],
            [0, 5, 4],
            // right (+x)
            [1, 2, 6],
            [1, 6, 5],
            // back (+y)
            [2, 3, 7],
            [2, 7, 6],
            // left (-x)
            [3, 0, 4],
            [3, 4, 7],
        ];
        Self::from_indexed(vertices, &indices)
    }

    /// Number of triangles (including degenerate ones).
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the mesh has no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// The vertex array.
    #[inline]
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// A triangle by index.
    #[inline]
    pub fn triangle(&self, idx: usize) -> &Triangle {
        &self.triangles[idx]
    }

    /// All triangles.
    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Vertex indices of a triangle.
    #[inline]
    pub fn triangle_indices(&self, idx: usize) -> [u32; 3] {
        self.triangles[idx].vertices
    }

    /// Vertex positions of a triangle.
    #[inline]
    pub fn triangle_vertices(&self, idx: usize) -> [Vec3; 3] {
        let t = &self.triangles[idx];
        [
            self.vertices[t.vertices[0] as usize],
            self.vertices[t.vertices[1] as usize],
            self.vertices[t.vertices[2] as usize],
        ]
    }

    /// The edge connectivity map.
    #[inline]
    pub fn edge_map(&self) -> &EdgeMap {
        &self.edge_map
    }

    /// Build diagnostics.
    #[inline]
    pub fn stats(&self) -> &MeshStats {
        &self.stats
    }

    /// Compute the mesh bounding box in millimetres.
    pub fn bounding_box(&self) -> BoundingBox3F {
        let mut bb = BoundingBox3F::new();
        for t in &self.triangles {
            for &v in &t.vertices {
                bb.merge_point(self.vertices[v as usize]);
            }
        }
        bb
    }
}

/// Assign edge ids to every triangle and record edge incidence.
///
/// Edges are keyed on the sorted vertex-index pair so both triangles
/// sharing an edge get the same id, regardless of winding.
fn build_edge_map(triangles: &mut [Triangle]) -> EdgeMap {
    let mut ids: HashMap<(u32, u32), u32> = HashMap::with_capacity(triangles.len() * 3 / 2);
    let mut map = EdgeMap::default();

    for (tri_idx, tri) in triangles.iter_mut().enumerate() {
        for i in 0..3 {
            let v0 = tri.vertices[i];
            let v1 = tri.vertices[(i + 1) % 3];
            let key = if v0 < v1 { (v0, v1) } else { (v1, v0) };

            let edge_id = *ids.entry(key).or_insert_with(|| {
                map.endpoints.push(key);
                map.incidence.push(Vec::with_capacity(2));
                (map.endpoints.len() - 1) as u32
            });
            tri.edges[i] = edge_id;
            map.incidence[edge_id as usize].push(tri_idx as u32);
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_mesh() {
        let mesh = TriangleMesh::new();
        assert!(mesh.is_empty());
        assert_eq!(mesh.triangle_count(), 0);
        assert!(!mesh.bounding_box().is_defined());
    }

    #[test]
    fn test_cube_connectivity() {
        let mesh = TriangleMesh::cube(10.0);
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.vertex_count(), 8);
        // 12 cube edges + 6 face diagonals
        assert_eq!(mesh.edge_map().edge_count(), 18);
        assert!(mesh.stats().is_manifold());
        assert_eq!(mesh.stats().degenerate_triangles, 0);

        // Every edge of a closed mesh is shared by exactly two triangles
        for e in 0..mesh.edge_map().edge_count() as u32 {
            assert!(mesh.edge_map().is_manifold(e));
        }
    }

    #[test]
    fn test_cube_bounding_box() {
        let mesh = TriangleMesh::cube(10.0);
        let bb = mesh.bounding_box();
        assert_eq!(bb.min, Vec3::zero());
        assert_eq!(bb.max, Vec3::new(10.0, 10.0, 10.0));
    }

    #[test]
    fn test_cube_normals_point_outward() {
        let mesh = TriangleMesh::cube(10.0);
        let center = Vec3::new(5.0, 5.0, 5.0);
        for i in 0..mesh.triangle_count() {
            let [v0, v1, v2] = mesh.triangle_vertices(i);
            let centroid = (v0 + v1 + v2) * (1.0 / 3.0);
            let outward = centroid - center;
            assert!(
                mesh.triangle(i).normal.dot(&outward) > 0.0,
                "triangle {} normal points inward",
                i
            );
        }
    }

    #[test]
    fn test_shared_edge_ids_match() {
        let mesh = TriangleMesh::cube(10.0);
        // Triangles 0 and 1 (bottom face) share the diagonal 0-2
        let t0 = mesh.triangle(0);
        let t1 = mesh.triangle(1);
        let shared: Vec<u32> = t0
            .edges
            .iter()
            .filter(|e| t1.edges.contains(e))
            .copied()
            .collect();
        assert_eq!(shared.len(), 1);
        let (a, b) = mesh.edge_map().endpoints(shared[0]);
        assert_eq!((a, b), (0, 2));
    }

    #[test]
    fn test_degenerate_triangle_flagged() {
        let vertices = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0), // collinear
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let indices = [[0, 1, 2], [0, 1, 3], [0, 1, 1]];
        let mesh = TriangleMesh::from_indexed(vertices, &indices);
        assert_eq!(mesh.triangle_count(), 3);
        assert!(mesh.triangle(0).degenerate); // zero area
        assert!(!mesh.triangle(1).degenerate);
        assert!(mesh.triangle(2).degenerate); // repeated index
        assert_eq!(mesh.stats().degenerate_triangles, 2);
    }

    #[test]
    fn test_out_of_range_indices_dropped() {
        let vertices = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let indices = [[0, 1, 2], [0, 1, 9]];
        let mesh = TriangleMesh::from_indexed(vertices, &indices);
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_open_mesh_stats() {
        // A single triangle: all three edges are boundary edges
        let vertices = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let mesh = TriangleMesh::from_indexed(vertices, &[[0, 1, 2]]);
        assert_eq!(mesh.stats().open_edges, 3);
        assert!(!mesh.stats().is_manifold());
        for e in 0..3 {
            assert!(mesh.edge_map().is_boundary(e));
        }
    }

    #[test]
    fn test_non_manifold_edge_tolerated() {
        // Three triangles fanning around the same edge 0-1
        let vertices = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        ];
        let indices = [[0, 1, 2], [0, 1, 3], [0, 1, 4]];
        let mesh = TriangleMesh::from_indexed(vertices, &indices);
        assert_eq!(mesh.stats().non_manifold_edges, 1);
        let shared = mesh.triangle(0).edges[0];
        assert_eq!(mesh.edge_map().triangles(shared).len(), 3);
    }
}
