//! AABB tree over mesh triangles.
//!
//! A bounding volume hierarchy used to prune plane and ray queries to
//! O(log n + k). The tree is built once per mesh into a flat node arena
//! plus a permutation of triangle ids, and is immutable afterwards, so it
//! can be shared read-only across layer workers without locking.
//!
//! Splits use the Surface Area Heuristic over binned candidate positions
//! along the longest centroid axis; small ranges fall back to a median
//! split. Triangle ordering uses a comparison sort.

use crate::mesh::TriangleMesh;
use crate::CoordF;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A 3-component floating-point vector in millimetre coordinates.
///
/// Used for mesh vertex storage, face normals and bounding volumes.
/// Precision here does not affect slicing correctness, only predicate
/// inputs after fixed-point conversion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: CoordF,
    pub y: CoordF,
    pub z: CoordF,
}

impl Vec3 {
    /// Create a new vector.
    #[inline]
    pub const fn new(x: CoordF, y: CoordF, z: CoordF) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    #[inline]
    pub const fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Dot product.
    #[inline]
    pub fn dot(&self, other: &Vec3) -> CoordF {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product.
    #[inline]
    pub fn cross(&self, other: &Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Length.
    #[inline]
    pub fn length(&self) -> CoordF {
        self.dot(self).sqrt()
    }

    /// Normalize to unit length. Returns the zero vector unchanged.
    pub fn normalized(&self) -> Vec3 {
        let len = self.length();
        if len > 0.0 {
            Vec3::new(self.x / len, self.y / len, self.z / len)
        } else {
            *self
        }
    }

    /// Component-wise minimum.
    #[inline]
    pub fn min_components(&self, other: &Vec3) -> Vec3 {
        Vec3::new(
            self.x.min(other.x),
            self.y.min(other.y),
            self.z.min(other.z),
        )
    }

    /// Component-wise maximum.
    #[inline]
    pub fn max_components(&self, other: &Vec3) -> Vec3 {
        Vec3::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }

    /// Component by axis index (0 = x, 1 = y, 2 = z).
    #[inline]
    pub fn component(&self, axis: usize) -> CoordF {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    #[inline]
    fn add(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    #[inline]
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<CoordF> for Vec3 {
    type Output = Vec3;

    #[inline]
    fn mul(self, factor: CoordF) -> Vec3 {
        Vec3::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

/// A 3D axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AABB3 {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB3 {
    /// An inverted box that grows to fit whatever is merged into it.
    pub fn empty() -> Self {
        Self {
            min: Vec3::new(CoordF::MAX, CoordF::MAX, CoordF::MAX),
            max: Vec3::new(CoordF::MIN, CoordF::MIN, CoordF::MIN),
        }
    }

    /// Create the bounding box of a triangle.
    pub fn from_triangle(v0: &Vec3, v1: &Vec3, v2: &Vec3) -> Self {
        Self {
            min: v0.min_components(v1).min_components(v2),
            max: v0.max_components(v1).max_components(v2),
        }
    }

    /// Expand to contain a point.
    pub fn grow(&mut self, p: &Vec3) {
        self.min = self.min.min_components(p);
        self.max = self.max.max_components(p);
    }

    /// Expand to contain another box.
    pub fn merge(&mut self, other: &AABB3) {
        self.min = self.min.min_components(&other.min);
        self.max = self.max.max_components(&other.max);
    }

    /// Check whether this box fully contains another (inclusive).
    pub fn contains(&self, other: &AABB3) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && self.min.z <= other.min.z
            && self.max.x >= other.max.x
            && self.max.y >= other.max.y
            && self.max.z >= other.max.z
    }

    /// Check whether the horizontal plane at `z` intersects the box
    /// (inclusive on both faces, so tangent planes count).
    #[inline]
    pub fn straddles_z(&self, z: CoordF) -> bool {
        self.min.z <= z && z <= self.max.z
    }

    /// Box center.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Surface area, used by the SAH cost model.
    pub fn surface_area(&self) -> CoordF {
        let d = self.max - self.min;
        if d.x < 0.0 || d.y < 0.0 || d.z < 0.0 {
            return 0.0;
        }
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }

    /// Index of the longest axis (0 = x, 1 = y, 2 = z).
    pub fn longest_axis(&self) -> usize {
        let d = self.max - self.min;
        if d.x >= d.y && d.x >= d.z {
            0
        } else if d.y >= d.z {
            1
        } else {
            2
        }
    }
}

/// Result of a ray query against the tree.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RayHit {
    /// Index of the hit triangle.
    pub triangle_id: u32,
    /// Ray parameter of the hit (distance when `dir` is unit length).
    pub distance: CoordF,
    /// Hit position.
    pub position: Vec3,
}

/// A node of the AABB tree.
///
/// `left_child == 0` marks a leaf: the root always occupies slot 0, so 0
/// is never a valid child index. The right child is `left_child + 1`.
/// Leaves reference `count` entries of the primitive permutation starting
/// at `offset`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct AABBNode {
    pub bbox: AABB3,
    pub left_child: u32,
    pub count: u32,
    pub offset: u32,
}

impl AABBNode {
    /// Whether this node is a leaf.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left_child == 0
    }
}

/// Maximum number of triangles per leaf.
const LEAF_SIZE: usize = 4;

/// Below this many primitives a median split is cheaper than evaluating
/// the SAH.
const SAH_THRESHOLD: usize = 32;

/// Number of SAH candidate bins along the split axis.
const NUM_BINS: usize = 8;

/// An immutable bounding volume hierarchy over the triangles of a mesh.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AABBTree {
    nodes: Vec<AABBNode>,
    primitives: Vec<u32>,
    prim_boxes: Vec<AABB3>,
}

struct BuildPrim {
    id: u32,
    bbox: AABB3,
    centroid: Vec3,
}

impl AABBTree {
    /// Build a tree over the non-degenerate triangles of a mesh.
    ///
    /// Construction never fails: degenerate triangles are dropped
    /// silently (the mesh already counts them) and an empty input yields
    /// an empty tree whose queries return nothing.
    pub fn build(mesh: &TriangleMesh) -> Self {
        let mut prims: Vec<BuildPrim> = Vec::with_capacity(mesh.triangle_count());
        for id in 0..mesh.triangle_count() {
            if mesh.triangle(id).degenerate {
                continue;
            }
            let [v0, v1, v2] = mesh.triangle_vertices(id);
            let bbox = AABB3::from_triangle(&v0, &v1, &v2);
            prims.push(BuildPrim {
                id: id as u32,
                bbox,
                centroid: bbox.center(),
            });
        }

        let mut tree = AABBTree {
            nodes: Vec::new(),
            primitives: Vec::with_capacity(prims.len()),
            prim_boxes: Vec::with_capacity(prims.len()),
        };
        if prims.is_empty() {
            return tree;
        }

        tree.nodes.push(AABBNode {
            bbox: AABB3::empty(),
            left_child: 0,
            count: 0,
            offset: 0,
        });
        tree.build_node(0, &mut prims);
        tree
    }

    fn build_node(&mut self, node_idx: usize, prims: &mut [BuildPrim]) {
        let mut bbox = AABB3::empty();
        for p in prims.iter() {
            bbox.merge(&p.bbox);
        }
        self.nodes[node_idx].bbox = bbox;

        if prims.len() <= LEAF_SIZE {
            self.make_leaf(node_idx, prims);
            return;
        }

        let mid = if prims.len() > SAH_THRESHOLD {
            match Self::split_sah(prims) {
                Some(mid) => mid,
                None => Self::split_median(prims),
            }
        } else {
            Self::split_median(prims)
        };

        let left_idx = self.nodes.len();
        self.nodes[node_idx].left_child = left_idx as u32;
        for _ in 0..2 {
            self.nodes.push(AABBNode {
                bbox: AABB3::empty(),
                left_child: 0,
                count: 0,
                offset: 0,
            });
        }

        let (left, right) = prims.split_at_mut(mid);
        self.build_node(left_idx, left);
        self.build_node(left_idx + 1, right);
    }

    fn make_leaf(&mut self, node_idx: usize, prims: &[BuildPrim]) {
        let node = &mut self.nodes[node_idx];
        node.left_child = 0;
        node.offset = self.primitives.len() as u32;
        node.count = prims.len() as u32;
        for p in prims {
            self.primitives.push(p.id);
            self.prim_boxes.push(p.bbox);
        }
    }

    /// Median split: order by centroid along the longest centroid axis
    /// and cut at the middle.
    fn split_median(prims: &mut [BuildPrim]) -> usize {
        let mut centroid_bounds = AABB3::empty();
        for p in prims.iter() {
            centroid_bounds.grow(&p.centroid);
        }
        let axis = centroid_bounds.longest_axis();
        prims.sort_unstable_by(|a, b| {
            a.centroid
                .component(axis)
                .partial_cmp(&b.centroid.component(axis))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        prims.len() / 2
    }

    /// Binned SAH split along the longest centroid axis. Returns the
    /// partition index, or None when binning degenerates (all centroids
    /// in one bin or a zero-extent axis) so the caller can fall back to
    /// a median split.
    fn split_sah(prims: &mut [BuildPrim]) -> Option<usize> {
        let mut centroid_bounds = AABB3::empty();
        for p in prims.iter() {
            centroid_bounds.grow(&p.centroid);
        }
        let axis = centroid_bounds.longest_axis();
        let lo = centroid_bounds.min.component(axis);
        let hi = centroid_bounds.max.component(axis);
        let extent = hi - lo;
        if extent <= CoordF::EPSILON {
            return None;
        }

        let bin_of = |c: &Vec3| -> usize {
            let t = (c.component(axis) - lo) / extent;
            ((t * NUM_BINS as CoordF) as usize).min(NUM_BINS - 1)
        };

        let mut bin_boxes = [AABB3::empty(); NUM_BINS];
        let mut bin_counts = [0usize; NUM_BINS];
        for p in prims.iter() {
            let b = bin_of(&p.centroid);
            bin_boxes[b].merge(&p.bbox);
            bin_counts[b] += 1;
        }

        // Suffix sweep: cost of everything right of each plane
        let mut right_boxes = [AABB3::empty(); NUM_BINS];
        let mut right_counts = [0usize; NUM_BINS];
        let mut acc_box = AABB3::empty();
        let mut acc_count = 0usize;
        for i in (1..NUM_BINS).rev() {
            acc_box.merge(&bin_boxes[i]);
            acc_count += bin_counts[i];
            right_boxes[i] = acc_box;
            right_counts[i] = acc_count;
        }

        // Prefix sweep: pick the plane minimizing the SAH cost
        let mut best_cost = CoordF::MAX;
        let mut best_plane = None;
        let mut left_box = AABB3::empty();
        let mut left_count = 0usize;
        for plane in 0..NUM_BINS - 1 {
            left_box.merge(&bin_boxes[plane]);
            left_count += bin_counts[plane];
            let right_count = right_counts[plane + 1];
            if left_count == 0 || right_count == 0 {
                continue;
            }
            let cost = left_box.surface_area() * left_count as CoordF
                + right_boxes[plane + 1].surface_area() * right_count as CoordF;
            if cost < best_cost {
                best_cost = cost;
                best_plane = Some(plane);
            }
        }
        let best_plane = best_plane?;

        // Partition in place around the chosen plane
        let mut mid = 0;
        for i in 0..prims.len() {
            if bin_of(&prims[i].centroid) <= best_plane {
                prims.swap(i, mid);
                mid += 1;
            }
        }
        if mid == 0 || mid == prims.len() {
            return None;
        }
        Some(mid)
    }

    /// Number of nodes in the tree.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of indexed primitives.
    #[inline]
    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    /// Whether the tree indexes no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Collect the triangles whose bounding box straddles the horizontal
    /// plane at `z` (millimetres). O(log n + k) by pruning subtrees whose
    /// box misses the plane.
    pub fn query_plane(&self, z: CoordF) -> Vec<u32> {
        let mut result = Vec::new();
        if self.nodes.is_empty() {
            return result;
        }

        let mut stack: Vec<usize> = vec![0];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            if !node.bbox.straddles_z(z) {
                continue;
            }
            if node.is_leaf() {
                for i in 0..node.count as usize {
                    let slot = node.offset as usize + i;
                    if self.prim_boxes[slot].straddles_z(z) {
                        result.push(self.primitives[slot]);
                    }
                }
            } else {
                stack.push(node.left_child as usize);
                stack.push(node.left_child as usize + 1);
            }
        }
        result
    }

    /// Find the nearest ray-triangle intersection.
    ///
    /// Not used by slicing itself; exposed for collaborators and tests.
    pub fn query_ray(&self, mesh: &TriangleMesh, origin: &Vec3, dir: &Vec3) -> Option<RayHit> {
        if self.nodes.is_empty() {
            return None;
        }

        let mut best: Option<RayHit> = None;
        let mut stack: Vec<usize> = vec![0];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            match ray_box_intersect(origin, dir, &node.bbox) {
                Some(t_near) => {
                    if let Some(hit) = &best {
                        if t_near > hit.distance {
                            continue;
                        }
                    }
                }
                None => continue,
            }

            if node.is_leaf() {
                for i in 0..node.count as usize {
                    let id = self.primitives[node.offset as usize + i];
                    let [v0, v1, v2] = mesh.triangle_vertices(id as usize);
                    if let Some(t) = ray_triangle_intersect(origin, dir, &v0, &v1, &v2) {
                        let closer = best.map(|h| t < h.distance).unwrap_or(true);
                        if closer {
                            best = Some(RayHit {
                                triangle_id: id,
                                distance: t,
                                position: *origin + *dir * t,
                            });
                        }
                    }
                }
            } else {
                stack.push(node.left_child as usize);
                stack.push(node.left_child as usize + 1);
            }
        }
        best
    }

    /// Check structural invariants: every node's box contains its
    /// children's boxes (and its primitives' boxes at leaves), child and
    /// primitive indices are in range, and each primitive appears exactly
    /// once. Used by tests, not on the hot path.
    pub fn validate(&self) -> bool {
        if self.nodes.is_empty() {
            return self.primitives.is_empty();
        }
        if self.primitives.len() != self.prim_boxes.len() {
            return false;
        }

        let mut seen = vec![false; self.primitives.len()];
        let mut stack: Vec<usize> = vec![0];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            if node.is_leaf() {
                let start = node.offset as usize;
                let end = start + node.count as usize;
                if end > self.primitives.len() {
                    return false;
                }
                for slot in start..end {
                    if seen[slot] {
                        return false;
                    }
                    seen[slot] = true;
                    if !node.bbox.contains(&self.prim_boxes[slot]) {
                        return false;
                    }
                }
            } else {
                let left = node.left_child as usize;
                if left == 0 || left + 1 >= self.nodes.len() {
                    return false;
                }
                if !node.bbox.contains(&self.nodes[left].bbox)
                    || !node.bbox.contains(&self.nodes[left + 1].bbox)
                {
                    return false;
                }
                stack.push(left);
                stack.push(left + 1);
            }
        }
        seen.into_iter().all(|s| s)
    }
}

/// Slab test for a ray against a box. Returns the entry parameter
/// (clamped to 0 when the origin is inside), or None on a miss.
pub fn ray_box_intersect(origin: &Vec3, dir: &Vec3, bbox: &AABB3) -> Option<CoordF> {
    let mut t_min: CoordF = 0.0;
    let mut t_max: CoordF = CoordF::MAX;

    for axis in 0..3 {
        let o = origin.component(axis);
        let d = dir.component(axis);
        let lo = bbox.min.component(axis);
        let hi = bbox.max.component(axis);
        if d.abs() < 1e-12 {
            if o < lo || o > hi {
                return None;
            }
        } else {
            let inv = 1.0 / d;
            let mut t0 = (lo - o) * inv;
            let mut t1 = (hi - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }
    }
    Some(t_min)
}

/// Möller-Trumbore ray-triangle intersection. Returns the ray parameter
/// of the hit, or None for a miss or a ray parallel to the triangle.
pub fn ray_triangle_intersect(
    origin: &Vec3,
    dir: &Vec3,
    v0: &Vec3,
    v1: &Vec3,
    v2: &Vec3,
) -> Option<CoordF> {
    const EPS: CoordF = 1e-12;

    let edge1 = *v1 - *v0;
    let edge2 = *v2 - *v0;
    let pvec = dir.cross(&edge2);
    let det = edge1.dot(&pvec);
    if det.abs() < EPS {
        return None;
    }

    let inv_det = 1.0 / det;
    let tvec = *origin - *v0;
    let u = tvec.dot(&pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(&edge1);
    let v = dir.dot(&qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(&qvec) * inv_det;
    if t > EPS {
        Some(t)
    } else {
        None
    }
}
