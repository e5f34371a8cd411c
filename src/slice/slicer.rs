//! Slicer - Core slicing engine.
//!
//! This module provides the driver that converts a 3D mesh into a series
//! of 2D layers: build the edge connectivity and the AABB tree once, then
//! compute every requested plane as a pure function of `(mesh, tree, z)`.
//! Layers share nothing, so they can be computed in parallel; results are
//! written into per-index slots and assembled in ascending Z order.

use super::chain::{chain_segments, ChainConfig};
use super::facet::slice_triangle;
use super::layer::{Layer, SliceResult, SliceStats};
use super::segment::{SegmentKind, SliceSegment};
use crate::geometry::AABBTree;
use crate::mesh::{EdgeMap, TriangleMesh};
use crate::{scale, CoordF, Error, Result};
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Configuration of the slicing engine.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct SlicerConfig {
    /// Reconnection tolerances for the chaining engine.
    pub chain: ChainConfig,
    /// Compute layers on the rayon thread pool instead of sequentially.
    pub parallel: bool,
}

impl SlicerConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the chaining configuration.
    pub fn chain(mut self, chain: ChainConfig) -> Self {
        self.chain = chain;
        self
    }

    /// Builder method: enable or disable parallel layer computation.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// The slicing engine: mesh in, ordered layers out.
pub struct Slicer {
    config: SlicerConfig,
}

impl Slicer {
    /// Create a new slicer with the given configuration.
    pub fn new(config: SlicerConfig) -> Self {
        Self { config }
    }

    /// Create a new slicer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(SlicerConfig::default())
    }

    /// Get the configuration.
    pub fn config(&self) -> &SlicerConfig {
        &self.config
    }

    /// Slice a mesh at the given plane heights (millimetres, ascending).
    ///
    /// The heights come from an external layer-height policy; this core
    /// imposes no schedule of its own beyond requiring monotonic order.
    pub fn slice(&self, mesh: &TriangleMesh, zs: &[CoordF]) -> Result<SliceResult> {
        self.slice_impl(mesh, zs, None)
    }

    /// Like [`Slicer::slice`], with cooperative cancellation. The flag is
    /// checked between layers, never mid-layer; a cancelled run returns
    /// [`Error::Cancelled`].
    pub fn slice_with_cancel(
        &self,
        mesh: &TriangleMesh,
        zs: &[CoordF],
        cancel: &AtomicBool,
    ) -> Result<SliceResult> {
        self.slice_impl(mesh, zs, Some(cancel))
    }

    /// Slice a mesh at a single height. Convenience for tests and
    /// one-off queries; builds the spatial index on each call, so use
    /// [`Slicer::slice`] for whole prints.
    pub fn slice_at_z(&self, mesh: &TriangleMesh, z: CoordF) -> Result<Layer> {
        if mesh.is_empty() {
            return Err(Error::Mesh("cannot slice an empty mesh".into()));
        }
        let tree = AABBTree::build(mesh);
        Ok(slice_layer(mesh, &tree, 0, z, &self.config.chain))
    }

    fn slice_impl(
        &self,
        mesh: &TriangleMesh,
        zs: &[CoordF],
        cancel: Option<&AtomicBool>,
    ) -> Result<SliceResult> {
        if mesh.is_empty() {
            return Err(Error::Mesh("cannot slice an empty mesh".into()));
        }
        if zs.is_empty() {
            return Err(Error::Slicing("no slice heights requested".into()));
        }
        if zs.windows(2).any(|w| w[1] < w[0]) {
            return Err(Error::Slicing(
                "slice heights must be monotonically increasing".into(),
            ));
        }

        let start = Instant::now();
        info!(
            "slicing {} triangles at {} heights ({})",
            mesh.triangle_count(),
            zs.len(),
            if self.config.parallel {
                "parallel"
            } else {
                "sequential"
            }
        );

        let tree = AABBTree::build(mesh);
        debug!(
            "aabb tree: {} nodes over {} triangles",
            tree.node_count(),
            tree.primitive_count()
        );

        let cancelled = || cancel.map(|c| c.load(Ordering::Relaxed)).unwrap_or(false);

        let layers: Vec<Option<Layer>> = if self.config.parallel {
            zs.par_iter()
                .enumerate()
                .map(|(index, &z)| {
                    if cancelled() {
                        None
                    } else {
                        Some(slice_layer(mesh, &tree, index, z, &self.config.chain))
                    }
                })
                .collect()
        } else {
            let mut out = Vec::with_capacity(zs.len());
            for (index, &z) in zs.iter().enumerate() {
                if cancelled() {
                    out.push(None);
                    break;
                }
                out.push(Some(slice_layer(mesh, &tree, index, z, &self.config.chain)));
            }
            out
        };

        if layers.len() < zs.len() || layers.iter().any(Option::is_none) {
            info!("slicing cancelled after {:?}", start.elapsed());
            return Err(Error::Cancelled);
        }
        let layers: Vec<Layer> = layers.into_iter().flatten().collect();

        let stats = compute_stats(mesh, zs, &layers, start.elapsed());
        if stats.unresolved > 0 {
            log::warn!(
                "{} open polylines could not be reconnected across {} layers",
                stats.unresolved,
                stats.layers
            );
        }
        info!(
            "sliced {} layers in {:?} ({} segments, {} gaps closed)",
            stats.layers, stats.duration, stats.segments, stats.gaps_closed
        );

        Ok(SliceResult { layers, stats })
    }
}

impl Default for Slicer {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Slice one plane: query the tree, run the predicate over the candidate
/// triangles, filter the segments that contribute to this layer's
/// contours, and chain them.
fn slice_layer(
    mesh: &TriangleMesh,
    tree: &AABBTree,
    index: usize,
    z: CoordF,
    chain_config: &ChainConfig,
) -> Layer {
    let candidates = tree.query_plane(z);

    let mut segments: Vec<SliceSegment> = Vec::with_capacity(candidates.len());
    for &tri in &candidates {
        for seg in slice_triangle(mesh, tri, z) {
            if segment_contributes(&seg, mesh.edge_map()) {
                segments.push(seg);
            }
        }
    }

    let (polygons, diagnostics) = chain_segments(&segments, chain_config);
    Layer {
        index,
        z: scale(z),
        polygons,
        candidate_triangles: candidates.len(),
        diagnostics,
    }
}

/// Which segments of a plane contribute to that plane's contours.
///
/// Crossing and vertex-on-plane segments always do. An on-plane edge is
/// the upper rim of the face below it, so the `top` variant contributes;
/// the bottom variant only matters on a boundary edge, where no face
/// below exists to produce the rim. Coplanar faces contribute their
/// boundary edges only: their interior edges are either duplicated by
/// the coplanar neighbor or covered by an adjacent face's rim.
fn segment_contributes(seg: &SliceSegment, edge_map: &EdgeMap) -> bool {
    match seg.kind {
        SegmentKind::Crossing | SegmentKind::VertexOnPlane { .. } => true,
        SegmentKind::EdgeOnPlane { edge, top } => top || edge_map.is_boundary(edge),
        SegmentKind::FaceOnPlane { edge, .. } => edge_map.is_boundary(edge),
    }
}

/// Uniform layer schedule: mid-plane heights for a constant layer height
/// (with a possibly different first layer), the usual policy of the
/// Slic3r family. Returns an empty list for meshes without vertical
/// extent.
pub fn uniform_z_heights(
    mesh: &TriangleMesh,
    layer_height: CoordF,
    first_layer_height: CoordF,
) -> Vec<CoordF> {
    let bb = mesh.bounding_box();
    if !bb.is_defined() || layer_height <= 0.0 || first_layer_height <= 0.0 {
        return Vec::new();
    }
    let min_z = bb.min.z;
    let max_z = bb.max.z;
    if max_z <= min_z {
        return Vec::new();
    }

    let mut heights = Vec::new();
    let mut bottom = min_z;

    let top = (bottom + first_layer_height).min(max_z);
    heights.push((bottom + top) / 2.0);
    bottom = top;

    while bottom < max_z {
        let top = (bottom + layer_height).min(max_z);
        heights.push((bottom + top) / 2.0);
        bottom = top;
    }
    heights
}

fn compute_stats(
    mesh: &TriangleMesh,
    zs: &[CoordF],
    layers: &[Layer],
    duration: std::time::Duration,
) -> SliceStats {
    let mut stats = SliceStats {
        layers: layers.len(),
        triangles: mesh.triangle_count(),
        degenerate_triangles: mesh.stats().degenerate_triangles,
        duration,
        ..Default::default()
    };

    let mut candidate_total = 0usize;
    for (i, layer) in layers.iter().enumerate() {
        candidate_total += layer.candidate_triangles;
        stats.segments += layer.diagnostics.segments;
        stats.gaps_closed += layer.diagnostics.gaps_closed;
        stats.unresolved += layer.diagnostics.unresolved;

        // Volume estimate: layer area times the spacing to the next plane
        let spacing = if i + 1 < zs.len() {
            zs[i + 1] - zs[i]
        } else if i > 0 {
            zs[i] - zs[i - 1]
        } else {
            0.0
        };
        stats.volume_mm3 += layer.area_mm2() * spacing;
    }
    if !layers.is_empty() {
        stats.triangles_per_layer = candidate_total as CoordF / layers.len() as CoordF;
    }
    stats
}
