//! Layer and slice result types.
//!
//! A [`Layer`] is the output of slicing one Z height: the chained
//! polygons plus the reconnection diagnostics for that plane. Layers
//! carry no cross-layer state; a [`SliceResult`] simply collects them in
//! ascending Z order together with aggregate statistics.

use super::chain::ChainDiagnostics;
use crate::geometry::Polygons;
use crate::{unscale, Coord, CoordF, SCALING_FACTOR};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One slicing plane's worth of contours.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Layer {
    /// Layer number, counted from the bottom.
    pub index: usize,
    /// Plane height in scaled units.
    pub z: Coord,
    /// Chained contours; open ones are reconnection failures left to the
    /// caller.
    pub polygons: Polygons,
    /// Number of candidate triangles the spatial index returned.
    pub candidate_triangles: usize,
    /// Reconnection counters.
    pub diagnostics: ChainDiagnostics,
}

impl Layer {
    /// Plane height in millimetres.
    #[inline]
    pub fn z_mm(&self) -> CoordF {
        unscale(self.z)
    }

    /// Whether the layer has no contours at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Number of closed contours.
    pub fn closed_count(&self) -> usize {
        self.polygons.iter().filter(|p| p.is_closed()).count()
    }

    /// Number of unresolved open polylines.
    pub fn open_count(&self) -> usize {
        self.polygons.iter().filter(|p| !p.is_closed()).count()
    }

    /// Total absolute area of the closed contours, in mm². An estimate:
    /// contours are not classified as outer or hole here, so nested
    /// contours count positively.
    pub fn area_mm2(&self) -> CoordF {
        self.polygons
            .iter()
            .filter(|p| p.is_closed())
            .map(|p| p.area())
            .sum::<CoordF>()
            / (SCALING_FACTOR * SCALING_FACTOR)
    }
}

/// Aggregate statistics over a whole slice run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SliceStats {
    /// Number of layers produced.
    pub layers: usize,
    /// Triangles in the mesh (including degenerate ones).
    pub triangles: usize,
    /// Degenerate triangles excluded from slicing.
    pub degenerate_triangles: usize,
    /// Average candidate triangles per layer.
    pub triangles_per_layer: CoordF,
    /// Total segments emitted across all layers.
    pub segments: usize,
    /// Total gaps bridged by the chaining engine.
    pub gaps_closed: usize,
    /// Total unresolved open polylines.
    pub unresolved: usize,
    /// Estimated sliced volume in mm³ (layer areas times layer spacing).
    pub volume_mm3: CoordF,
    /// Wall-clock slicing time.
    pub duration: Duration,
}

/// The ordered result of slicing a mesh: one [`Layer`] per requested Z,
/// ascending, plus aggregate statistics.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SliceResult {
    pub layers: Vec<Layer>,
    pub stats: SliceStats,
}

impl SliceResult {
    /// Number of layers.
    #[inline]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Whether any layer kept an unresolved open polyline.
    pub fn has_unresolved(&self) -> bool {
        self.stats.unresolved > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Polygon};
    use crate::scale;

    #[test]
    fn test_layer_counts() {
        let closed = Polygon::from_points(vec![
            Point::new_scale(0.0, 0.0),
            Point::new_scale(2.0, 0.0),
            Point::new_scale(2.0, 2.0),
            Point::new_scale(0.0, 2.0),
        ]);
        let open = Polygon::open_from_points(vec![Point::new(0, 0), Point::new(100, 0)]);
        let layer = Layer {
            index: 3,
            z: scale(0.7),
            polygons: vec![closed, open],
            candidate_triangles: 8,
            diagnostics: ChainDiagnostics::default(),
        };
        assert!((layer.z_mm() - 0.7).abs() < 1e-9);
        assert_eq!(layer.closed_count(), 1);
        assert_eq!(layer.open_count(), 1);
        assert!((layer.area_mm2() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_layer() {
        let layer = Layer::default();
        assert!(layer.is_empty());
        assert_eq!(layer.area_mm2(), 0.0);
    }
}
