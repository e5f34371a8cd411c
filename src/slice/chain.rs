//! Segment chaining engine.
//!
//! Turns the unordered bag of segments emitted for one Z height into
//! closed polygons, in three progressively relaxed passes:
//!
//! 1. **Topology join** - endpoints referencing the same mesh edge or
//!    vertex are joined regardless of numeric distance. This is the most
//!    reliable join because it uses mesh connectivity.
//! 2. **Exact endpoint match** - remaining open ends within a sub-micron
//!    tolerance are joined. This resolves endpoints interpolated
//!    independently with no shared topology tag.
//! 3. **Gap closing** - remaining ends are indexed in a uniform grid and
//!    bridged when distance and angular deviation stay under the
//!    configured thresholds.
//!
//! Whatever is still open after the third pass is emitted as an open
//! polygon and counted in the diagnostics; the caller decides how to
//! treat it. Processing order is deterministic: polylines are visited in
//! ascending order of their first segment index, and candidate ties are
//! broken by distance, then index.

use super::segment::{EndpointTag, SliceSegment};
use crate::geometry::{Point, PointF, Polygon, Polyline};
use crate::{scale, Coord, CoordF};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// All reconnection tolerances in one place, threaded explicitly into
/// the engine so behavior is reproducible and testable.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Maximum endpoint distance for Phase 2 exact matching, in mm.
    pub exact_epsilon_mm: CoordF,
    /// Maximum gap Phase 3 will bridge, in mm.
    pub max_gap_mm: CoordF,
    /// Maximum deviation from an endpoint's outward tangent for Phase 3
    /// candidates, in degrees.
    pub max_gap_angle_deg: CoordF,
    /// Whether Phase 3 may bridge the two ends of the same polyline
    /// (self-closing) or only ends of different polylines.
    pub allow_self_closing: bool,
    /// Tolerance for dropping collinear points from finished contours,
    /// in mm.
    pub collinear_epsilon_mm: CoordF,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            exact_epsilon_mm: 0.001,
            max_gap_mm: 2.0,
            max_gap_angle_deg: 45.0,
            allow_self_closing: true,
            collinear_epsilon_mm: 1e-5,
        }
    }
}

impl ChainConfig {
    /// Builder method: set the Phase 2 matching tolerance.
    pub fn exact_epsilon(mut self, mm: CoordF) -> Self {
        self.exact_epsilon_mm = mm;
        self
    }

    /// Builder method: set the maximum bridgeable gap.
    pub fn max_gap(mut self, mm: CoordF) -> Self {
        self.max_gap_mm = mm;
        self
    }

    /// Builder method: set the maximum tangent deviation.
    pub fn max_gap_angle(mut self, degrees: CoordF) -> Self {
        self.max_gap_angle_deg = degrees;
        self
    }

    /// Builder method: allow or forbid self-closing in Phase 3.
    pub fn self_closing(mut self, allow: bool) -> Self {
        self.allow_self_closing = allow;
        self
    }
}

/// Per-layer reconnection counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDiagnostics {
    /// Segments fed into the engine.
    pub segments: usize,
    /// Joins made through shared mesh features (Phase 1).
    pub topology_joins: usize,
    /// Joins made through exact endpoint proximity (Phase 2).
    pub exact_joins: usize,
    /// Gaps bridged (Phase 3).
    pub gaps_closed: usize,
    /// Polylines still open after Phase 1.
    pub open_after_topology: usize,
    /// Polylines still open after Phase 2.
    pub open_after_exact: usize,
    /// Polylines still open after all three phases.
    pub unresolved: usize,
}

/// A polyline under construction, with the mesh features of its free
/// ends and a stable ordering key.
#[derive(Clone, Debug)]
struct OpenChain {
    polyline: Polyline,
    front_tag: EndpointTag,
    back_tag: EndpointTag,
    /// Index of the first segment that seeded this chain.
    key: usize,
    closed: bool,
}

impl OpenChain {
    fn reverse(&mut self) {
        self.polyline.reverse();
        std::mem::swap(&mut self.front_tag, &mut self.back_tag);
    }

    /// Append another chain whose front continues this chain's back.
    /// Coincident junction points are stored once.
    fn append(&mut self, other: OpenChain) {
        let mut points = other.polyline.into_points();
        let mut iter = points.drain(..);
        if let Some(first) = iter.next() {
            if self.polyline.last_point() != first {
                self.polyline.push(first);
            }
        }
        for p in iter {
            self.polyline.push(p);
        }
        self.back_tag = other.back_tag;
        self.key = self.key.min(other.key);
    }
}

/// Chain one layer's segments into polygons.
///
/// Returns the polygons (closed where reconnection succeeded, open
/// otherwise) together with the per-phase diagnostics. The result is
/// deterministic for a given segment list, and running the engine on its
/// own output is a no-op.
pub fn chain_segments(
    segments: &[SliceSegment],
    config: &ChainConfig,
) -> (Vec<Polygon>, ChainDiagnostics) {
    let mut diag = ChainDiagnostics {
        segments: segments.len(),
        ..Default::default()
    };
    if segments.is_empty() {
        return (Vec::new(), diag);
    }

    let mut chains = phase_topology(segments, &mut diag);
    diag.open_after_topology = chains.iter().filter(|c| !c.closed).count();

    phase_exact(&mut chains, config, &mut diag);
    diag.open_after_exact = chains.iter().filter(|c| !c.closed).count();

    phase_gap_closing(&mut chains, config, &mut diag);
    diag.unresolved = chains.iter().filter(|c| !c.closed).count();

    // Assemble output in stable key order
    chains.sort_by_key(|c| c.key);
    let collinear_tol: Coord = scale(config.collinear_epsilon_mm).max(0);
    let mut polygons = Vec::with_capacity(chains.len());
    for chain in chains {
        // Open polylines are diagnostic output and stay verbatim; only
        // finished contours shed their fold points.
        let polygon = if chain.closed {
            let mut polygon = chain.polyline.into_polygon();
            polygon.simplify_collinear(collinear_tol);
            polygon
        } else {
            chain.polyline.into_open_polygon()
        };
        if polygon.is_valid() {
            polygons.push(polygon);
        }
    }
    (polygons, diag)
}

/// Phase 1: join endpoints referencing the same mesh feature.
fn phase_topology(segments: &[SliceSegment], diag: &mut ChainDiagnostics) -> Vec<OpenChain> {
    // Index both endpoints of every segment by their feature tag
    let mut index: HashMap<EndpointTag, Vec<(usize, usize)>> = HashMap::new();
    for (i, seg) in segments.iter().enumerate() {
        for end in 0..2 {
            let tag = seg.tag(end);
            if !matches!(tag, EndpointTag::Free) {
                index.entry(tag).or_default().push((i, end));
            }
        }
    }

    let mut used = vec![false; segments.len()];
    let mut chains = Vec::new();

    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let seg = &segments[start];
        let mut chain = OpenChain {
            polyline: Polyline::from_points(vec![seg.line.a, seg.line.b]),
            front_tag: seg.tag(0),
            back_tag: seg.tag(1),
            key: start,
            closed: false,
        };

        // Grow at the back, then flip and grow at the (former) front
        for _ in 0..2 {
            loop {
                if chain.front_tag.matches(&chain.back_tag) && chain.polyline.len() >= 3 {
                    chain.closed = true;
                    break;
                }
                let Some((idx, end)) = find_topology_match(&chain.back_tag, &index, &used) else {
                    break;
                };
                used[idx] = true;
                let next = &segments[idx];
                let (near, far, far_tag) = if end == 0 {
                    (next.line.a, next.line.b, next.tag(1))
                } else {
                    (next.line.b, next.line.a, next.tag(0))
                };
                if chain.polyline.last_point() != near {
                    chain.polyline.push(near);
                }
                chain.polyline.push(far);
                chain.back_tag = far_tag;
                diag.topology_joins += 1;
            }
            if chain.closed {
                break;
            }
            chain.reverse();
        }

        chains.push(chain);
    }
    chains
}

/// Smallest-index unused segment endpoint referencing the same feature.
fn find_topology_match(
    tag: &EndpointTag,
    index: &HashMap<EndpointTag, Vec<(usize, usize)>>,
    used: &[bool],
) -> Option<(usize, usize)> {
    if matches!(tag, EndpointTag::Free) {
        return None;
    }
    index
        .get(tag)?
        .iter()
        .find(|(idx, _)| !used[*idx])
        .copied()
}

/// Phase 2: join open ends whose squared distance is below the exact
/// tolerance. A chain whose own two ends meet within the tolerance is
/// closed directly - at sub-micron range they are the same point.
fn phase_exact(chains: &mut Vec<OpenChain>, config: &ChainConfig, diag: &mut ChainDiagnostics) {
    let eps = scale(config.exact_epsilon_mm).max(0) as i128;
    let eps2 = eps * eps;

    loop {
        let order = open_chain_order(chains);

        // Self-closure first: it removes ends from the candidate pool
        let mut did_close = false;
        for &i in &order {
            let pl = &chains[i].polyline;
            if pl.len() >= 3 && pl.first_point().distance_squared(&pl.last_point()) <= eps2 {
                chains[i].closed = true;
                diag.exact_joins += 1;
                did_close = true;
            }
        }
        if did_close {
            continue;
        }

        let Some((i, i_front, j, j_front)) = best_exact_pair(chains, &order, eps2) else {
            break;
        };
        merge_chains(chains, i, i_front, j, j_front);
        diag.exact_joins += 1;
    }
}

/// Indices of open chains in ascending key order.
fn open_chain_order(chains: &[OpenChain]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..chains.len()).filter(|&i| !chains[i].closed).collect();
    order.sort_by_key(|&i| chains[i].key);
    order
}

/// Closest qualifying pair of ends from different open chains,
/// ties broken by ascending key order.
fn best_exact_pair(
    chains: &[OpenChain],
    order: &[usize],
    eps2: i128,
) -> Option<(usize, bool, usize, bool)> {
    let mut best: Option<(i128, usize, bool, usize, bool)> = None;
    for (a, &i) in order.iter().enumerate() {
        for &j in order.iter().skip(a + 1) {
            for &i_front in &[false, true] {
                for &j_front in &[false, true] {
                    let pi = end_point(&chains[i], i_front);
                    let pj = end_point(&chains[j], j_front);
                    let d2 = pi.distance_squared(&pj);
                    if d2 <= eps2 {
                        let candidate = (d2, i, i_front, j, j_front);
                        let better = match &best {
                            None => true,
                            Some((bd2, ..)) => d2 < *bd2,
                        };
                        if better {
                            best = Some(candidate);
                        }
                    }
                }
            }
        }
    }
    best.map(|(_, i, i_front, j, j_front)| (i, i_front, j, j_front))
}

#[inline]
fn end_point(chain: &OpenChain, front: bool) -> Point {
    if front {
        chain.polyline.first_point()
    } else {
        chain.polyline.last_point()
    }
}

/// Outward tangent at one end of a chain.
#[inline]
fn end_direction(chain: &OpenChain, front: bool) -> Option<PointF> {
    if front {
        chain.polyline.start_direction()
    } else {
        chain.polyline.end_direction()
    }
}

/// Join chain `j` onto chain `i` at the given ends. The merged chain
/// keeps the smaller ordering key and replaces slot `i`; slot `j` is
/// removed.
fn merge_chains(chains: &mut Vec<OpenChain>, i: usize, i_front: bool, j: usize, j_front: bool) {
    let mut other = chains.remove(j);
    let i = if j < i { i - 1 } else { i };
    let target = &mut chains[i];

    // Orient so the connection runs target.back -> other.front
    if i_front {
        target.reverse();
    }
    if !j_front {
        other.reverse();
    }
    target.append(other);
}

/// Grid cell size relative to the maximum gap: one cell per gap radius,
/// searched over the 3x3 neighborhood.
fn grid_cell(p: &Point, cell: Coord) -> (Coord, Coord) {
    (p.x.div_euclid(cell), p.y.div_euclid(cell))
}

/// Phase 3: bridge remaining gaps below the distance and angle
/// thresholds, best candidate first.
fn phase_gap_closing(
    chains: &mut Vec<OpenChain>,
    config: &ChainConfig,
    diag: &mut ChainDiagnostics,
) {
    let max_gap = scale(config.max_gap_mm);
    if max_gap <= 0 {
        return;
    }
    let max_gap2 = max_gap as i128 * max_gap as i128;
    let max_angle = config.max_gap_angle_deg.to_radians();
    let cell = max_gap.max(1);

    loop {
        let order = open_chain_order(chains);
        if order.is_empty() {
            break;
        }

        // Uniform grid over the free endpoints of all open chains
        let mut grid: HashMap<(Coord, Coord), Vec<(usize, bool)>> = HashMap::new();
        for &i in &order {
            for &front in &[false, true] {
                grid.entry(grid_cell(&end_point(&chains[i], front), cell))
                    .or_default()
                    .push((i, front));
            }
        }

        let mut connected = false;
        for &i in &order {
            for &front in &[false, true] {
                if let Some((j, j_front)) =
                    best_gap_candidate(chains, &grid, i, front, cell, max_gap2, max_angle, config)
                {
                    if j == i {
                        // Bridge the chain's own two ends
                        chains[i].closed = true;
                    } else {
                        merge_chains(chains, i, front, j, j_front);
                    }
                    diag.gaps_closed += 1;
                    connected = true;
                    break;
                }
            }
            if connected {
                break;
            }
        }
        if !connected {
            break;
        }
    }
}

/// Score the qualifying candidates near one endpoint and return the best
/// one. Candidates are scored by a weighted combination of normalized
/// distance and tangent deviation; ties go to the smaller distance, then
/// the lower (chain, end) index.
#[allow(clippy::too_many_arguments)]
fn best_gap_candidate(
    chains: &[OpenChain],
    grid: &HashMap<(Coord, Coord), Vec<(usize, bool)>>,
    i: usize,
    front: bool,
    cell: Coord,
    max_gap2: i128,
    max_angle: CoordF,
    config: &ChainConfig,
) -> Option<(usize, bool)> {
    let origin = end_point(&chains[i], front);
    let tangent = end_direction(&chains[i], front);
    let max_gap = (max_gap2 as CoordF).sqrt();

    let (cx, cy) = grid_cell(&origin, cell);
    let mut best: Option<(CoordF, i128, usize, bool)> = None;

    for dx in -1..=1 {
        for dy in -1..=1 {
            let Some(bucket) = grid.get(&(cx + dx, cy + dy)) else {
                continue;
            };
            for &(j, j_front) in bucket {
                if j == i {
                    // Only the opposite end of a self-closable chain
                    if !config.allow_self_closing
                        || j_front == front
                        || chains[i].polyline.len() < 3
                    {
                        continue;
                    }
                } else if chains[j].closed {
                    continue;
                }

                let target = end_point(&chains[j], j_front);
                let d2 = origin.distance_squared(&target);
                if d2 > max_gap2 {
                    continue;
                }

                // Deviation of the bridge from the outward tangent;
                // zero-length gaps have no direction to deviate
                let angle = if d2 == 0 {
                    0.0
                } else {
                    match tangent {
                        Some(t) => {
                            let bridge = (target - origin).to_f64().normalize();
                            t.dot(&bridge).clamp(-1.0, 1.0).acos()
                        }
                        None => 0.0,
                    }
                };
                if angle > max_angle {
                    continue;
                }

                let dist = (d2 as CoordF).sqrt();
                let score = dist / max_gap + angle / max_angle.max(CoordF::EPSILON);
                let better = match &best {
                    None => true,
                    Some((bs, bd2, bj, bjf)) => {
                        score < *bs
                            || (score == *bs && d2 < *bd2)
                            || (score == *bs && d2 == *bd2 && (j, j_front) < (*bj, *bjf))
                    }
                };
                if better {
                    best = Some((score, d2, j, j_front));
                }
            }
        }
    }
    best.map(|(_, _, j, j_front)| (j, j_front))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slice::facet::slice_triangle;
    use crate::slice::segment::SegmentKind;
    use crate::geometry::{Line, Vec3};
    use crate::mesh::TriangleMesh;
    use crate::unscale;

    fn crossing(ax: f64, ay: f64, bx: f64, by: f64, ea: u32, eb: u32) -> SliceSegment {
        SliceSegment {
            line: Line::new(Point::new_scale(ax, ay), Point::new_scale(bx, by)),
            triangle_id: 0,
            tags: [EndpointTag::Edge(ea), EndpointTag::Edge(eb)],
            kind: SegmentKind::Crossing,
        }
    }

    fn untagged(ax: f64, ay: f64, bx: f64, by: f64) -> SliceSegment {
        SliceSegment {
            line: Line::new(Point::new_scale(ax, ay), Point::new_scale(bx, by)),
            triangle_id: 0,
            tags: [EndpointTag::Free, EndpointTag::Free],
            kind: SegmentKind::Crossing,
        }
    }

    #[test]
    fn test_chain_empty() {
        let (polygons, diag) = chain_segments(&[], &ChainConfig::default());
        assert!(polygons.is_empty());
        assert_eq!(diag.segments, 0);
        assert_eq!(diag.unresolved, 0);
    }

    #[test]
    fn test_topology_join_square() {
        // Four segments sharing edge tags pairwise, shuffled
        let segs = vec![
            crossing(10.0, 0.0, 10.0, 10.0, 1, 2),
            crossing(0.0, 10.0, 0.0, 0.0, 3, 0),
            crossing(0.0, 0.0, 10.0, 0.0, 0, 1),
            crossing(10.0, 10.0, 0.0, 10.0, 2, 3),
        ];
        let (polygons, diag) = chain_segments(&segs, &ChainConfig::default());
        assert_eq!(polygons.len(), 1);
        assert!(polygons[0].is_closed());
        assert_eq!(polygons[0].len(), 4);
        assert!((polygons[0].area_mm2() - 100.0).abs() < 0.1);
        assert_eq!(diag.topology_joins, 3);
        assert_eq!(diag.unresolved, 0);
    }

    #[test]
    fn test_topology_join_ignores_numeric_distance() {
        // Same topology keys but perturbed junction coordinates: the
        // topology pass must join them anyway
        let mut segs = vec![
            crossing(0.0, 0.0, 10.0, 0.0, 0, 1),
            crossing(10.001, 0.002, 10.0, 10.0, 1, 2),
            crossing(10.0, 10.0, 0.0, 10.0, 2, 3),
            crossing(0.0, 10.0, 0.001, 0.001, 3, 0),
        ];
        segs.swap(1, 3);
        let (polygons, diag) = chain_segments(&segs, &ChainConfig::default());
        assert_eq!(polygons.len(), 1);
        assert!(polygons[0].is_closed());
        assert_eq!(diag.unresolved, 0);
        assert_eq!(diag.gaps_closed, 0);
    }

    #[test]
    fn test_exact_match_without_tags() {
        // No topology tags at all: Phase 2 must stitch by coordinates
        let segs = vec![
            untagged(0.0, 0.0, 10.0, 0.0),
            untagged(10.0, 0.0, 10.0, 10.0),
            untagged(10.0, 10.0, 0.0, 10.0),
            untagged(0.0, 10.0, 0.0, 0.0),
        ];
        let (polygons, diag) = chain_segments(&segs, &ChainConfig::default());
        assert_eq!(diag.open_after_topology, 4);
        assert_eq!(polygons.len(), 1);
        assert!(polygons[0].is_closed());
        assert_eq!(polygons[0].len(), 4);
        assert!(diag.exact_joins >= 3);
        assert_eq!(diag.unresolved, 0);
    }

    #[test]
    fn test_gap_closing_merges_polylines() {
        // Two open polylines whose nearest endpoints are 0.1mm apart
        // with no angular deviation
        let segs = vec![
            untagged(0.0, 0.0, 10.0, 0.0),
            untagged(10.1, 0.0, 20.0, 0.0),
        ];
        let config = ChainConfig::default().self_closing(false);
        let (polygons, diag) = chain_segments(&segs, &config);
        assert_eq!(diag.gaps_closed, 1);
        assert_eq!(polygons.len(), 1);
        // Both endpoints survive: a bridge segment, not a weld
        assert_eq!(polygons[0].len(), 4);
        assert!(!polygons[0].is_closed());
        assert_eq!(diag.unresolved, 1);
    }

    #[test]
    fn test_gap_closing_respects_max_distance() {
        let segs = vec![
            untagged(0.0, 0.0, 10.0, 0.0),
            untagged(15.0, 0.0, 25.0, 0.0),
        ];
        // 5mm gap, 2mm limit: stays open
        let (polygons, diag) = chain_segments(&segs, &ChainConfig::default());
        assert_eq!(diag.gaps_closed, 0);
        assert_eq!(diag.unresolved, 2);
        assert_eq!(polygons.len(), 2);
        assert!(polygons.iter().all(|p| !p.is_closed()));
    }

    #[test]
    fn test_gap_closing_respects_max_angle() {
        // The candidate endpoints are within range but sit behind the
        // outward tangents: 135 degrees seen from (10,0), 90 degrees
        // seen from (9,1)
        let segs = vec![
            untagged(0.0, 0.0, 10.0, 0.0),
            untagged(9.0, 1.0, 12.0, 4.0),
        ];
        let config = ChainConfig::default().max_gap_angle(45.0).self_closing(false);
        let (_, diag) = chain_segments(&segs, &config);
        assert_eq!(diag.gaps_closed, 0);
        assert_eq!(diag.unresolved, 2);
    }

    #[test]
    fn test_self_closing_configurable() {
        // A 3/4 ring of segments with a 0.5mm gap between its own ends
        let segs = vec![
            untagged(0.0, 0.0, 10.0, 0.0),
            untagged(10.0, 0.0, 10.0, 10.0),
            untagged(10.0, 10.0, 0.0, 10.0),
            untagged(0.0, 10.0, 0.0, 0.5),
        ];

        let closed = chain_segments(&segs, &ChainConfig::default().self_closing(true));
        assert_eq!(closed.1.gaps_closed, 1);
        assert_eq!(closed.1.unresolved, 0);
        assert_eq!(closed.0.len(), 1);
        assert!(closed.0[0].is_closed());

        let open = chain_segments(&segs, &ChainConfig::default().self_closing(false));
        assert_eq!(open.1.gaps_closed, 0);
        assert_eq!(open.1.unresolved, 1);
        assert!(!open.0[0].is_closed());
    }

    #[test]
    fn test_closure_monotonicity() {
        // Mixed input: a tagged square, an untagged pair with a small
        // gap, and a stray far-away segment
        let mut segs = vec![
            crossing(0.0, 0.0, 10.0, 0.0, 0, 1),
            crossing(10.0, 0.0, 10.0, 10.0, 1, 2),
            crossing(10.0, 10.0, 0.0, 10.0, 2, 3),
            crossing(0.0, 10.0, 0.0, 0.0, 3, 0),
            untagged(20.0, 0.0, 30.0, 0.0),
            untagged(30.05, 0.0, 40.0, 0.0),
            untagged(100.0, 100.0, 110.0, 100.0),
        ];
        segs.reverse();
        let (_, diag) = chain_segments(&segs, &ChainConfig::default().self_closing(false));
        assert!(diag.open_after_exact <= diag.open_after_topology);
        assert!(diag.unresolved <= diag.open_after_exact);
        assert_eq!(diag.unresolved, 2);
    }

    #[test]
    fn test_chaining_is_deterministic() {
        let segs = vec![
            crossing(0.0, 0.0, 10.0, 0.0, 0, 1),
            crossing(10.0, 0.0, 10.0, 10.0, 1, 2),
            untagged(20.0, 0.0, 30.0, 0.0),
            untagged(30.05, 0.0, 40.0, 0.0),
            crossing(10.0, 10.0, 0.0, 10.0, 2, 3),
            crossing(0.0, 10.0, 0.0, 0.0, 3, 0),
        ];
        let config = ChainConfig::default();
        let (polys_a, diag_a) = chain_segments(&segs, &config);
        let (polys_b, diag_b) = chain_segments(&segs, &config);
        assert_eq!(diag_a, diag_b);
        assert_eq!(polys_a.len(), polys_b.len());
        for (a, b) in polys_a.iter().zip(polys_b.iter()) {
            assert_eq!(a.points(), b.points());
            assert_eq!(a.is_closed(), b.is_closed());
        }
    }

    #[test]
    fn test_face_on_plane_chains_via_topology() {
        // A single horizontal triangle sliced at its own height: three
        // FaceOnPlane segments closing into one triangle through Phase 1
        let mesh = TriangleMesh::from_indexed(
            vec![
                Vec3::new(0.0, 0.0, 5.0),
                Vec3::new(10.0, 0.0, 5.0),
                Vec3::new(0.0, 10.0, 5.0),
            ],
            &[[0, 1, 2]],
        );
        let segs = slice_triangle(&mesh, 0, 5.0);
        assert_eq!(segs.len(), 3);

        let (polygons, diag) = chain_segments(&segs, &ChainConfig::default());
        assert_eq!(polygons.len(), 1);
        assert!(polygons[0].is_closed());
        assert_eq!(polygons[0].len(), 3);
        assert!((polygons[0].area_mm2() - 50.0).abs() < 0.1);
        assert_eq!(diag.topology_joins, 2);
        assert_eq!(diag.unresolved, 0);
    }

    #[test]
    fn test_collinear_points_dropped() {
        // A square whose sides are split at midpoints by fold vertices
        let segs = vec![
            untagged(0.0, 0.0, 5.0, 0.0),
            untagged(5.0, 0.0, 10.0, 0.0),
            untagged(10.0, 0.0, 10.0, 10.0),
            untagged(10.0, 10.0, 0.0, 10.0),
            untagged(0.0, 10.0, 0.0, 0.0),
        ];
        let (polygons, _) = chain_segments(&segs, &ChainConfig::default());
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].len(), 4);
        for p in polygons[0].points() {
            // Only the four corners survive
            assert!(unscale(p.x) == 0.0 || unscale(p.x) == 10.0);
            assert!(unscale(p.y) == 0.0 || unscale(p.y) == 10.0);
        }
    }
}
