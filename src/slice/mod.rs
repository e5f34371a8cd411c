//! Slicing module - converts meshes into layers.
//!
//! This module contains the core slicing functionality:
//! - [`slice_triangle`] - the total triangle-plane intersection predicate
//! - [`chain_segments`] - the three-phase segment chaining engine
//! - [`Slicer`] - the driver that fans the two out over an AABB tree,
//!   one independent computation per requested Z height
//! - [`Layer`] / [`SliceResult`] - the per-plane and aggregate outputs

mod chain;
mod facet;
mod layer;
mod segment;
mod slicer;

pub use chain::{chain_segments, ChainConfig, ChainDiagnostics};
pub use facet::{slice_triangle, Z_EPSILON};
pub use layer::{Layer, SliceResult, SliceStats};
pub use segment::{EndpointTag, SegmentKind, SliceSegment};
pub use slicer::{uniform_z_heights, Slicer, SlicerConfig};
