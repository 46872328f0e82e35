//! In-memory R-Tree over 3D points.
//!
//! This module provides an R-Tree designed for large, read-mostly point sets:
//! - Sort-Tile-Recurse (STR) bulk loading for low-overlap trees
//! - Guided insertion with quadratic split for post-load updates
//! - Radius queries with bounding-box pruning
//! - Best-first k-nearest-neighbour search with branch-and-bound pruning
//!
//! Nodes live in a flat arena and refer to each other by [`NodeId`], so a
//! built tree is a handful of contiguous allocations rather than millions of
//! boxed nodes.

pub mod rtree_constants;
pub mod rtree_types;
mod bulk_load;
mod rtree_impl;
mod split;

pub use rtree_constants::DEFAULT_NODE_CAPACITY;
pub use rtree_impl::MemoryRTree;
pub use rtree_types::{
    ChildRef, LeafEntry, Node, NodeId, RTreeConfig, RTreeStats, Slot, SpatialError, SpatialResult,
};
