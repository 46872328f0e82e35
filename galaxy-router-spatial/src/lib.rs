//! # Galaxy Router Spatial - 3D Spatial Indexing for Star Systems
//!
//! This crate provides an in-memory R-Tree over 3D points, sized for
//! datasets of tens of millions of star systems, plus the plumbing to feed
//! it from the ingestion pipeline's packed record files and from snapshots.
//!
//! ## Features
//!
//! - **STR Bulk Loading**: Sort-Tile-Recurse packing builds a full, shallow tree in O(N log N)
//! - **Incremental Insert**: Guided insertion with quadratic split for post-load updates
//! - **Radius Queries**: Bounding-box pruning with exact Euclidean refinement
//! - **K-Nearest**: Best-first branch-and-bound search
//! - **Thread Safe Reads**: A built index is `Send + Sync` and queries never mutate
//! - **Snapshots**: Save and restore a validated dataset with `bincode`
//! - **Parallel Build**: Enable the `parallel` feature to sort with rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use galaxy_router_spatial::{Point3, SpatialIndex, StarSystem};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let index = SpatialIndex::build(vec![
//!     StarSystem::new(1, 0.0, 0.0, 0.0),
//!     StarSystem::new(2, 3.0, 4.0, 0.0),
//! ])?;
//!
//! let nearest = index.nearest(&Point3::new(3.0, 3.0, 0.0), 1)?;
//! assert_eq!(nearest, vec![(2, 1.0)]);
//! # Ok(())
//! # }
//! ```

// Core R-Tree modules
pub mod bounding_box;
pub mod geometry;
pub mod rtree;

// Dataset modules
pub mod records;
pub mod snapshot;
pub mod spatial_index;

// Re-export R-Tree types
pub use bounding_box::BoundingBox;
pub use rtree::{
    MemoryRTree, RTreeConfig, RTreeStats, Slot, SpatialError, SpatialResult,
    DEFAULT_NODE_CAPACITY,
};

// Re-export dataset types
pub use geometry::{Point3, StarSystem};
pub use records::{read_packed_records, write_packed_records, PackedRecordReader, RECORD_SIZE};
pub use spatial_index::SpatialIndex;
