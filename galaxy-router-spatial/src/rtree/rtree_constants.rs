//! Constants for the in-memory R-Tree implementation.

/// Default maximum number of entries per node (leaf or internal)
pub const DEFAULT_NODE_CAPACITY: usize = 32;

/// Smallest accepted node capacity
pub const MIN_NODE_CAPACITY: usize = 4;

/// Largest accepted node capacity
pub const MAX_NODE_CAPACITY: usize = 256;

/// Minimum fill of a node produced by a split, as a fraction of capacity
pub const MIN_FILL_RATIO: f64 = 0.4;
