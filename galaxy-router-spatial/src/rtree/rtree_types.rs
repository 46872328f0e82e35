//! Core types and data structures for the in-memory R-Tree.
//!
//! This module defines the fundamental types used throughout the R-Tree:
//! - Error types and result types
//! - Node types (Leaf and Internal)
//! - Tree configuration and statistics

use crate::bounding_box::BoundingBox;
use crate::geometry::Point3;
use std::io;
use thiserror::Error;

use super::rtree_constants::{
    DEFAULT_NODE_CAPACITY, MAX_NODE_CAPACITY, MIN_FILL_RATIO, MIN_NODE_CAPACITY,
};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur in spatial indexing operations
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Duplicate system id64: {0}")]
    DuplicateId(u64),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Corrupted data: {0}")]
    Corrupted(String),
}

/// Result type for spatial operations
pub type SpatialResult<T> = Result<T, SpatialError>;

/// Dense position of a point in the index's backing storage
pub type Slot = u32;

/// Position of a node in the tree's node arena
pub type NodeId = u32;

// ============================================================================
// Configuration
// ============================================================================

/// Construction-time parameters of an R-Tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RTreeConfig {
    node_capacity: usize,
}

impl Default for RTreeConfig {
    fn default() -> Self {
        RTreeConfig {
            node_capacity: DEFAULT_NODE_CAPACITY,
        }
    }
}

impl RTreeConfig {
    /// Creates a configuration with the given fan-out `M`.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::InvalidArgument`] when the capacity is outside
    /// `MIN_NODE_CAPACITY..=MAX_NODE_CAPACITY`.
    pub fn new(node_capacity: usize) -> SpatialResult<Self> {
        if !(MIN_NODE_CAPACITY..=MAX_NODE_CAPACITY).contains(&node_capacity) {
            return Err(SpatialError::InvalidArgument(format!(
                "node capacity {} outside {}..={}",
                node_capacity, MIN_NODE_CAPACITY, MAX_NODE_CAPACITY
            )));
        }
        Ok(RTreeConfig { node_capacity })
    }

    /// Maximum number of entries per node.
    pub fn node_capacity(&self) -> usize {
        self.node_capacity
    }

    /// Minimum number of entries each half of a split must receive.
    pub fn min_fill(&self) -> usize {
        ((self.node_capacity as f64 * MIN_FILL_RATIO).floor() as usize).max(1)
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Statistics about the shape of an R-Tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RTreeStats {
    pub total_entries: u64,
    pub node_count: u64,
    pub leaf_count: u64,
    pub tree_height: u32,
}

// ============================================================================
// Node Types
// ============================================================================

/// A point stored in a leaf
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeafEntry {
    pub point: Point3,
    pub slot: Slot,
}

impl LeafEntry {
    pub fn new(point: Point3, slot: Slot) -> Self {
        LeafEntry { point, slot }
    }
}

/// Reference from an internal node to one of its children
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildRef {
    pub bbox: BoundingBox,
    pub node_id: NodeId,
}

/// R-Tree node
#[derive(Debug, Clone)]
pub enum Node {
    Leaf {
        entries: Vec<LeafEntry>,
    },
    Internal {
        children: Vec<ChildRef>,
        /// Distance from the leaves; leaves' parents are level 1
        level: u32,
    },
}

impl Node {
    pub fn empty_leaf() -> Self {
        Node::Leaf {
            entries: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    pub fn len(&self) -> usize {
        match self {
            Node::Leaf { entries } => entries.len(),
            Node::Internal { children, .. } => children.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Minimal box around this node's contents.
    pub fn compute_bbox(&self) -> BoundingBox {
        match self {
            Node::Leaf { entries } => compute_entries_bbox(entries),
            Node::Internal { children, .. } => compute_children_bbox(children),
        }
    }
}

pub(crate) fn compute_entries_bbox(entries: &[LeafEntry]) -> BoundingBox {
    BoundingBox::from_points(entries.iter().map(|e| &e.point))
}

pub(crate) fn compute_children_bbox(children: &[ChildRef]) -> BoundingBox {
    children
        .iter()
        .fold(BoundingBox::empty(), |acc, c| acc.union(&c.bbox))
}
