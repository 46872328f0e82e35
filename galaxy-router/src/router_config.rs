//! Configuration of a routing engine.

use std::sync::Arc;

use galaxy_router_spatial::{RTreeConfig, DEFAULT_NODE_CAPACITY};

use crate::codec::RegionTable;
use crate::errors::{ErrorKind, RouterError, RouterResult};

/// Settings a [`RoutingEngine`](crate::RoutingEngine) is created with.
///
/// Usually assembled through [`RouterBuilder`](crate::RouterBuilder).
/// Cloning is cheap: the region table is shared.
#[derive(Debug, Clone, Default)]
pub struct RouterConfig {
    rtree: RTreeConfig,
    region_table: Option<Arc<RegionTable>>,
}

impl RouterConfig {
    /// Default configuration: node capacity [`DEFAULT_NODE_CAPACITY`] and
    /// no region table.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rtree_config(&self) -> RTreeConfig {
        self.rtree
    }

    pub fn node_capacity(&self) -> usize {
        self.rtree.node_capacity()
    }

    /// Sets the R-tree fan-out used for every index the engine builds.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::InvalidArgument`] if `capacity` is outside the supported
    /// range.
    pub fn set_node_capacity(&mut self, capacity: usize) -> RouterResult<()> {
        match RTreeConfig::new(capacity) {
            Ok(rtree) => {
                self.rtree = rtree;
                Ok(())
            }
            Err(e) => {
                log::error!("Invalid R-tree node capacity {}: {}", capacity, e);
                Err(RouterError::new_with_cause(
                    &format!(
                        "invalid node capacity {} (default is {})",
                        capacity, DEFAULT_NODE_CAPACITY
                    ),
                    ErrorKind::InvalidArgument,
                    e.into(),
                ))
            }
        }
    }

    pub fn region_table(&self) -> Option<&Arc<RegionTable>> {
        self.region_table.as_ref()
    }

    /// Attaches the region map used by region lookups.
    ///
    /// A table that does not cover its grid is accepted with a warning;
    /// lookups against it fail with [`ErrorKind::MalformedTable`].
    pub fn set_region_table(&mut self, table: Arc<RegionTable>) {
        if !table.covers_grid() {
            log::warn!(
                "Region table covers {} cells but its grid has {}; region lookups will fail",
                table.covered_cells(),
                table.grid().cell_count()
            );
        }
        self.region_table = Some(table);
    }
}
