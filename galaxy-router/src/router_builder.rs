use std::path::Path;
use std::sync::Arc;

use galaxy_router_spatial::StarSystem;

use crate::codec::RegionTable;
use crate::engine::RoutingEngine;
use crate::errors::{RouterError, RouterResult};
use crate::router_config::RouterConfig;

/// Fluent builder for a [`RoutingEngine`].
///
/// Errors raised by a setter are captured and returned from
/// [`RouterBuilder::build`] or [`RouterBuilder::load`], so a chain never
/// needs intermediate `?`. Only the first error is kept.
///
/// # Examples
///
/// ```rust
/// use galaxy_router::RoutingEngine;
/// use galaxy_router_spatial::StarSystem;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = RoutingEngine::builder()
///     .node_capacity(16)
///     .load(vec![
///         StarSystem::new(1, 0.0, 0.0, 0.0),
///         StarSystem::new(2, 5.0, 0.0, 0.0),
///     ])?;
/// assert_eq!(engine.len(), 2);
///
/// assert!(RoutingEngine::builder().node_capacity(0).build().is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct RouterBuilder {
    error: Option<RouterError>,
    config: RouterConfig,
}

impl RouterBuilder {
    pub fn new() -> Self {
        RouterBuilder {
            error: None,
            config: RouterConfig::new(),
        }
    }

    /// Sets the R-tree fan-out.
    pub fn node_capacity(mut self, capacity: usize) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_node_capacity(capacity) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Attaches a region map, enabling region lookups.
    pub fn region_table(mut self, table: RegionTable) -> Self {
        self.config.set_region_table(Arc::new(table));
        self
    }

    /// Attaches a region map shared with other engines.
    pub fn shared_region_table(mut self, table: Arc<RegionTable>) -> Self {
        self.config.set_region_table(table);
        self
    }

    /// Creates an engine with no dataset loaded.
    pub fn build(self) -> RouterResult<RoutingEngine> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Ok(RoutingEngine::new(self.config))
    }

    /// Creates an engine and loads `systems` into it.
    pub fn load<I>(self, systems: I) -> RouterResult<RoutingEngine>
    where
        I: IntoIterator<Item = StarSystem>,
    {
        let engine = self.build()?;
        engine.load(systems)?;
        Ok(engine)
    }

    /// Creates an engine and loads the packed record file at `path`.
    pub fn load_packed_file<P: AsRef<Path>>(self, path: P) -> RouterResult<RoutingEngine> {
        let engine = self.build()?;
        engine.load_packed_file(path)?;
        Ok(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{RegionGrid, RegionRun};
    use crate::errors::ErrorKind;

    #[test]
    fn test_build_default() {
        let engine = RouterBuilder::new().build().unwrap();
        assert!(!engine.is_loaded());
        assert_eq!(engine.config().node_capacity(), galaxy_router_spatial::DEFAULT_NODE_CAPACITY);
    }

    #[test]
    fn test_error_captured_until_build() {
        let err = RouterBuilder::new().node_capacity(2).node_capacity(64).build().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_first_error_wins() {
        let err = RouterBuilder::new()
            .node_capacity(1)
            .node_capacity(999)
            .build()
            .unwrap_err();
        assert!(err.message().contains(" 1 "), "{}", err.message());
    }

    #[test]
    fn test_load_with_region_table() {
        let grid = RegionGrid::new(2, 0.0, 0.0, 1.0).unwrap();
        let table = RegionTable::with_grid(
            grid,
            vec!["".into(), "Core".into()],
            vec![RegionRun::new(4, 1)],
        )
        .unwrap();
        let engine = RouterBuilder::new()
            .node_capacity(4)
            .region_table(table)
            .load(vec![StarSystem::new(1, 0.5, 0.0, 0.5)])
            .unwrap();
        assert_eq!(engine.region_of(1).unwrap().map(|r| r.name), Some("Core"));
    }

    #[test]
    fn test_load_rejects_duplicates() {
        let err = RouterBuilder::new()
            .load(vec![
                StarSystem::new(1, 0.0, 0.0, 0.0),
                StarSystem::new(1, 1.0, 0.0, 0.0),
            ])
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::DuplicateId);
    }
}
