use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use std::sync::Arc;

use galaxy_router_spatial::{
    read_packed_records, Point3, RTreeStats, SpatialIndex, StarSystem,
};
use parking_lot::RwLock;

use crate::codec::{Region, RegionTable, SystemAddress};
use crate::errors::{ErrorKind, RouterError, RouterResult};
use crate::pathfinder::{CancellationToken, PathFinder, RouteResult};
use crate::router_builder::RouterBuilder;
use crate::router_config::RouterConfig;

/// Entry point for loading a star system dataset and querying it.
///
/// A `RoutingEngine` holds at most one dataset. Every query fails with
/// [`ErrorKind::NotLoaded`] until a dataset has been loaded; loading again
/// replaces it.
///
/// The engine is cheap to clone and can be shared across threads. Queries
/// take a short read lock to grab the current dataset and then run without
/// holding any lock, so they proceed in parallel. [`RoutingEngine::load`]
/// builds the new index before taking the write lock, and
/// [`RoutingEngine::insert_system`] copies the index outside the lock if a
/// query still holds the old one, so readers never observe a half-built tree.
///
/// # Examples
///
/// ```rust
/// use galaxy_router::RoutingEngine;
/// use galaxy_router_spatial::{Point3, StarSystem};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = RoutingEngine::builder().build()?;
/// engine.load(vec![
///     StarSystem::new(1, 0.0, 0.0, 0.0),
///     StarSystem::new(2, 5.0, 0.0, 0.0),
///     StarSystem::new(3, 11.0, 0.0, 0.0),
/// ])?;
///
/// let route = engine.find_route(1, 3, 6.0)?;
/// assert_eq!(route.system_ids, vec![1, 2, 3]);
///
/// let mut near = engine.systems_within_radius(&Point3::new(0.0, 0.0, 0.0), 5.0)?;
/// near.sort_unstable();
/// assert_eq!(near, vec![1, 2]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct RoutingEngine {
    inner: Arc<RoutingEngineInner>,
}

impl RoutingEngine {
    /// Returns a builder for configuring a new engine.
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Creates an engine with no dataset loaded.
    pub fn new(config: RouterConfig) -> Self {
        RoutingEngine {
            inner: Arc::new(RoutingEngineInner {
                config,
                dataset: RwLock::new(None),
            }),
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.inner.config
    }

    /// Builds a spatial index over `systems` and makes it the current dataset.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::DuplicateId`] if two systems share an id64
    /// - [`ErrorKind::InvalidArgument`] for non-finite coordinates
    ///
    /// On error the previously loaded dataset, if any, is kept.
    pub fn load<I>(&self, systems: I) -> RouterResult<()>
    where
        I: IntoIterator<Item = StarSystem>,
    {
        let index = SpatialIndex::build_with_config(systems, self.inner.config.rtree_config())
            .map_err(|e| {
                log::error!("Failed to load dataset: {}", e);
                RouterError::from(e)
            })?;
        self.inner.replace(index);
        Ok(())
    }

    /// Loads a stream of 32-byte packed `(id64, x, y, z)` records.
    pub fn load_packed_records<R: Read>(&self, reader: R) -> RouterResult<()> {
        let systems = read_packed_records(reader)?;
        self.load(systems)
    }

    /// Loads the packed record file at `path`.
    ///
    /// Failing to open the file is an [`ErrorKind::IOError`]; malformed
    /// contents fail the same way as [`RoutingEngine::load_packed_records`].
    pub fn load_packed_file<P: AsRef<Path>>(&self, path: P) -> RouterResult<()> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            RouterError::new(
                &format!("cannot open record file {}: {}", path.display(), e),
                ErrorKind::IOError,
            )
        })?;
        let systems = read_packed_records(BufReader::new(file)).map_err(|e| {
            log::error!("Failed to read record file {}: {}", path.display(), e);
            RouterError::from(e)
        })?;
        log::debug!("Read {} records from {}", systems.len(), path.display());
        self.load(systems)
    }

    /// Loads a snapshot written by [`RoutingEngine::write_snapshot`].
    pub fn load_snapshot<R: Read>(&self, reader: R) -> RouterResult<()> {
        let index = SpatialIndex::read_snapshot(reader)?;
        self.inner.replace(index);
        Ok(())
    }

    /// Writes the current dataset as a snapshot.
    pub fn write_snapshot<W: Write>(&self, writer: W) -> RouterResult<()> {
        let index = self.index()?;
        index.write_snapshot(writer)?;
        Ok(())
    }

    /// Adds one system to the loaded dataset.
    ///
    /// Queries already running keep using the dataset as it was when they
    /// started. While such a query holds the dataset, the index is copied
    /// and the copy is updated without holding the lock; it is published
    /// only if no other load or insert replaced the dataset meanwhile,
    /// otherwise the insert is retried on the newer dataset.
    pub fn insert_system(&self, system: StarSystem) -> RouterResult<()> {
        loop {
            let current = {
                let mut guard = self.inner.dataset.write();
                let index = guard.as_mut().ok_or_else(not_loaded)?;
                if let Some(index) = Arc::get_mut(index) {
                    index.insert(system)?;
                    return Ok(());
                }
                Arc::clone(index)
            };

            let mut updated = SpatialIndex::clone(&current);
            updated.insert(system.clone())?;

            let mut guard = self.inner.dataset.write();
            match guard.as_mut() {
                Some(index) if Arc::ptr_eq(index, &current) => {
                    *index = Arc::new(updated);
                    return Ok(());
                }
                Some(_) => {
                    log::debug!("Dataset replaced during insert of {}, retrying", system.id64)
                }
                None => return Err(not_loaded()),
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.dataset.read().is_some()
    }

    /// Number of loaded systems, zero if nothing is loaded.
    pub fn len(&self) -> usize {
        self.inner.dataset.read().as_ref().map_or(0, |index| index.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The current dataset.
    ///
    /// The handle stays valid even if another dataset is loaded afterwards.
    pub fn index(&self) -> RouterResult<Arc<SpatialIndex>> {
        self.inner.dataset.read().clone().ok_or_else(not_loaded)
    }

    /// Looks up a loaded system.
    pub fn system(&self, id64: u64) -> RouterResult<StarSystem> {
        let index = self.index()?;
        index.get(id64).cloned().ok_or_else(|| not_found(id64))
    }

    /// Statistics of the current index's tree.
    pub fn stats(&self) -> RouterResult<RTreeStats> {
        Ok(self.index()?.stats())
    }

    /// Shortest route from `start` to `goal` where no jump exceeds `max_jump`.
    ///
    /// See [`PathFinder::find_route`].
    pub fn find_route(&self, start: u64, goal: u64, max_jump: f64) -> RouterResult<RouteResult> {
        let index = self.index()?;
        PathFinder::new(&index).find_route(start, goal, max_jump)
    }

    /// [`RoutingEngine::find_route`] that can be aborted through `token`.
    pub fn find_route_with_cancel(
        &self,
        start: u64,
        goal: u64,
        max_jump: f64,
        token: &CancellationToken,
    ) -> RouterResult<RouteResult> {
        let index = self.index()?;
        PathFinder::new(&index).find_route_with_cancel(start, goal, max_jump, token)
    }

    /// Ids of every system within `radius` of `center`, in unspecified order.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::InvalidArgument`] for a negative or NaN radius.
    pub fn systems_within_radius(&self, center: &Point3, radius: f64) -> RouterResult<Vec<u64>> {
        let index = self.index()?;
        Ok(index.within(center, radius)?)
    }

    /// The `k` systems closest to `center` as `(id64, distance)`, nearest first.
    pub fn nearest_systems(&self, center: &Point3, k: usize) -> RouterResult<Vec<(u64, f64)>> {
        let index = self.index()?;
        Ok(index.nearest(center, k)?)
    }

    /// Region containing a loaded system.
    ///
    /// Returns `Ok(None)` when the system lies in an unmapped cell or
    /// outside the map.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::NotLoaded`] without a dataset or a region table
    /// - [`ErrorKind::NotFound`] if `id64` is not loaded
    /// - [`ErrorKind::MalformedTable`] if the table does not cover its grid
    pub fn region_of(&self, id64: u64) -> RouterResult<Option<Region<'_>>> {
        let table = self.region_table()?;
        let coords = self.system(id64)?.coords;
        table.region_at(&coords)
    }

    /// Region containing an arbitrary point.
    pub fn region_at(&self, point: &Point3) -> RouterResult<Option<Region<'_>>> {
        self.region_table()?.region_at(point)
    }

    /// Region of the boxel encoded in `id64`, for systems whose coordinates
    /// are unknown.
    ///
    /// Only the boxel center is known, so systems near a region border may
    /// be attributed to the neighbouring region. Does not need a dataset.
    pub fn estimated_region_of(&self, id64: u64) -> RouterResult<Option<Region<'_>>> {
        let table = self.region_table()?;
        let estimate = SystemAddress::decode(id64).boxel_center();
        log::trace!("Estimated position of {} is {}", id64, estimate);
        table.region_at(&estimate)
    }

    fn region_table(&self) -> RouterResult<&RegionTable> {
        match self.inner.config.region_table() {
            Some(table) => Ok(table.as_ref()),
            None => Err(RouterError::new(
                "no region table is configured",
                ErrorKind::NotLoaded,
            )),
        }
    }
}

#[derive(Debug)]
struct RoutingEngineInner {
    config: RouterConfig,
    dataset: RwLock<Option<Arc<SpatialIndex>>>,
}

impl RoutingEngineInner {
    fn replace(&self, index: SpatialIndex) {
        log::info!(
            "Loaded {} systems (tree height {})",
            index.len(),
            index.tree().height()
        );
        *self.dataset.write() = Some(Arc::new(index));
    }
}

fn not_loaded() -> RouterError {
    RouterError::new("no dataset is loaded", ErrorKind::NotLoaded)
}

fn not_found(id64: u64) -> RouterError {
    RouterError::new(&format!("system {} is not loaded", id64), ErrorKind::NotFound)
}
