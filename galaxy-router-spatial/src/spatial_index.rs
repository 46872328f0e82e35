//! Star system storage paired with an R-Tree.

use std::collections::HashMap;

use crate::geometry::{Point3, StarSystem};
use crate::rtree::{
    LeafEntry, MemoryRTree, RTreeConfig, RTreeStats, Slot, SpatialError, SpatialResult,
};

/// A spatial index over a set of star systems.
///
/// Systems are kept in a flat vector addressed by a dense [`Slot`]; the
/// R-Tree stores slots, and a hash map resolves `id64` to slot. `id64` values
/// are unique within an index: duplicates are rejected when the index is
/// built or a system is inserted.
///
/// # Examples
///
/// ```rust
/// use galaxy_router_spatial::{Point3, SpatialIndex, StarSystem};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let index = SpatialIndex::build(vec![
///     StarSystem::new(1, 0.0, 0.0, 0.0),
///     StarSystem::new(2, 5.0, 0.0, 0.0),
///     StarSystem::new(3, 11.0, 0.0, 0.0),
/// ])?;
///
/// let mut near = index.within(&Point3::new(0.0, 0.0, 0.0), 5.0)?;
/// near.sort_unstable();
/// assert_eq!(near, vec![1, 2]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    systems: Vec<StarSystem>,
    slots: HashMap<u64, Slot>,
    tree: MemoryRTree,
}

impl SpatialIndex {
    /// Builds an index with the default tree configuration.
    pub fn build<I>(systems: I) -> SpatialResult<Self>
    where
        I: IntoIterator<Item = StarSystem>,
    {
        Self::build_with_config(systems, RTreeConfig::default())
    }

    /// Builds an index with STR bulk loading.
    ///
    /// An empty input yields a valid, empty index.
    ///
    /// # Errors
    ///
    /// - [`SpatialError::DuplicateId`] if two systems share an `id64`
    /// - [`SpatialError::InvalidArgument`] for non-finite coordinates or more
    ///   systems than a [`Slot`] can address
    pub fn build_with_config<I>(systems: I, config: RTreeConfig) -> SpatialResult<Self>
    where
        I: IntoIterator<Item = StarSystem>,
    {
        let systems: Vec<StarSystem> = systems.into_iter().collect();
        let mut slots = HashMap::with_capacity(systems.len());
        let mut entries = Vec::with_capacity(systems.len());

        for (i, system) in systems.iter().enumerate() {
            let slot = to_slot(i)?;
            if slots.insert(system.id64, slot).is_some() {
                return Err(SpatialError::DuplicateId(system.id64));
            }
            entries.push(LeafEntry::new(system.coords, slot));
        }

        let tree = MemoryRTree::bulk_load(config, entries)?;
        log::debug!(
            "Built spatial index over {} systems (tree height {})",
            systems.len(),
            tree.height()
        );
        Ok(SpatialIndex {
            systems,
            slots,
            tree,
        })
    }

    /// Adds one system after the initial build.
    ///
    /// Requires exclusive access; readers holding `&SpatialIndex` cannot
    /// coexist with an insertion.
    pub fn insert(&mut self, system: StarSystem) -> SpatialResult<()> {
        if self.slots.contains_key(&system.id64) {
            return Err(SpatialError::DuplicateId(system.id64));
        }
        let slot = to_slot(self.systems.len())?;
        self.tree.insert(system.coords, slot)?;
        self.slots.insert(system.id64, slot);
        self.systems.push(system);
        Ok(())
    }

    /// Ids of every system within `radius` of `center`, in unspecified order.
    ///
    /// # Errors
    ///
    /// [`SpatialError::InvalidArgument`] for a negative or NaN radius.
    pub fn within(&self, center: &Point3, radius: f64) -> SpatialResult<Vec<u64>> {
        let mut ids = Vec::new();
        self.tree.for_each_within(center, radius, |slot, _| {
            ids.push(self.systems[slot as usize].id64)
        })?;
        Ok(ids)
    }

    /// Calls `visit(slot, distance)` for every system within `radius` of `center`.
    pub fn for_each_within<F>(&self, center: &Point3, radius: f64, visit: F) -> SpatialResult<()>
    where
        F: FnMut(Slot, f64),
    {
        self.tree.for_each_within(center, radius, visit)
    }

    /// The `k` systems closest to `center` as `(id64, distance)`, nearest first.
    pub fn nearest(&self, center: &Point3, k: usize) -> SpatialResult<Vec<(u64, f64)>> {
        Ok(self
            .tree
            .find_nearest(center, k)?
            .into_iter()
            .map(|(slot, dist)| (self.systems[slot as usize].id64, dist))
            .collect())
    }

    /// Looks up a system by id64.
    pub fn get(&self, id64: u64) -> Option<&StarSystem> {
        self.slot_of(id64).map(|slot| &self.systems[slot as usize])
    }

    pub fn contains(&self, id64: u64) -> bool {
        self.slots.contains_key(&id64)
    }

    /// Dense slot of a system.
    pub fn slot_of(&self, id64: u64) -> Option<Slot> {
        self.slots.get(&id64).copied()
    }

    /// System stored at `slot`.
    pub fn system_at(&self, slot: Slot) -> Option<&StarSystem> {
        self.systems.get(slot as usize)
    }

    /// Every system, in slot order.
    pub fn systems(&self) -> &[StarSystem] {
        &self.systems
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    pub fn config(&self) -> RTreeConfig {
        self.tree.config()
    }

    pub fn stats(&self) -> RTreeStats {
        self.tree.stats()
    }

    /// The underlying tree.
    pub fn tree(&self) -> &MemoryRTree {
        &self.tree
    }
}

fn to_slot(index: usize) -> SpatialResult<Slot> {
    Slot::try_from(index).map_err(|_| {
        SpatialError::InvalidArgument(format!(
            "dataset exceeds {} systems",
            Slot::MAX as u64 + 1
        ))
    })
}
