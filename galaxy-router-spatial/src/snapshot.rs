//! Precomputed dataset snapshots.
//!
//! A snapshot stores the validated star system set together with the tree
//! configuration it was built with. Loading a snapshot skips id validation
//! upstream of the index but still rebuilds the R-Tree with STR, which is
//! fast compared to parsing the source dataset. Tree nodes are not stored.

use std::io::{BufReader, BufWriter, Read, Write};

use serde::{Deserialize, Serialize};

use crate::geometry::StarSystem;
use crate::rtree::{RTreeConfig, SpatialError, SpatialResult};
use crate::spatial_index::SpatialIndex;

/// Magic number for file format identification
pub const SNAPSHOT_MAGIC: u32 = 0x47525453; // "GRTS" - Galaxy Router Snapshot

/// Snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct SnapshotHeader {
    magic: u32,
    version: u32,
    node_capacity: u32,
    system_count: u64,
}

impl SnapshotHeader {
    fn validate(&self) -> SpatialResult<()> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(SpatialError::Corrupted(format!(
                "bad snapshot magic {:#010x}",
                self.magic
            )));
        }
        if self.version != SNAPSHOT_VERSION {
            return Err(SpatialError::Corrupted(format!(
                "unsupported snapshot version {}",
                self.version
            )));
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    header: SnapshotHeader,
    systems: &'a [StarSystem],
}

#[derive(Deserialize)]
struct Snapshot {
    header: SnapshotHeader,
    systems: Vec<StarSystem>,
}

impl SpatialIndex {
    /// Writes the index's systems and configuration to `writer`.
    pub fn write_snapshot<W: Write>(&self, writer: W) -> SpatialResult<()> {
        let snapshot = SnapshotRef {
            header: SnapshotHeader {
                magic: SNAPSHOT_MAGIC,
                version: SNAPSHOT_VERSION,
                node_capacity: self.config().node_capacity() as u32,
                system_count: self.len() as u64,
            },
            systems: self.systems(),
        };

        let mut writer = BufWriter::new(writer);
        bincode::serde::encode_into_std_write(&snapshot, &mut writer, bincode::config::standard())
            .map_err(|e| SpatialError::Serialization(e.to_string()))?;
        writer.flush()?;
        log::debug!("Wrote snapshot of {} systems", self.len());
        Ok(())
    }

    /// Reads a snapshot written by [`SpatialIndex::write_snapshot`] and
    /// rebuilds the index from it.
    pub fn read_snapshot<R: Read>(reader: R) -> SpatialResult<Self> {
        let mut reader = BufReader::new(reader);
        let snapshot: Snapshot =
            bincode::serde::decode_from_std_read(&mut reader, bincode::config::standard())
                .map_err(|e| SpatialError::Serialization(e.to_string()))?;

        snapshot.header.validate()?;
        if snapshot.header.system_count != snapshot.systems.len() as u64 {
            return Err(SpatialError::Corrupted(format!(
                "snapshot header announces {} systems, found {}",
                snapshot.header.system_count,
                snapshot.systems.len()
            )));
        }

        let config = RTreeConfig::new(snapshot.header.node_capacity as usize)
            .map_err(|e| SpatialError::Corrupted(format!("snapshot configuration: {}", e)))?;
        log::debug!("Read snapshot of {} systems", snapshot.systems.len());
        SpatialIndex::build_with_config(snapshot.systems, config)
    }
}
