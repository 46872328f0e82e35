//! Reader and writer for packed star system records.
//!
//! The ingestion pipeline emits a flat stream of fixed-size records, one per
//! system, with no header:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0  | 8 | id64 (signed 64-bit, little endian) |
//! | 8  | 8 | x (f64, little endian) |
//! | 16 | 8 | y (f64, little endian) |
//! | 24 | 8 | z (f64, little endian) |
//!
//! Names are not part of the format.

use std::io::{self, Read, Write};

use crate::geometry::StarSystem;
use crate::rtree::{SpatialError, SpatialResult};

/// Size of one packed record in bytes
pub const RECORD_SIZE: usize = 32;

/// Streams [`StarSystem`] values out of a packed record source.
///
/// ```rust
/// use galaxy_router_spatial::records::{write_packed_records, PackedRecordReader};
/// use galaxy_router_spatial::StarSystem;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut bytes = Vec::new();
/// write_packed_records(&mut bytes, &[StarSystem::new(10477373803, 0.0, 0.0, 0.0)])?;
///
/// let systems = PackedRecordReader::new(bytes.as_slice()).collect::<Result<Vec<_>, _>>()?;
/// assert_eq!(systems[0].id64, 10477373803);
/// # Ok(())
/// # }
/// ```
pub struct PackedRecordReader<R> {
    reader: R,
    offset: u64,
    done: bool,
}

impl<R: Read> PackedRecordReader<R> {
    pub fn new(reader: R) -> Self {
        PackedRecordReader {
            reader,
            offset: 0,
            done: false,
        }
    }

    fn read_record(&mut self) -> SpatialResult<Option<StarSystem>> {
        let mut buf = [0u8; RECORD_SIZE];
        let mut filled = 0;
        while filled < RECORD_SIZE {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(SpatialError::Io(e)),
            }
        }

        if filled == 0 {
            return Ok(None);
        }
        if filled < RECORD_SIZE {
            return Err(SpatialError::Corrupted(format!(
                "truncated record at byte {}: {} of {} bytes",
                self.offset, filled, RECORD_SIZE
            )));
        }

        self.offset += RECORD_SIZE as u64;
        decode_record(&buf).map(Some)
    }
}

impl<R: Read> Iterator for PackedRecordReader<R> {
    type Item = SpatialResult<StarSystem>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_record() {
            Ok(Some(system)) => Some(Ok(system)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Reads every record from `reader`.
pub fn read_packed_records<R: Read>(reader: R) -> SpatialResult<Vec<StarSystem>> {
    PackedRecordReader::new(reader).collect()
}

/// Writes `systems` in the packed record format. Names are dropped.
pub fn write_packed_records<W: Write>(mut writer: W, systems: &[StarSystem]) -> SpatialResult<()> {
    for system in systems {
        writer.write_all(&encode_record(system)?)?;
    }
    writer.flush()?;
    Ok(())
}

/// On-disk field layout of one record. `legacy` bincode writes it as fixed
/// width little endian with no framing.
type RecordFields = (i64, f64, f64, f64);

fn decode_record(buf: &[u8; RECORD_SIZE]) -> SpatialResult<StarSystem> {
    let ((id64, x, y, z), _): (RecordFields, usize) =
        bincode::serde::decode_from_slice(buf, bincode::config::legacy())
            .map_err(|e| SpatialError::Serialization(e.to_string()))?;
    // id64 is written signed; the bit pattern is what matters
    Ok(StarSystem::new(id64 as u64, x, y, z))
}

fn encode_record(system: &StarSystem) -> SpatialResult<[u8; RECORD_SIZE]> {
    let fields: RecordFields = (
        system.id64 as i64,
        system.coords.x,
        system.coords.y,
        system.coords.z,
    );
    let mut buf = [0u8; RECORD_SIZE];
    bincode::serde::encode_into_slice(fields, &mut buf, bincode::config::legacy())
        .map_err(|e| SpatialError::Serialization(e.to_string()))?;
    Ok(buf)
}
