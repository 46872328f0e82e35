//! Coordinate address codec.
//!
//! Two independent pieces: [`SystemAddress`] decodes the spatial fields
//! packed into a system id64, and [`RegionTable`] maps a coordinate onto the
//! run-length encoded galactic region map.

pub mod galaxy;
mod id64;
mod region;

pub use id64::{MassCode, SystemAddress};
pub use region::{Region, RegionGrid, RegionId, RegionRun, RegionTable, UNMAPPED_REGION};
