//! Fixed constants of the galactic coordinate system.

use galaxy_router_spatial::Point3;

/// Minimum corner of sector (0, 0, 0), in light years
pub const GALAXY_ORIGIN: Point3 = Point3::new(-49985.0, -40985.0, -24105.0);

/// Edge length of one sector, in light years
pub const SECTOR_SIZE: f64 = 1280.0;

/// Number of sectors along x, y and z
pub const SECTOR_COUNTS: [u32; 3] = [128, 64, 128];

/// Edge length of the smallest boxel (mass code `a`), in light years
pub const MIN_BOXEL_SIZE: f64 = 10.0;

/// Region map cells per side of the square X/Z grid
pub const REGION_GRID_SIDE: u32 = 2048;

/// Region map cells per light year
pub const REGION_CELLS_PER_LY: f64 = 83.0 / 4096.0;
