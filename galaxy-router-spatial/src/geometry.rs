//! Point and star system value types.

use serde::{Deserialize, Serialize};

/// A point in galactic space, in light years.
///
/// `Point3` is a plain value type. Distances are Euclidean.
///
/// # Examples
///
/// ```rust
/// use galaxy_router_spatial::Point3;
///
/// let sol = Point3::new(0.0, 0.0, 0.0);
/// let barnard = Point3::new(-3.03, 1.38, 4.94);
/// assert!((sol.distance(&barnard) - 5.95).abs() < 0.01);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    /// Creates a new point.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Point3 { x, y, z }
    }

    /// Squared Euclidean distance to another point.
    #[inline]
    pub fn distance_squared(&self, other: &Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(&self, other: &Point3) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Returns true when all three components are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Component along `axis` (0 = x, 1 = y, anything else = z).
    #[inline]
    pub(crate) fn axis(&self, axis: usize) -> f64 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }
}

impl std::fmt::Display for Point3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl From<(f64, f64, f64)> for Point3 {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Point3::new(x, y, z)
    }
}

/// A star system as handed over by the ingestion pipeline.
///
/// Systems are immutable once loaded. The `id64` must be unique within
/// one dataset; the index rejects duplicates at build time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarSystem {
    pub id64: u64,
    pub name: Option<String>,
    pub coords: Point3,
}

impl StarSystem {
    /// Creates an unnamed system.
    pub fn new(id64: u64, x: f64, y: f64, z: f64) -> Self {
        StarSystem {
            id64,
            name: None,
            coords: Point3::new(x, y, z),
        }
    }

    /// Creates a named system.
    pub fn named(id64: u64, name: impl Into<String>, coords: Point3) -> Self {
        StarSystem {
            id64,
            name: Some(name.into()),
            coords,
        }
    }
}

impl From<(u64, f64, f64, f64)> for StarSystem {
    fn from((id64, x, y, z): (u64, f64, f64, f64)) -> Self {
        StarSystem::new(id64, x, y, z)
    }
}
