use crate::geometry::Point3;
use serde::{Deserialize, Serialize};

/// An axis-aligned 3D bounding box represented by minimum and maximum corners.
///
/// `BoundingBox` is the minimum bounding rectangle stored for every R-Tree
/// node. A node's box is always the smallest box containing all of its
/// children's boxes (or points, for leaves).
///
/// # Examples
///
/// ```rust
/// use galaxy_router_spatial::{BoundingBox, Point3};
///
/// let bbox = BoundingBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 10.0, 10.0));
/// assert!(bbox.contains_point(&Point3::new(5.0, 5.0, 5.0)));
/// assert_eq!(bbox.min_distance(&Point3::new(13.0, 14.0, 5.0)), 5.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum corner
    pub min: Point3,
    /// Maximum corner
    pub max: Point3,
}

impl Default for BoundingBox {
    fn default() -> Self {
        BoundingBox::empty()
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BoundingBox({} .. {})", self.min, self.max)
    }
}

impl BoundingBox {
    /// Creates a new bounding box from its two corners.
    pub fn new(min: Point3, max: Point3) -> BoundingBox {
        BoundingBox { min, max }
    }

    /// The inverted box that acts as the identity for [`BoundingBox::union`].
    pub fn empty() -> BoundingBox {
        BoundingBox {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// A degenerate box around a single point.
    pub fn from_point(point: &Point3) -> BoundingBox {
        BoundingBox {
            min: *point,
            max: *point,
        }
    }

    /// The minimal box containing every point yielded by `points`.
    pub fn from_points<'a, I>(points: I) -> BoundingBox
    where
        I: IntoIterator<Item = &'a Point3>,
    {
        points
            .into_iter()
            .fold(BoundingBox::empty(), |bbox, p| bbox.expanded_to(p))
    }

    /// Returns true if this box has never been extended.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Returns the volume of the bounding box.
    pub fn volume(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        (self.max.x - self.min.x) * (self.max.y - self.min.y) * (self.max.z - self.min.z)
    }

    /// Sum of the three edge lengths.
    ///
    /// Degenerate boxes (flat point clouds) have zero volume, so split and
    /// insertion heuristics fall back to this when volumes tie.
    pub fn margin(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        (self.max.x - self.min.x) + (self.max.y - self.min.y) + (self.max.z - self.min.z)
    }

    /// Returns the center point of the bounding box.
    pub fn center(&self) -> Point3 {
        Point3::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
            (self.min.z + self.max.z) / 2.0,
        )
    }

    /// Checks if this bounding box contains a point.
    pub fn contains_point(&self, p: &Point3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Checks if this bounding box contains another bounding box.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.min.x >= self.min.x
            && other.max.x <= self.max.x
            && other.min.y >= self.min.y
            && other.max.y <= self.max.y
            && other.min.z >= self.min.z
            && other.max.z <= self.max.z
    }

    /// Checks if this bounding box intersects another bounding box.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Returns the union of this bounding box with another.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: Point3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Point3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }

    /// Returns this box grown just enough to contain `p`.
    pub fn expanded_to(&self, p: &Point3) -> BoundingBox {
        self.union(&BoundingBox::from_point(p))
    }

    /// Volume increase needed to include `other`.
    pub fn enlargement(&self, other: &BoundingBox) -> f64 {
        self.union(other).volume() - self.volume()
    }

    /// Squared minimum distance from `p` to any point of this box.
    ///
    /// Zero when `p` lies inside the box.
    pub fn min_distance_squared(&self, p: &Point3) -> f64 {
        let dx = axis_gap(p.x, self.min.x, self.max.x);
        let dy = axis_gap(p.y, self.min.y, self.max.y);
        let dz = axis_gap(p.z, self.min.z, self.max.z);
        dx * dx + dy * dy + dz * dz
    }

    /// Minimum distance from `p` to any point of this box.
    pub fn min_distance(&self, p: &Point3) -> f64 {
        self.min_distance_squared(p).sqrt()
    }
}

#[inline]
fn axis_gap(v: f64, min: f64, max: f64) -> f64 {
    if v < min {
        min - v
    } else if v > max {
        v - max
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(min: f64, max: f64) -> BoundingBox {
        BoundingBox::new(Point3::new(min, min, min), Point3::new(max, max, max))
    }

    #[test]
    fn test_volume_and_margin() {
        let bbox = BoundingBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 3.0, 4.0));
        assert_eq!(bbox.volume(), 24.0);
        assert_eq!(bbox.margin(), 9.0);
        assert_eq!(BoundingBox::empty().volume(), 0.0);
    }

    #[test]
    fn test_contains_and_intersects() {
        let outer = cube(0.0, 10.0);
        let inner = cube(2.0, 3.0);
        let apart = cube(11.0, 12.0);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(outer.intersects(&inner));
        assert!(!outer.intersects(&apart));
        // touching faces count as intersecting
        assert!(outer.intersects(&cube(10.0, 11.0)));
    }

    #[test]
    fn test_union_with_empty_is_identity() {
        let bbox = cube(-1.0, 1.0);
        assert_eq!(BoundingBox::empty().union(&bbox), bbox);
        assert!(BoundingBox::empty().is_empty());
    }

    #[test]
    fn test_from_points() {
        let points = [
            Point3::new(1.0, 5.0, -2.0),
            Point3::new(-3.0, 0.0, 4.0),
            Point3::new(0.0, 2.0, 0.0),
        ];
        let bbox = BoundingBox::from_points(points.iter());
        assert_eq!(bbox.min, Point3::new(-3.0, 0.0, -2.0));
        assert_eq!(bbox.max, Point3::new(1.0, 5.0, 4.0));
    }

    #[test]
    fn test_min_distance() {
        let bbox = cube(0.0, 1.0);
        assert_eq!(bbox.min_distance(&Point3::new(0.5, 0.5, 0.5)), 0.0);
        assert_eq!(bbox.min_distance(&Point3::new(4.0, 0.5, 0.5)), 3.0);
        assert_eq!(bbox.min_distance_squared(&Point3::new(-1.0, -1.0, 0.5)), 2.0);
    }

    #[test]
    fn test_enlargement() {
        let bbox = cube(0.0, 1.0);
        assert_eq!(bbox.enlargement(&cube(0.2, 0.8)), 0.0);
        assert_eq!(bbox.enlargement(&cube(0.0, 2.0)), 7.0);
    }
}
