//! Axis-aligned bounding boxes.

use meshcast_math::{Point3, Vec3};

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb3 {
    /// Create an AABB from min and max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create an empty (inverted) AABB suitable for expansion.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Build the tightest box around a set of points.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.include_point(p);
        }
        aabb
    }

    /// Read a box from six packed floats: `[min x, min y, min z, max x, max y, max z]`.
    #[inline]
    pub fn from_f32_slice(data: &[f32]) -> Self {
        Self {
            min: Point3::new(data[0] as f64, data[1] as f64, data[2] as f64),
            max: Point3::new(data[3] as f64, data[4] as f64, data[5] as f64),
        }
    }

    /// Whether the box contains no points (any min exceeds its max).
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand this AABB to include a point.
    pub fn include_point(&mut self, p: &Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Expand this AABB to include another box.
    pub fn include_box(&mut self, other: &Aabb3) {
        if !other.is_empty() {
            self.include_point(&other.min);
            self.include_point(&other.max);
        }
    }

    /// Test if two AABBs overlap (touching counts as overlap).
    pub fn overlaps(&self, other: &Aabb3) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Test if a point lies inside or on the box.
    pub fn contains_point(&self, p: &Point3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Test if `other` lies entirely inside this box.
    pub fn contains_box(&self, other: &Aabb3) -> bool {
        other.is_empty() || (self.contains_point(&other.min) && self.contains_point(&other.max))
    }

    /// Center of the box.
    pub fn center(&self) -> Point3 {
        Point3::from((self.min.coords + self.max.coords) * 0.5)
    }

    /// Edge lengths along each axis.
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Length of the main diagonal.
    pub fn diagonal(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.extent().norm()
        }
    }

    /// Surface area, used by the SAH builder.
    pub fn surface_area(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let d = self.extent();
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }

    /// Index of the longest axis (0 = x, 1 = y, 2 = z).
    pub fn longest_axis(&self) -> usize {
        let d = self.extent();
        if d.x >= d.y && d.x >= d.z {
            0
        } else if d.y >= d.z {
            1
        } else {
            2
        }
    }

    /// Largest absolute coordinate of either corner, for tolerance scaling.
    pub fn magnitude(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.min.coords.amax().max(self.max.coords.amax())
    }

    /// The eight corners, indexed so bit 0 selects max x, bit 1 max y, bit 2 max z.
    pub fn corners(&self) -> [Point3; 8] {
        std::array::from_fn(|i| {
            Point3::new(
                if i & 1 != 0 { self.max.x } else { self.min.x },
                if i & 2 != 0 { self.max.y } else { self.min.y },
                if i & 4 != 0 { self.max.z } else { self.min.z },
            )
        })
    }
}

impl Default for Aabb3 {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> Aabb3 {
        Aabb3::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_empty_box() {
        let b = Aabb3::empty();
        assert!(b.is_empty());
        assert_eq!(b.diagonal(), 0.0);
        assert!(!b.overlaps(&unit()));
    }

    #[test]
    fn test_touching_overlaps() {
        let other = Aabb3::new(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        assert!(unit().overlaps(&other));
        let apart = Aabb3::new(Point3::new(1.1, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        assert!(!unit().overlaps(&apart));
    }

    #[test]
    fn test_from_f32_slice() {
        let b = Aabb3::from_f32_slice(&[-1.0, -2.0, -3.0, 1.0, 2.0, 3.0]);
        assert_eq!(b.min, Point3::new(-1.0, -2.0, -3.0));
        assert_eq!(b.max, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(b.longest_axis(), 2);
        assert_eq!(b.magnitude(), 3.0);
    }

    #[test]
    fn test_corners_follow_bit_order() {
        let c = unit().corners();
        assert_eq!(c[0], Point3::origin());
        assert_eq!(c[1], Point3::new(1.0, 0.0, 0.0));
        assert_eq!(c[2], Point3::new(0.0, 1.0, 0.0));
        assert_eq!(c[4], Point3::new(0.0, 0.0, 1.0));
        assert_eq!(c[7], Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_include_box_and_contains() {
        let mut b = unit();
        b.include_box(&Aabb3::new(Point3::new(2.0, 2.0, 2.0), Point3::new(3.0, 3.0, 3.0)));
        assert!(b.contains_box(&unit()));
        assert!(b.contains_point(&Point3::new(2.5, 0.5, 1.5)));
        assert!((b.surface_area() - 54.0).abs() < 1e-12);
    }
}
