//! Moving boxes and triangles between the two meshes' frames.
//!
//! A query runs in the hierarchy mesh's frame. The other mesh's triangles
//! come in through `forward`; boxes of the hierarchy mesh go out through
//! `inverse` when they need to prune the other mesh's own tree.

use meshcast_geom::{Aabb3, OrientedBox, Triangle};
use meshcast_math::{Tolerance, Transform};

use crate::error::{QueryError, Result};

/// A forward transform and its inverse, computed once per query.
#[derive(Debug, Clone, Copy)]
pub struct FrameTransform {
    forward: Transform,
    inverse: Transform,
    tolerance: Tolerance,
}

impl FrameTransform {
    /// Pair `forward` (other frame to hierarchy frame) with its inverse.
    pub fn new(forward: Transform) -> Result<Self> {
        let inverse = forward
            .inverse()
            .ok_or(QueryError::NonInvertibleTransform)?;
        Ok(Self {
            forward,
            inverse,
            tolerance: Tolerance::DEFAULT,
        })
    }

    /// Override the tolerances used by boxes and triangle tests.
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Other frame to hierarchy frame.
    pub fn forward(&self) -> &Transform {
        &self.forward
    }

    /// Hierarchy frame to other frame.
    pub fn inverse(&self) -> &Transform {
        &self.inverse
    }

    /// Tolerances for this query.
    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    /// A box of the other mesh, placed in the hierarchy frame.
    pub fn transform_box(&self, aabb: &Aabb3) -> OrientedBox {
        OrientedBox::new(aabb, self.forward).with_tolerance(self.tolerance)
    }

    /// A box of the hierarchy mesh, placed in the other mesh's frame.
    pub fn inverse_box(&self, aabb: &Aabb3) -> OrientedBox {
        OrientedBox::new(aabb, self.inverse).with_tolerance(self.tolerance)
    }

    /// Move a triangle of the other mesh into the hierarchy frame.
    #[inline]
    pub fn to_hierarchy_frame(&self, triangle: &mut Triangle) {
        triangle.apply_transform(&self.forward);
    }

    /// Move a triangle of the hierarchy mesh into the other mesh's frame.
    #[inline]
    pub fn to_geometry_frame(&self, triangle: &mut Triangle) {
        triangle.apply_transform(&self.inverse);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use meshcast_math::{Dir3, Point3, Vec3};

    fn sample() -> Transform {
        Transform::translation(1.0, 2.0, 3.0)
            .then(&Transform::rotation(&Dir3::new_normalize(Vec3::new(1.0, 1.0, 0.0)), 0.7))
    }

    #[test]
    fn test_round_trip_triangle() {
        let frame = FrameTransform::new(sample()).unwrap();
        let original = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.5, 0.0),
            Point3::new(-0.3, 0.2, 2.0),
        );
        let mut t = original;
        frame.to_hierarchy_frame(&mut t);
        assert!((t.a - original.a).norm() > 1.0);
        frame.to_geometry_frame(&mut t);
        for (p, q) in t.points().iter().zip(original.points()) {
            assert_relative_eq!(p.coords, q.coords, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_boxes_use_opposite_directions() {
        let frame = FrameTransform::new(Transform::translation(10.0, 0.0, 0.0)).unwrap();
        let unit = Aabb3::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(frame.transform_box(&unit).aabb().min.x, 10.0);
        assert_relative_eq!(frame.inverse_box(&unit).aabb().min.x, -10.0);
    }

    #[test]
    fn test_singular_transform_rejected() {
        let flat = Transform::scale(1.0, 1.0, 0.0);
        assert!(matches!(
            FrameTransform::new(flat),
            Err(QueryError::NonInvertibleTransform)
        ));
    }
}
