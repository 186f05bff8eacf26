//! Oriented bounding boxes.
//!
//! An [`OrientedBox`] is a local axis-aligned box carried into another frame
//! by an affine matrix. Its only job here is pruning: [`OrientedBox::intersects_box`]
//! runs a separating-axis test against a world-aligned [`Aabb3`] and must
//! never report a miss for boxes that actually touch.

use meshcast_math::{Point3, Tolerance, Transform, Vec3};

use crate::aabb::Aabb3;

/// Projection interval of a point set onto one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBounds {
    /// Smallest projection.
    pub min: f64,
    /// Largest projection.
    pub max: f64,
}

impl AxisBounds {
    /// Project `points` onto `axis`.
    pub fn from_points(axis: &Vec3, points: &[Point3]) -> Self {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for p in points {
            let d = axis.dot(&p.coords);
            min = min.min(d);
            max = max.max(d);
        }
        Self { min, max }
    }

    /// Project an axis-aligned box onto `axis`.
    pub fn from_box(axis: &Vec3, aabb: &Aabb3) -> Self {
        let center = aabb.center().coords;
        let half = aabb.extent() * 0.5;
        let c = axis.dot(&center);
        let r = half.x * axis.x.abs() + half.y * axis.y.abs() + half.z * axis.z.abs();
        Self { min: c - r, max: c + r }
    }

    /// Whether the two intervals are apart by more than `slack`.
    #[inline]
    pub fn is_separated(&self, other: &AxisBounds, slack: f64) -> bool {
        self.max + slack < other.min || other.max + slack < self.min
    }
}

/// Upper bound on candidate axes: 3 face normals + 9 edge cross products.
const MAX_AXES: usize = 12;

#[derive(Debug, Clone, Copy)]
struct SatAxis {
    axis: Vec3,
    bounds: AxisBounds,
}

/// An axis-aligned box under an affine transform.
#[derive(Debug, Clone)]
pub struct OrientedBox {
    /// Minimum corner in the box's local frame.
    pub min: Point3,
    /// Maximum corner in the box's local frame.
    pub max: Point3,
    matrix: Transform,
    points: [Point3; 8],
    aligned: [AxisBounds; 3],
    axes: [SatAxis; MAX_AXES],
    axis_count: usize,
    magnitude: f64,
    empty: bool,
    tolerance: Tolerance,
}

impl OrientedBox {
    /// Place `aabb` (in its own local frame) under `matrix`.
    pub fn new(aabb: &Aabb3, matrix: Transform) -> Self {
        let mut obb = Self {
            min: aabb.min,
            max: aabb.max,
            matrix,
            points: [Point3::origin(); 8],
            aligned: [AxisBounds { min: 0.0, max: 0.0 }; 3],
            axes: [SatAxis {
                axis: Vec3::zeros(),
                bounds: AxisBounds { min: 0.0, max: 0.0 },
            }; MAX_AXES],
            axis_count: 0,
            magnitude: 0.0,
            empty: aabb.is_empty(),
            tolerance: Tolerance::DEFAULT,
        };
        obb.update();
        obb
    }

    /// Override the tolerance used by [`Self::intersects_box`].
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// The transform from the local frame to the target frame.
    pub fn matrix(&self) -> &Transform {
        &self.matrix
    }

    /// The eight transformed corners, in [`Aabb3::corners`] order.
    pub fn points(&self) -> &[Point3; 8] {
        &self.points
    }

    /// Whether the local box was empty.
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// World-aligned bounds of the transformed corners.
    pub fn aabb(&self) -> Aabb3 {
        if self.empty {
            return Aabb3::empty();
        }
        Aabb3::from_points(self.points.iter())
    }

    /// Replace the matrix and recompute derived data.
    pub fn set_matrix(&mut self, matrix: Transform) {
        self.matrix = matrix;
        self.update();
    }

    fn update(&mut self) {
        self.axis_count = 0;
        if self.empty {
            return;
        }

        let local = Aabb3::new(self.min, self.max);
        for (dst, corner) in self.points.iter_mut().zip(local.corners()) {
            *dst = self.matrix.apply_point(&corner);
        }

        self.magnitude = self
            .points
            .iter()
            .map(|p| p.coords.amax())
            .fold(0.0, f64::max);

        for (k, bounds) in self.aligned.iter_mut().enumerate() {
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            for p in &self.points {
                min = min.min(p[k]);
                max = max.max(p[k]);
            }
            *bounds = AxisBounds { min, max };
        }

        let origin = self.points[0];
        let edges = [
            self.points[1] - origin,
            self.points[2] - origin,
            self.points[4] - origin,
        ];

        for i in 0..3 {
            self.push_axis(edges[i].cross(&edges[(i + 1) % 3]));
        }
        for edge in &edges {
            for k in 0..3 {
                let mut world = Vec3::zeros();
                world[k] = 1.0;
                self.push_axis(world.cross(edge));
            }
        }
    }

    fn push_axis(&mut self, v: Vec3) {
        let Some(axis) = v.try_normalize(1e-12 * self.magnitude.max(1.0)) else {
            return;
        };
        let bounds = AxisBounds::from_points(&axis, &self.points);
        self.axes[self.axis_count] = SatAxis { axis, bounds };
        self.axis_count += 1;
    }

    /// Conservative overlap test against a world-aligned box.
    ///
    /// Returns `false` only when a separating axis proves the two volumes
    /// are apart by more than the bounds tolerance.
    pub fn intersects_box(&self, aabb: &Aabb3) -> bool {
        if self.empty || aabb.is_empty() {
            return false;
        }

        let slack = self
            .tolerance
            .bounds_at(self.magnitude.max(aabb.magnitude()));

        for (k, bounds) in self.aligned.iter().enumerate() {
            let other = AxisBounds {
                min: aabb.min[k],
                max: aabb.max[k],
            };
            if bounds.is_separated(&other, slack) {
                return false;
            }
        }

        for sat in &self.axes[..self.axis_count] {
            let other = AxisBounds::from_box(&sat.axis, aabb);
            if sat.bounds.is_separated(&other, slack) {
                return false;
            }
        }

        true
    }
}
