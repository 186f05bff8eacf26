#![warn(missing_docs)]

//! Math types for the meshcast intersection engine.
//!
//! Thin wrappers around nalgebra: points, vectors, the 4x4 affine
//! [`Transform`] that maps one mesh frame into another, and the
//! [`Tolerance`] used by the geometric predicates.

use nalgebra::{Matrix4, Unit, Vector3, Vector4};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A 4x4 affine transformation matrix.
///
/// Points are treated as column vectors, so `a.then(&b)` applies `b` first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Wrap an existing matrix.
    pub fn from_matrix(matrix: Matrix4<f64>) -> Self {
        Self { matrix }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            matrix: Matrix4::new_translation(&Vec3::new(dx, dy, dz)),
        }
    }

    /// Uniform or non-uniform scale by `(sx, sy, sz)`.
    pub fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            matrix: Matrix4::new_nonuniform_scaling(&Vec3::new(sx, sy, sz)),
        }
    }

    /// Rotation about an axis through the origin by `angle` radians.
    pub fn rotation(axis: &Dir3, angle: f64) -> Self {
        Self {
            matrix: Matrix4::from_axis_angle(axis, angle),
        }
    }

    /// Rotation from XYZ Euler angles in radians (roll, pitch, yaw).
    pub fn rotation_euler(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self {
            matrix: Matrix4::from_euler_angles(roll, pitch, yaw),
        }
    }

    /// Compose: `self * other`, i.e. `other` is applied first.
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Transform a point.
    #[inline]
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }

    /// Transform a direction vector (translation ignored).
    #[inline]
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        let r = self.matrix * Vector4::new(v.x, v.y, v.z, 0.0);
        Vec3::new(r.x, r.y, r.z)
    }

    /// Inverse of this transform, if the matrix is invertible.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }

    /// Whether the matrix is the identity, exactly.
    pub fn is_identity(&self) -> bool {
        self.matrix == Matrix4::identity()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Tolerances for the intersection predicates.
///
/// Both values are relative: they are scaled by the magnitude of the
/// coordinates being compared.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Separation below which two primitives count as touching.
    pub contact: f64,
    /// Separation slack granted to bounding-volume pruning.
    ///
    /// Must exceed `contact` so pruning never rejects a pair the exact
    /// predicate would accept.
    pub bounds: f64,
}

impl Tolerance {
    /// Default tolerances (1e-10 contact, 1e-8 bounds).
    pub const DEFAULT: Self = Self {
        contact: 1e-10,
        bounds: 1e-8,
    };

    /// Absolute contact distance for coordinates of magnitude `scale`.
    #[inline]
    pub fn contact_at(&self, scale: f64) -> f64 {
        self.contact * scale.max(1.0)
    }

    /// Absolute pruning slack for coordinates of magnitude `scale`.
    #[inline]
    pub fn bounds_at(&self, scale: f64) -> f64 {
        self.bounds * scale.max(1.0)
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
