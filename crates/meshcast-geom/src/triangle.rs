//! Triangles and the exact triangle-triangle overlap predicate.

use meshcast_math::{Point3, Tolerance, Transform, Vec3};

use crate::aabb::Aabb3;
use crate::obb::AxisBounds;

/// Relative residual below which an edge direction is treated as lying in
/// the span of the directions already collected.
const RANK_EPSILON: f64 = 1e-12;

/// Cross products shorter than this (between unit vectors) are parallel.
const PARALLEL_EPSILON: f64 = 1e-12;

/// A triangle with three owned corners.
///
/// Used as a mutable working copy: callers load corners from a mesh, move
/// them into a shared frame, then test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First corner.
    pub a: Point3,
    /// Second corner.
    pub b: Point3,
    /// Third corner.
    pub c: Point3,
}

impl Default for Triangle {
    fn default() -> Self {
        Self::new(Point3::origin(), Point3::origin(), Point3::origin())
    }
}

impl Triangle {
    /// Create a triangle from its corners.
    pub fn new(a: Point3, b: Point3, c: Point3) -> Self {
        Self { a, b, c }
    }

    /// Overwrite all three corners.
    #[inline]
    pub fn set(&mut self, a: Point3, b: Point3, c: Point3) {
        self.a = a;
        self.b = b;
        self.c = c;
    }

    /// Corners as an array.
    #[inline]
    pub fn points(&self) -> [Point3; 3] {
        [self.a, self.b, self.c]
    }

    /// Apply `transform` to every corner in place.
    #[inline]
    pub fn apply_transform(&mut self, transform: &Transform) {
        self.a = transform.apply_point(&self.a);
        self.b = transform.apply_point(&self.b);
        self.c = transform.apply_point(&self.c);
    }

    /// Unnormalized normal, `(b - a) x (c - a)`.
    pub fn normal(&self) -> Vec3 {
        (self.b - self.a).cross(&(self.c - self.a))
    }

    /// Area of the triangle.
    pub fn area(&self) -> f64 {
        0.5 * self.normal().norm()
    }

    /// Whether the corners are collinear or coincident.
    pub fn is_degenerate(&self) -> bool {
        self.normal().norm_squared() == 0.0
    }

    /// World-aligned bounds of the corners.
    pub fn bounding_box(&self) -> Aabb3 {
        Aabb3::from_points(&[self.a, self.b, self.c])
    }

    /// Exact overlap test with the default tolerance.
    ///
    /// Touching (shared vertex, shared edge, vertex on face) counts as
    /// intersecting. Degenerate triangles are handled as the segment or
    /// point they collapse to.
    pub fn intersects_triangle(&self, other: &Triangle) -> bool {
        self.intersects_triangle_with(other, &Tolerance::DEFAULT)
    }

    /// Exact overlap test with an explicit tolerance.
    pub fn intersects_triangle_with(&self, other: &Triangle, tolerance: &Tolerance) -> bool {
        triangles_intersect(&self.points(), &other.points(), tolerance)
    }
}

fn edge_dirs(t: &[Point3; 3], min_len: f64) -> [Option<Vec3>; 3] {
    [t[1] - t[0], t[2] - t[1], t[0] - t[2]].map(|e| e.try_normalize(min_len))
}

/// Fixed-capacity list of candidate axes, so the predicate never allocates.
struct AxisList {
    axes: [Vec3; 24],
    len: usize,
}

impl AxisList {
    fn new() -> Self {
        Self {
            axes: [Vec3::zeros(); 24],
            len: 0,
        }
    }

    fn push(&mut self, axis: Vec3) {
        self.axes[self.len] = axis;
        self.len += 1;
    }

    fn as_slice(&self) -> &[Vec3] {
        &self.axes[..self.len]
    }
}

fn plane_normal(dirs: &[Option<Vec3>; 3]) -> Option<Vec3> {
    match (dirs[0], dirs[1]) {
        (Some(d0), Some(d1)) => d0.cross(&d1).try_normalize(PARALLEL_EPSILON),
        _ => None,
    }
}

/// Separating-axis test between two (possibly degenerate) triangles.
///
/// The candidate axes depend on the dimension of the span of all edge
/// directions. The Minkowski difference of the two triangles lives in
/// `offset + span`, so a residual offset outside the span separates them
/// outright; inside the span the facet normals are face normals, edge-edge
/// cross products, and in-plane edge normals.
fn triangles_intersect(p: &[Point3; 3], q: &[Point3; 3], tolerance: &Tolerance) -> bool {
    let scale = p
        .iter()
        .chain(q.iter())
        .map(|v| v.coords.amax())
        .fold(0.0, f64::max);
    let eps = tolerance.contact_at(scale);

    let dp = edge_dirs(p, eps);
    let dq = edge_dirs(q, eps);
    let mut dirs = AxisList::new();
    for d in dp.iter().chain(dq.iter()).flatten() {
        dirs.push(*d);
    }

    let mut basis = [Vec3::zeros(); 3];
    let mut rank = 0;
    for d in dirs.as_slice() {
        if rank == 3 {
            break;
        }
        let mut r = *d;
        for u in &basis[..rank] {
            r -= u * u.dot(d);
        }
        if let Some(u) = r.try_normalize(RANK_EPSILON) {
            basis[rank] = u;
            rank += 1;
        }
    }

    let offset = p[0] - q[0];
    let mut residual = offset;
    for u in &basis[..rank] {
        residual -= u * u.dot(&offset);
    }
    if residual.norm() > eps {
        return false;
    }

    let mut axes = AxisList::new();
    let np = plane_normal(&dp);
    let nq = plane_normal(&dq);
    for (n, own) in [(np, &dp), (nq, &dq)] {
        if let Some(n) = n {
            axes.push(n);
            for d in own.iter().flatten() {
                axes.push(n.cross(d));
            }
        }
    }

    for a in dp.iter().flatten() {
        for b in dq.iter().flatten() {
            axes.push(a.cross(b));
        }
    }

    match rank {
        2 => {
            let m = basis[0].cross(&basis[1]);
            for d in dirs.as_slice() {
                axes.push(m.cross(d));
            }
        }
        1 => axes.push(basis[0]),
        _ => {}
    }

    for axis in axes.as_slice() {
        let Some(axis) = axis.try_normalize(PARALLEL_EPSILON) else {
            continue;
        };
        let bp = AxisBounds::from_points(&axis, p);
        let bq = AxisBounds::from_points(&axis, q);
        if bp.is_separated(&bq, eps) {
            return false;
        }
    }

    true
}
