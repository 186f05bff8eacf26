//! All-pairs reference query.

use meshcast_geom::{Triangle, TriangleMesh};
use meshcast_math::{Tolerance, Transform};

/// Test every triangle of `geometry` against every triangle of `other`
/// placed by `transform` (other frame to `geometry`'s frame).
///
/// Quadratic; used to check the accelerated query and by the CLI.
pub fn intersects_brute_force(
    geometry: &TriangleMesh,
    other: &TriangleMesh,
    transform: &Transform,
) -> bool {
    let tolerance = Tolerance::DEFAULT;
    let mut triangle = Triangle::default();
    let mut other_triangle = Triangle::default();

    for j in 0..other.num_triangles() {
        other.set_triangle(j, &mut other_triangle);
        other_triangle.apply_transform(transform);
        for i in 0..geometry.num_triangles() {
            geometry.set_triangle(i, &mut triangle);
            if triangle.intersects_triangle_with(&other_triangle, &tolerance) {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshcast_geom::primitives::make_cube;

    #[test]
    fn test_cubes() {
        let a = make_cube(1.0);
        let b = make_cube(1.0);
        assert!(intersects_brute_force(&a, &b, &Transform::translation(0.5, 0.5, 0.5)));
        assert!(!intersects_brute_force(&a, &b, &Transform::translation(0.0, 0.0, 1.5)));
        assert!(!intersects_brute_force(&a, &TriangleMesh::new(), &Transform::identity()));
    }
}
