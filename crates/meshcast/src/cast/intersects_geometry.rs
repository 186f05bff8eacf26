//! Does a hierarchy mesh touch another mesh?
//!
//! The query walks the hierarchy mesh's tree with the other mesh's bounds,
//! carried into the hierarchy frame as an oriented box. At a leaf it either
//! walks the other mesh's own tree with the leaf's box (carried the other
//! way) or scans every triangle of the other mesh. All triangle tests run in
//! the hierarchy frame.

use std::ops::Range;

use log::trace;
use meshcast_bvh::{BufferStack, MeshBvh};
use meshcast_geom::{Aabb3, OrientedBox, Triangle, TriangleMesh};
use meshcast_math::Transform;

use super::QueryStats;
use crate::error::{QueryError, Result};
use crate::frame::FrameTransform;
use crate::mesh::Mesh;

/// Whether any triangle under `root` of `mesh`'s hierarchy touches any
/// triangle of `other`.
///
/// `transform` maps `other`'s local frame into `mesh`'s local frame and must
/// be invertible. Touching counts as intersecting.
pub fn intersects_geometry(
    mesh: &Mesh,
    root: usize,
    other: &Mesh,
    transform: &Transform,
) -> Result<bool> {
    intersects_geometry_with_stats(mesh, root, other, transform).map(|(hit, _)| hit)
}

/// [`intersects_geometry`] with traversal counters.
pub fn intersects_geometry_with_stats(
    mesh: &Mesh,
    root: usize,
    other: &Mesh,
    transform: &Transform,
) -> Result<(bool, QueryStats)> {
    intersects_roots(mesh, root..root + 1, other, transform)
}

/// Query a run of roots with one frame and one cached box.
pub(crate) fn intersects_roots(
    mesh: &Mesh,
    roots: Range<usize>,
    other: &Mesh,
    transform: &Transform,
) -> Result<(bool, QueryStats)> {
    let bvh = mesh.bounds_tree().ok_or(QueryError::MissingBoundsTree)?;
    if roots.end > bvh.root_count() {
        return Err(QueryError::RootOutOfRange {
            root: roots.end.saturating_sub(1),
            roots: bvh.root_count(),
        });
    }
    let frame = FrameTransform::new(*transform)?;

    // One root computes its box on entry; several share one.
    let shared_obb = (roots.len() > 1).then(|| frame.transform_box(other.bounding_box()));

    let mut traversal = Traversal::new(mesh.geometry(), other, frame);
    let mut hit = false;
    for root in roots {
        hit = traversal.intersects_root(bvh, root, shared_obb.as_ref());
        if hit {
            break;
        }
    }

    trace!(
        "intersects_geometry: hit={} nodes={} leaves={} bounds={} pairs={}",
        hit,
        traversal.stats.nodes_visited,
        traversal.stats.leaves_visited,
        traversal.stats.bounds_tests,
        traversal.stats.triangle_pairs,
    );
    Ok((hit, traversal.stats))
}

/// Scratch state owned by one query.
struct Traversal<'a> {
    geometry: &'a TriangleMesh,
    other: &'a Mesh,
    frame: FrameTransform,
    buffers: BufferStack<'a>,
    triangle: Triangle,
    other_triangle: Triangle,
    stats: QueryStats,
}

impl<'a> Traversal<'a> {
    fn new(geometry: &'a TriangleMesh, other: &'a Mesh, frame: FrameTransform) -> Self {
        Self {
            geometry,
            other,
            frame,
            buffers: BufferStack::new(),
            triangle: Triangle::default(),
            other_triangle: Triangle::default(),
            stats: QueryStats::default(),
        }
    }

    fn intersects_root(
        &mut self,
        bvh: &'a MeshBvh,
        root: usize,
        cached_obb: Option<&OrientedBox>,
    ) -> bool {
        let Some(view) = bvh.root_view(root) else {
            return false;
        };
        self.buffers.set_buffer(view);
        let hit = self.intersects_node(0, cached_obb);
        self.buffers.clear_buffer();
        hit
    }

    fn intersects_node(&mut self, n32: usize, cached_obb: Option<&OrientedBox>) -> bool {
        let computed;
        let obb = match cached_obb {
            Some(obb) => obb,
            None => {
                computed = self.frame.transform_box(self.other.bounding_box());
                &computed
            }
        };

        let Some(view) = self.buffers.current() else {
            return false;
        };
        self.stats.nodes_visited += 1;

        if view.is_leaf(n32) {
            self.stats.leaves_visited += 1;
            let range = view.leaf_range(n32);
            if range.is_empty() {
                return false;
            }
            let other: &'a Mesh = self.other;
            return match other.bounds_tree() {
                Some(tree) => self.intersects_leaf_with_tree(&view.bounds(n32), range, tree),
                None => self.intersects_leaf_brute(range),
            };
        }

        let (left, right) = view.children(n32);

        self.stats.bounds_tests += 1;
        if obb.intersects_box(&view.bounds(left)) && self.intersects_node(left, Some(obb)) {
            return true;
        }

        self.stats.bounds_tests += 1;
        obb.intersects_box(&view.bounds(right)) && self.intersects_node(right, Some(obb))
    }

    /// Walk the other mesh's tree with this leaf's box.
    fn intersects_leaf_with_tree(
        &mut self,
        leaf_box: &Aabb3,
        range: Range<usize>,
        tree: &'a MeshBvh,
    ) -> bool {
        let leaf_obb = self.frame.inverse_box(leaf_box);
        let geometry = self.geometry;
        let frame = &self.frame;
        let tolerance = *frame.tolerance();
        let triangle = &mut self.triangle;

        let mut bounds_tests = 0;
        let mut triangle_pairs = 0;
        let hit = tree.shapecast(
            self.other.geometry(),
            &mut self.buffers,
            &mut self.other_triangle,
            |aabb| {
                bounds_tests += 1;
                leaf_obb.intersects_box(aabb)
            },
            |other_triangle, _| {
                frame.to_hierarchy_frame(other_triangle);
                for tri in range.clone() {
                    geometry.set_triangle(tri, triangle);
                    triangle_pairs += 1;
                    if triangle.intersects_triangle_with(other_triangle, &tolerance) {
                        return true;
                    }
                }
                false
            },
        );

        self.stats.bounds_tests += bounds_tests;
        self.stats.triangle_pairs += triangle_pairs;
        hit
    }

    /// Test this leaf against every triangle of the other mesh.
    fn intersects_leaf_brute(&mut self, range: Range<usize>) -> bool {
        let other = self.other.geometry();
        let tolerance = *self.frame.tolerance();

        for j in 0..other.num_triangles() {
            other.set_triangle(j, &mut self.other_triangle);
            self.frame.to_hierarchy_frame(&mut self.other_triangle);
            for tri in range.clone() {
                self.geometry.set_triangle(tri, &mut self.triangle);
                self.stats.triangle_pairs += 1;
                if self
                    .triangle
                    .intersects_triangle_with(&self.other_triangle, &tolerance)
                {
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brute_force::intersects_brute_force;
    use meshcast_bvh::BvhSettings;
    use meshcast_geom::primitives::{make_cube, make_sphere};
    use meshcast_geom::TriangleGroup;
    use meshcast_math::{Dir3, Point3, Vec3};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::PI;

    fn tree(geometry: TriangleMesh) -> Mesh {
        Mesh::with_bounds_tree(geometry, &BvhSettings::default()).unwrap()
    }

    fn small_leaves(geometry: TriangleMesh) -> Mesh {
        let settings = BvhSettings {
            max_leaf_triangles: 1,
            ..Default::default()
        };
        Mesh::with_bounds_tree(geometry, &settings).unwrap()
    }

    /// Random triangles in a cube of half-width `spread`, one in eight
    /// collapsed to a segment or a point.
    fn random_soup(rng: &mut StdRng, count: usize, spread: f32, size: f32) -> TriangleMesh {
        let mut vertices = Vec::with_capacity(count * 9);
        for i in 0..count {
            let base: [f32; 3] = std::array::from_fn(|_| rng.random_range(-spread..spread));
            let mut corner = || -> [f32; 3] {
                std::array::from_fn(|k| base[k] + rng.random_range(-size..size))
            };
            let a = corner();
            let b = corner();
            let c = match i % 8 {
                0 => a,
                1 => std::array::from_fn(|k| (a[k] + b[k]) * 0.5),
                _ => corner(),
            };
            for p in [a, b, c] {
                vertices.extend_from_slice(&p);
            }
        }
        TriangleMesh::from_positions(vertices)
    }

    fn random_transform(rng: &mut StdRng, reach: f64) -> Transform {
        let axis = Dir3::new_normalize(Vec3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(0.1..1.0),
        ));
        Transform::translation(
            rng.random_range(-reach..reach),
            rng.random_range(-reach..reach),
            rng.random_range(-reach..reach),
        )
        .then(&Transform::rotation(&axis, rng.random_range(0.0..2.0 * PI)))
    }

    #[test]
    fn test_matches_brute_force_on_random_meshes() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut hits = 0;
        let mut misses = 0;

        for trial in 0..60 {
            let a = random_soup(&mut rng, 60, 5.0, 1.5);
            let b = random_soup(&mut rng, 60, 5.0, 1.5);
            let transform = random_transform(&mut rng, 12.0);
            let expected = intersects_brute_force(&a, &b, &transform);

            let settings = BvhSettings {
                max_leaf_triangles: 1 + trial % 5,
                ..Default::default()
            };
            let mesh_a = Mesh::with_bounds_tree(a, &settings).unwrap();
            let with_tree = Mesh::with_bounds_tree(b.clone(), &settings).unwrap();
            let without_tree = Mesh::new(b).unwrap();

            let accelerated = mesh_a.intersects_geometry(&with_tree, &transform).unwrap();
            let brute_leaves = mesh_a.intersects_geometry(&without_tree, &transform).unwrap();
            assert_eq!(accelerated, expected, "trial {trial}");
            assert_eq!(brute_leaves, expected, "trial {trial}");

            if expected {
                hits += 1;
            } else {
                misses += 1;
            }
        }

        assert!(hits > 0 && misses > 0, "hits {hits}, misses {misses}");
    }

    #[test]
    fn test_matches_brute_force_under_non_uniform_scale() {
        let mut rng = StdRng::seed_from_u64(0x5ca1e);
        let mut hits = 0;
        let mut misses = 0;

        for trial in 0..60 {
            let a = random_soup(&mut rng, 50, 4.0, 1.5);
            let b = random_soup(&mut rng, 50, 4.0, 1.5);
            let scale = Transform::scale(
                rng.random_range(0.3..3.0),
                rng.random_range(0.3..3.0),
                rng.random_range(0.3..3.0),
            );
            let transform = random_transform(&mut rng, 10.0).then(&scale);
            let expected = intersects_brute_force(&a, &b, &transform);

            let settings = BvhSettings {
                max_leaf_triangles: 1 + trial % 4,
                ..Default::default()
            };
            let mesh_a = Mesh::with_bounds_tree(a, &settings).unwrap();
            let with_tree = Mesh::with_bounds_tree(b.clone(), &settings).unwrap();
            let without_tree = Mesh::new(b).unwrap();

            assert_eq!(
                mesh_a.intersects_geometry(&with_tree, &transform).unwrap(),
                expected,
                "trial {trial}"
            );
            assert_eq!(
                mesh_a.intersects_geometry(&without_tree, &transform).unwrap(),
                expected,
                "trial {trial}"
            );

            if expected {
                hits += 1;
            } else {
                misses += 1;
            }
        }

        assert!(hits > 0 && misses > 0, "hits {hits}, misses {misses}");
    }

    #[test]
    fn test_symmetric_under_inverse_transform() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let a = tree(random_soup(&mut rng, 40, 4.0, 1.5));
            let b = tree(random_soup(&mut rng, 40, 4.0, 1.5));
            let transform = random_transform(&mut rng, 9.0);
            let inverse = transform.inverse().unwrap();
            assert_eq!(
                a.intersects_geometry(&b, &transform).unwrap(),
                b.intersects_geometry(&a, &inverse).unwrap()
            );
        }
    }

    #[test]
    fn test_translated_copy() {
        let a = tree(make_sphere(1.0, 12, 24));
        let b = tree(make_sphere(1.0, 12, 24));

        let near = Transform::translation(1.5, 0.0, 0.0);
        let far = Transform::translation(3.0, 0.0, 0.0);
        assert!(a.intersects_geometry(&b, &near).unwrap());
        assert!(!a.intersects_geometry(&b, &far).unwrap());
    }

    #[test]
    fn test_touching_faces_intersect() {
        let a = tree(make_cube(1.0));
        let b = Mesh::new(make_cube(1.0)).unwrap();
        assert!(a
            .intersects_geometry(&b, &Transform::translation(1.0, 0.0, 0.0))
            .unwrap());
        assert!(!a
            .intersects_geometry(&b, &Transform::translation(1.001, 0.0, 0.0))
            .unwrap());
    }

    #[test]
    fn test_nested_shells_do_not_intersect() {
        // Surfaces only: a small cube inside a big one never touches it.
        let big = tree(make_cube(4.0));
        let small = tree(make_cube(1.0));
        let inside = Transform::translation(1.5, 1.5, 1.5);
        assert!(!big.intersects_geometry(&small, &inside).unwrap());
    }

    #[test]
    fn test_rotated_box_near_corner() {
        let a = small_leaves(make_cube(1.0));
        let b = small_leaves(make_cube(1.0));
        let place = |c: f64| {
            Transform::translation(c, c, 0.0)
                .then(&Transform::rotation(&Dir3::new_normalize(Vec3::z()), PI / 4.0))
                .then(&Transform::translation(-0.5, -0.5, 0.0))
        };

        // Axis-aligned bounds overlap, the diamond stays clear of the corner.
        assert!(!a.intersects_geometry(&b, &place(1.6)).unwrap());
        assert!(a.intersects_geometry(&b, &place(1.3)).unwrap());
    }

    #[test]
    fn test_empty_meshes_never_intersect() {
        let a = tree(make_cube(1.0));
        let empty = Mesh::new(TriangleMesh::new()).unwrap();
        let empty_tree = tree(TriangleMesh::new());
        let identity = Transform::identity();

        assert!(!a.intersects_geometry(&empty, &identity).unwrap());
        assert!(!a.intersects_geometry(&empty_tree, &identity).unwrap());
        assert!(!empty_tree.intersects_geometry(&a, &identity).unwrap());
    }

    /// Vertical triangles at x = 0, 1, 2, ... and one horizontal triangle
    /// crossing all of them.
    fn row(count: usize) -> (Mesh, Mesh) {
        let mut vertices = Vec::new();
        for i in 0..count {
            let x = i as f32;
            vertices.extend_from_slice(&[x, 0.0, 0.0, x, 1.0, 0.0, x, 0.0, 1.0]);
        }
        let n = count as f32;
        let plane = TriangleMesh::from_positions(vec![
            -1.0, -1.0, 0.25, //
            2.0 * n + 2.0, -1.0, 0.25, //
            -1.0, 2.0 * n + 2.0, 0.25,
        ]);
        (small_leaves(TriangleMesh::from_positions(vertices)), Mesh::new(plane).unwrap())
    }

    #[test]
    fn test_first_hit_stops_traversal() {
        let (a, plane) = row(32);
        let (hit, stats) = a
            .intersects_geometry_with_stats(&plane, &Transform::identity())
            .unwrap();
        assert!(hit);
        assert_eq!(stats.leaves_visited, 1);
        assert_eq!(stats.triangle_pairs, 1);
        assert!(stats.nodes_visited <= 8);
    }

    #[test]
    fn test_distant_mesh_prunes_at_root() {
        let (a, plane) = row(32);
        let (hit, stats) = a
            .intersects_geometry_with_stats(&plane, &Transform::translation(0.0, 0.0, 5.0))
            .unwrap();
        assert!(!hit);
        assert_eq!(stats.nodes_visited, 1);
        assert_eq!(stats.bounds_tests, 2);
        assert_eq!(stats.leaves_visited, 0);
        assert_eq!(stats.triangle_pairs, 0);
    }

    #[test]
    fn test_roots_queried_individually() {
        let mut geometry = make_cube(1.0);
        geometry.merge(&make_cube(1.0).transformed(&Transform::translation(10.0, 0.0, 0.0)));
        let a = tree(geometry);
        assert_eq!(a.bounds_tree().unwrap().root_count(), 2);

        let b = Mesh::new(make_sphere(0.5, 8, 8)).unwrap();
        let at_second = Transform::translation(10.0, 0.5, 0.5);

        assert!(!intersects_geometry(&a, 0, &b, &at_second).unwrap());
        assert!(intersects_geometry(&a, 1, &b, &at_second).unwrap());
        assert!(a.intersects_geometry(&b, &at_second).unwrap());
        assert!(matches!(
            intersects_geometry(&a, 2, &b, &at_second),
            Err(QueryError::RootOutOfRange { root: 2, roots: 2 })
        ));
    }

    #[test]
    fn test_ungrouped_triangles_still_queried() {
        let mut geometry = make_cube(1.0);
        geometry.merge(&make_cube(1.0).transformed(&Transform::translation(10.0, 0.0, 0.0)));
        geometry.merge(&make_cube(1.0).transformed(&Transform::translation(20.0, 0.0, 0.0)));
        geometry.groups = vec![TriangleGroup { start: 0, count: 12 }];

        let b = make_cube(1.0);
        let at_third = Transform::translation(20.5, 0.5, 0.5);
        assert!(intersects_brute_force(&geometry, &b, &at_third));

        let a = tree(geometry);
        assert_eq!(a.bounds_tree().unwrap().root_count(), 2);
        assert!(a.intersects_geometry(&Mesh::new(b.clone()).unwrap(), &at_third).unwrap());
        assert!(a.intersects_geometry(&tree(b), &at_third).unwrap());
    }

    #[test]
    fn test_bounding_box_computed_on_demand() {
        let a = tree(make_cube(1.0));
        let b = Mesh::new(make_cube(1.0)).unwrap();
        assert!(!b.has_bounding_box());
        a.intersects_geometry(&b, &Transform::identity()).unwrap();
        assert!(b.has_bounding_box());
        assert_eq!(b.bounding_box().min, Point3::origin());
    }

    #[test]
    fn test_non_invertible_transform_rejected() {
        let a = tree(make_cube(1.0));
        let b = Mesh::new(make_cube(1.0)).unwrap();
        assert!(matches!(
            a.intersects_geometry(&b, &Transform::scale(1.0, 0.0, 1.0)),
            Err(QueryError::NonInvertibleTransform)
        ));
    }

    #[test]
    fn test_concurrent_queries_share_meshes() {
        let mut rng = StdRng::seed_from_u64(7);
        let a = tree(random_soup(&mut rng, 200, 5.0, 1.0));
        let b = tree(random_soup(&mut rng, 200, 5.0, 1.0));
        let transforms: Vec<Transform> = (0..16).map(|_| random_transform(&mut rng, 10.0)).collect();
        let expected: Vec<bool> = transforms
            .iter()
            .map(|t| a.intersects_geometry(&b, t).unwrap())
            .collect();

        let (a, b, transforms) = (&a, &b, &transforms);
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    s.spawn(move || {
                        transforms
                            .iter()
                            .map(|t| a.intersects_geometry(&b, t).unwrap())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            for h in handles {
                assert_eq!(h.join().unwrap(), expected);
            }
        });
    }
}
