//! Accelerated versus brute-force intersection queries.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use meshcast::primitives::make_sphere;
use meshcast::{intersects_brute_force, BvhSettings, Mesh, SplitStrategy, Transform};

fn sphere(resolution: u32) -> meshcast::TriangleMesh {
    make_sphere(1.0, resolution, resolution * 2)
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for strategy in [SplitStrategy::Center, SplitStrategy::Average, SplitStrategy::Sah] {
        let settings = BvhSettings {
            strategy,
            ..Default::default()
        };
        group.bench_function(format!("{strategy:?}"), |b| {
            b.iter(|| Mesh::with_bounds_tree(black_box(sphere(32)), &settings).unwrap())
        });
    }
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("intersects_geometry");

    for resolution in [8u32, 16, 32] {
        let settings = BvhSettings::default();
        let a = Mesh::with_bounds_tree(sphere(resolution), &settings).unwrap();
        let b_tree = Mesh::with_bounds_tree(sphere(resolution), &settings).unwrap();
        let b_plain = Mesh::new(sphere(resolution)).unwrap();
        let triangles = a.triangle_count();

        // Near miss: every leaf near the gap gets visited
        let miss = Transform::translation(2.01, 0.0, 0.0);
        let hit = Transform::translation(1.5, 0.3, 0.0);

        for (name, transform) in [("miss", miss), ("hit", hit)] {
            group.bench_with_input(
                BenchmarkId::new(format!("tree_vs_tree/{name}"), triangles),
                &transform,
                |bench, t| bench.iter(|| a.intersects_geometry(black_box(&b_tree), t).unwrap()),
            );
            group.bench_with_input(
                BenchmarkId::new(format!("tree_vs_plain/{name}"), triangles),
                &transform,
                |bench, t| bench.iter(|| a.intersects_geometry(black_box(&b_plain), t).unwrap()),
            );
            if resolution <= 16 {
                group.bench_with_input(
                    BenchmarkId::new(format!("brute_force/{name}"), triangles),
                    &transform,
                    |bench, t| {
                        bench.iter(|| {
                            intersects_brute_force(a.geometry(), black_box(b_plain.geometry()), t)
                        })
                    },
                );
            }
        }
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_query);
criterion_main!(benches);
