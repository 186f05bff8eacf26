//! Top-down hierarchy construction into the packed node layout.

use meshcast_geom::{Aabb3, TriangleMesh};
use meshcast_math::Point3;

use crate::node::{self, UINT32_PER_NODE};
use crate::settings::{BvhSettings, SplitStrategy};

/// Per-triangle build record: (triangle id, bounds, centroid).
type TriangleInfo = (u32, Aabb3, Point3);

/// Intermediate tree, flattened once construction is done.
#[derive(Debug)]
enum BuildNode {
    Leaf {
        aabb: Aabb3,
        offset: u32,
        count: u16,
    },
    Internal {
        aabb: Aabb3,
        axis: u32,
        left: Box<BuildNode>,
        right: Box<BuildNode>,
    },
}

/// Build one packed root per triangle group, reordering `mesh.indices` so
/// every leaf covers a contiguous triangle range.
///
/// The mesh must already be validated.
pub(crate) fn build_roots(mesh: &mut TriangleMesh, settings: &BvhSettings) -> Vec<Vec<u32>> {
    mesh.ensure_index();
    let ranges = mesh.root_ranges();
    let mut roots = Vec::with_capacity(ranges.len());

    for group in ranges {
        let mut data: Vec<TriangleInfo> = (group.start..group.start + group.count)
            .map(|tri| {
                let aabb = mesh.triangle(tri).bounding_box();
                (tri as u32, aabb, aabb.center())
            })
            .collect();

        let root = if data.is_empty() {
            BuildNode::Leaf {
                aabb: Aabb3::empty(),
                offset: group.start as u32,
                count: 0,
            }
        } else {
            build_node(&mut data, group.start as u32, 0, settings)
        };

        reorder_indices(mesh, group.start, &data);

        let mut words = Vec::new();
        flatten_node(&root, &mut words);
        roots.push(words);
    }

    roots
}

/// Rewrite the index triples of a group in leaf order.
fn reorder_indices(mesh: &mut TriangleMesh, start: usize, data: &[TriangleInfo]) {
    let Some(indices) = mesh.indices.as_mut() else {
        return;
    };
    let sorted: Vec<u32> = data
        .iter()
        .flat_map(|&(tri, _, _)| {
            let i = tri as usize * 3;
            [indices[i], indices[i + 1], indices[i + 2]]
        })
        .collect();
    indices[start * 3..start * 3 + sorted.len()].copy_from_slice(&sorted);
}

/// Append `node` and its subtree to `words`; returns the node's slot index.
fn flatten_node(node: &BuildNode, words: &mut Vec<u32>) -> usize {
    let idx = words.len();
    words.resize(idx + UINT32_PER_NODE, 0);

    match node {
        BuildNode::Leaf {
            aabb,
            offset,
            count,
        } => {
            node::write_leaf(&mut words[idx..idx + UINT32_PER_NODE], aabb, *offset, *count);
        }
        BuildNode::Internal {
            aabb,
            axis,
            left,
            right,
        } => {
            flatten_node(left, words);
            let right_idx = flatten_node(right, words);
            node::write_internal(
                &mut words[idx..idx + UINT32_PER_NODE],
                aabb,
                right_idx as u32,
                *axis,
            );
        }
    }

    idx
}

/// Build a node over `data`, whose first triangle lands at `offset`.
fn build_node(data: &mut [TriangleInfo], offset: u32, depth: usize, settings: &BvhSettings) -> BuildNode {
    let mut aabb = Aabb3::empty();
    let mut centroids = Aabb3::empty();
    for (_, bounds, centroid) in data.iter() {
        aabb.include_box(bounds);
        centroids.include_point(centroid);
    }

    let len = data.len();
    let at_depth_limit = depth >= settings.max_depth && len <= u16::MAX as usize;
    if len <= settings.max_leaf_triangles || at_depth_limit {
        return BuildNode::Leaf {
            aabb,
            offset,
            count: len as u16,
        };
    }

    let split = match settings.strategy {
        SplitStrategy::Center => {
            let axis = centroids.longest_axis();
            Some((axis, (centroids.min[axis] + centroids.max[axis]) * 0.5))
        }
        SplitStrategy::Average => {
            let axis = centroids.longest_axis();
            let sum: f64 = data.iter().map(|(_, _, c)| c[axis]).sum();
            Some((axis, sum / len as f64))
        }
        SplitStrategy::Sah => find_best_split(data, &centroids),
    };

    let (axis, mid) = match split {
        Some((axis, pos)) => (axis, partition(data, axis, pos)),
        None => (centroids.longest_axis(), 0),
    };

    // Degenerate partition: split in the middle
    let mid = if mid == 0 || mid == len { len / 2 } else { mid };

    let (left_data, right_data) = data.split_at_mut(mid);
    let left = build_node(left_data, offset, depth + 1, settings);
    let right = build_node(right_data, offset + mid as u32, depth + 1, settings);

    BuildNode::Internal {
        aabb,
        axis: axis as u32,
        left: Box::new(left),
        right: Box::new(right),
    }
}

/// Bucketed SAH over the centroid bounds. `None` when no bucket boundary
/// separates the triangles.
fn find_best_split(data: &[TriangleInfo], centroids: &Aabb3) -> Option<(usize, f64)> {
    const NUM_BUCKETS: usize = 12;
    const TRAVERSAL_COST: f64 = 0.125;

    let extent = centroids.extent();
    let mut best: Option<(f64, usize, f64)> = None;

    for axis in 0..3 {
        let axis_extent = extent[axis];
        if axis_extent < 1e-10 {
            continue;
        }
        let axis_min = centroids.min[axis];

        let mut bucket_counts = [0usize; NUM_BUCKETS];
        let mut bucket_bounds = [Aabb3::empty(); NUM_BUCKETS];

        for (_, aabb, centroid) in data {
            let b = ((centroid[axis] - axis_min) / axis_extent * NUM_BUCKETS as f64) as usize;
            let b = b.min(NUM_BUCKETS - 1);
            bucket_counts[b] += 1;
            bucket_bounds[b].include_box(aabb);
        }

        for split in 1..NUM_BUCKETS {
            let mut left_count = 0;
            let mut left_bounds = Aabb3::empty();
            for i in 0..split {
                left_count += bucket_counts[i];
                left_bounds.include_box(&bucket_bounds[i]);
            }

            let mut right_count = 0;
            let mut right_bounds = Aabb3::empty();
            for i in split..NUM_BUCKETS {
                right_count += bucket_counts[i];
                right_bounds.include_box(&bucket_bounds[i]);
            }

            if left_count == 0 || right_count == 0 {
                continue;
            }

            // Parent area is shared by every candidate; compare unnormalized.
            let cost = TRAVERSAL_COST
                + left_bounds.surface_area() * left_count as f64
                + right_bounds.surface_area() * right_count as f64;

            if best.map_or(true, |(c, _, _)| cost < c) {
                let pos = axis_min + (split as f64 / NUM_BUCKETS as f64) * axis_extent;
                best = Some((cost, axis, pos));
            }
        }
    }

    best.map(|(_, axis, pos)| (axis, pos))
}

/// Partition by centroid: everything below `pos` on `axis` moves to the front.
fn partition(data: &mut [TriangleInfo], axis: usize, pos: f64) -> usize {
    let mut left = 0;
    let mut right = data.len();

    while left < right {
        if data[left].2[axis] < pos {
            left += 1;
        } else {
            right -= 1;
            data.swap(left, right);
        }
    }

    left
}
