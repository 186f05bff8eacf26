#![warn(missing_docs)]

//! Packed bounding volume hierarchies over triangle meshes.
//!
//! A [`MeshBvh`] holds one packed buffer per root (see [`node`] for the
//! layout). Traversals read a root through a [`BufferView`] bound on a
//! [`BufferStack`], which lets one traversal nest inside another.
//!
//! ```ignore
//! let mut mesh = make_sphere(1.0, 16, 32);
//! let bvh = MeshBvh::build(&mut mesh, &BvhSettings::default())?;
//! let mut buffers = BufferStack::new();
//! let mut tri = Triangle::default();
//! let hit = bvh.shapecast(&mesh, &mut buffers, &mut tri,
//!     |b| b.max.y > 0.9,
//!     |t, _| t.a.y > 0.9);
//! ```

pub mod buffer;
mod build;
pub mod error;
pub mod node;
pub mod settings;

pub use buffer::{BufferStack, BufferView};
pub use error::{BuildError, Result};
pub use settings::{BvhSettings, SplitStrategy};

use log::debug;
use meshcast_geom::{Aabb3, Triangle, TriangleMesh};
use serde::{Deserialize, Serialize};

use node::UINT32_PER_NODE;

/// A built hierarchy: one packed node buffer per root.
///
/// Immutable once built; share it freely across threads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u32>>", into = "Vec<Vec<u32>>")]
pub struct MeshBvh {
    roots: Vec<Vec<u32>>,
}

impl MeshBvh {
    /// Build a hierarchy over `mesh`.
    ///
    /// The mesh gains an index buffer if it had none, and its triangles are
    /// reordered so that every leaf covers a contiguous range.
    pub fn build(mesh: &mut TriangleMesh, settings: &BvhSettings) -> Result<Self> {
        settings.validate()?;
        mesh.validate()?;

        let roots = build::build_roots(mesh, settings);
        let bvh = Self { roots };
        debug!(
            "built hierarchy: {} roots, {} nodes, {} triangles, strategy {:?}, leaf size {}",
            bvh.root_count(),
            bvh.node_count(),
            mesh.num_triangles(),
            settings.strategy,
            settings.max_leaf_triangles,
        );
        Ok(bvh)
    }

    /// Adopt externally encoded root buffers.
    ///
    /// Only the buffer lengths are checked; the node contents are trusted.
    pub fn from_roots(roots: Vec<Vec<u32>>) -> Result<Self> {
        for (root, words) in roots.iter().enumerate() {
            if words.is_empty() || words.len() % UINT32_PER_NODE != 0 {
                return Err(BuildError::MalformedBuffer {
                    root,
                    len: words.len(),
                    stride: UINT32_PER_NODE,
                });
            }
        }
        Ok(Self { roots })
    }

    /// The packed root buffers.
    pub fn roots(&self) -> &[Vec<u32>] {
        &self.roots
    }

    /// Number of roots.
    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// A view over root `index`.
    pub fn root_view(&self, index: usize) -> Option<BufferView<'_>> {
        self.roots.get(index).map(|words| BufferView::new(words))
    }

    /// Total node count over every root.
    pub fn node_count(&self) -> usize {
        self.roots.iter().map(|r| r.len() / UINT32_PER_NODE).sum()
    }

    /// Internal nodes per split axis (x, y, z) over every root.
    pub fn split_axis_counts(&self) -> [usize; 3] {
        let mut counts = [0; 3];
        for words in &self.roots {
            let view = BufferView::new(words);
            for n in 0..view.node_count() {
                if let Some(axis @ 0..=2) = view.split_axis(n * UINT32_PER_NODE) {
                    counts[axis] += 1;
                }
            }
        }
        counts
    }

    /// Union of the root node bounds.
    pub fn bounding_box(&self) -> Aabb3 {
        let mut aabb = Aabb3::empty();
        for words in &self.roots {
            aabb.include_box(&BufferView::new(words).bounds(0));
        }
        aabb
    }

    /// Generic pruned traversal over every root.
    ///
    /// `intersects_bounds` decides whether a node is descended;
    /// `intersects_triangle` gets each candidate triangle of `geometry`, loaded
    /// into `triangle`, with its index. The first `true` from the triangle
    /// predicate ends the traversal. Each root is bound on `buffers` for the
    /// duration of its walk, and the previous binding is restored after.
    pub fn shapecast<'a, B, T>(
        &'a self,
        geometry: &TriangleMesh,
        buffers: &mut BufferStack<'a>,
        triangle: &mut Triangle,
        mut intersects_bounds: B,
        mut intersects_triangle: T,
    ) -> bool
    where
        B: FnMut(&Aabb3) -> bool,
        T: FnMut(&mut Triangle, usize) -> bool,
    {
        for words in &self.roots {
            buffers.set_buffer(BufferView::new(words));
            let hit = shapecast_node(
                0,
                geometry,
                buffers,
                triangle,
                &mut intersects_bounds,
                &mut intersects_triangle,
            );
            buffers.clear_buffer();
            if hit {
                return true;
            }
        }
        false
    }
}

fn shapecast_node<B, T>(
    n32: usize,
    geometry: &TriangleMesh,
    buffers: &BufferStack<'_>,
    triangle: &mut Triangle,
    intersects_bounds: &mut B,
    intersects_triangle: &mut T,
) -> bool
where
    B: FnMut(&Aabb3) -> bool,
    T: FnMut(&mut Triangle, usize) -> bool,
{
    let Some(view) = buffers.current() else {
        return false;
    };
    if !intersects_bounds(&view.bounds(n32)) {
        return false;
    }

    if view.is_leaf(n32) {
        for tri in view.leaf_range(n32) {
            geometry.set_triangle(tri, triangle);
            if intersects_triangle(triangle, tri) {
                return true;
            }
        }
        return false;
    }

    let (left, right) = view.children(n32);
    shapecast_node(left, geometry, buffers, triangle, intersects_bounds, intersects_triangle)
        || shapecast_node(right, geometry, buffers, triangle, intersects_bounds, intersects_triangle)
}

impl TryFrom<Vec<Vec<u32>>> for MeshBvh {
    type Error = BuildError;

    fn try_from(roots: Vec<Vec<u32>>) -> Result<Self> {
        Self::from_roots(roots)
    }
}

impl From<MeshBvh> for Vec<Vec<u32>> {
    fn from(bvh: MeshBvh) -> Self {
        bvh.roots
    }
}
