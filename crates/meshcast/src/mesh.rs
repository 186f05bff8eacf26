//! A triangle mesh paired with its optional bounds tree.

use std::sync::OnceLock;

use meshcast_bvh::{BvhSettings, MeshBvh};
use meshcast_geom::{Aabb3, TriangleMesh};
use meshcast_math::Transform;

use crate::cast::{self, QueryStats};
use crate::error::{QueryError, Result};

/// Geometry plus an optional hierarchy and a lazily computed bounding box.
///
/// A `Mesh` is read-only during queries and may be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    geometry: TriangleMesh,
    bounds_tree: Option<MeshBvh>,
    bounding_box: OnceLock<Aabb3>,
}

impl Mesh {
    /// Wrap geometry without a hierarchy.
    ///
    /// Fails with [`QueryError::Mesh`] if the buffers are malformed.
    pub fn new(geometry: TriangleMesh) -> Result<Self> {
        geometry.validate()?;
        Ok(Self::unchecked(geometry, None))
    }

    /// Wrap geometry and build its hierarchy.
    pub fn with_bounds_tree(geometry: TriangleMesh, settings: &BvhSettings) -> Result<Self> {
        let mut mesh = Self::unchecked(geometry, None);
        mesh.compute_bounds_tree(settings)?;
        Ok(mesh)
    }

    /// Pair geometry with a hierarchy built elsewhere.
    ///
    /// The hierarchy must have been built over this exact index order.
    pub fn with_prebuilt(geometry: TriangleMesh, bounds_tree: MeshBvh) -> Result<Self> {
        geometry.validate()?;
        Ok(Self::unchecked(geometry, Some(bounds_tree)))
    }

    fn unchecked(geometry: TriangleMesh, bounds_tree: Option<MeshBvh>) -> Self {
        Self {
            geometry,
            bounds_tree,
            bounding_box: OnceLock::new(),
        }
    }

    /// Build (or rebuild) the hierarchy, reordering the index buffer.
    pub fn compute_bounds_tree(&mut self, settings: &BvhSettings) -> Result<()> {
        self.bounds_tree = Some(MeshBvh::build(&mut self.geometry, settings)?);
        Ok(())
    }

    /// Drop the hierarchy, returning it.
    pub fn dispose_bounds_tree(&mut self) -> Option<MeshBvh> {
        self.bounds_tree.take()
    }

    /// The underlying buffers.
    pub fn geometry(&self) -> &TriangleMesh {
        &self.geometry
    }

    /// The hierarchy, if one was built.
    pub fn bounds_tree(&self) -> Option<&MeshBvh> {
        self.bounds_tree.as_ref()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.geometry.num_triangles()
    }

    /// Bounds of the vertex buffer, computed on first use.
    pub fn bounding_box(&self) -> &Aabb3 {
        self.bounding_box
            .get_or_init(|| self.geometry.compute_bounding_box())
    }

    /// Whether the bounding box has been computed yet.
    pub fn has_bounding_box(&self) -> bool {
        self.bounding_box.get().is_some()
    }

    /// Whether any triangle of `other`, placed by `transform` (other frame to
    /// this frame), touches any triangle of this mesh. Every root is queried.
    pub fn intersects_geometry(&self, other: &Mesh, transform: &Transform) -> Result<bool> {
        self.intersects_geometry_with_stats(other, transform)
            .map(|(hit, _)| hit)
    }

    /// [`Self::intersects_geometry`] with traversal counters.
    pub fn intersects_geometry_with_stats(
        &self,
        other: &Mesh,
        transform: &Transform,
    ) -> Result<(bool, QueryStats)> {
        let bvh = self.bounds_tree.as_ref().ok_or(QueryError::MissingBoundsTree)?;
        cast::intersects_roots(self, 0..bvh.root_count(), other, transform)
    }
}
