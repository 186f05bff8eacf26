//! Triangle mesh buffers.

use meshcast_math::{Point3, Transform};
use serde::{Deserialize, Serialize};

use crate::aabb::Aabb3;
use crate::error::{MeshError, Result};
use crate::triangle::Triangle;

/// A contiguous run of triangles that gets its own hierarchy root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriangleGroup {
    /// First triangle of the group.
    pub start: usize,
    /// Number of triangles in the group.
    pub count: usize,
}

/// Triangle mesh buffers in a local frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriangleMesh {
    /// Flat array of vertex positions: `[x0, y0, z0, x1, y1, z1, ...]` (f32).
    pub vertices: Vec<f32>,
    /// Flat array of triangle indices: `[i0, i1, i2, ...]`.
    ///
    /// `None` means vertices are consumed three at a time in order.
    #[serde(default)]
    pub indices: Option<Vec<u32>>,
    /// Optional triangle groups; empty means one group over every triangle.
    #[serde(default)]
    pub groups: Vec<TriangleGroup>,
}

impl TriangleMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an indexed mesh.
    pub fn indexed(vertices: Vec<f32>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices: Some(indices),
            groups: Vec::new(),
        }
    }

    /// Create a non-indexed mesh (every three vertices form a triangle).
    pub fn from_positions(vertices: Vec<f32>) -> Self {
        Self {
            vertices,
            indices: None,
            groups: Vec::new(),
        }
    }

    /// Build a non-indexed mesh from triangles.
    pub fn from_triangles<'a>(triangles: impl IntoIterator<Item = &'a Triangle>) -> Self {
        let mut vertices = Vec::new();
        for t in triangles {
            for p in t.points() {
                vertices.extend_from_slice(&[p.x as f32, p.y as f32, p.z as f32]);
            }
        }
        Self::from_positions(vertices)
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.num_vertices() / 3,
        }
    }

    /// Whether the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.num_triangles() == 0
    }

    /// Position of vertex `i`.
    #[inline]
    pub fn vertex(&self, i: usize) -> Point3 {
        let v = &self.vertices[i * 3..i * 3 + 3];
        Point3::new(v[0] as f64, v[1] as f64, v[2] as f64)
    }

    /// Vertex indices of triangle `tri`.
    #[inline]
    pub fn triangle_indices(&self, tri: usize) -> [usize; 3] {
        let i = tri * 3;
        match &self.indices {
            Some(indices) => [
                indices[i] as usize,
                indices[i + 1] as usize,
                indices[i + 2] as usize,
            ],
            None => [i, i + 1, i + 2],
        }
    }

    /// Load triangle `tri` into a working triangle.
    #[inline]
    pub fn set_triangle(&self, tri: usize, target: &mut Triangle) {
        let [i0, i1, i2] = self.triangle_indices(tri);
        target.set(self.vertex(i0), self.vertex(i1), self.vertex(i2));
    }

    /// Triangle `tri` as an owned value.
    pub fn triangle(&self, tri: usize) -> Triangle {
        let mut t = Triangle::default();
        self.set_triangle(tri, &mut t);
        t
    }

    /// Bounds of every vertex in the position buffer.
    pub fn compute_bounding_box(&self) -> Aabb3 {
        let mut aabb = Aabb3::empty();
        for i in 0..self.num_vertices() {
            aabb.include_point(&self.vertex(i));
        }
        aabb
    }

    /// Materialize a sequential index buffer for a non-indexed mesh.
    pub fn ensure_index(&mut self) {
        if self.indices.is_none() {
            let count = self.num_triangles() as u32 * 3;
            self.indices = Some((0..count).collect());
        }
    }

    /// Append a triangle group.
    pub fn add_group(&mut self, start: usize, count: usize) {
        self.groups.push(TriangleGroup { start, count });
    }

    /// Triangle ranges that each get a hierarchy root, ordered by start.
    ///
    /// Triangles outside every group get a root per uncovered run, so the
    /// ranges always cover the whole mesh.
    pub fn root_ranges(&self) -> Vec<TriangleGroup> {
        let total = self.num_triangles();
        if self.groups.is_empty() {
            return vec![TriangleGroup {
                start: 0,
                count: total,
            }];
        }

        let mut sorted = self.groups.clone();
        sorted.sort_by_key(|g| (g.start, g.count));

        let mut ranges = Vec::with_capacity(sorted.len() + 1);
        let mut cursor = 0;
        for g in sorted {
            if g.start > cursor {
                ranges.push(TriangleGroup {
                    start: cursor,
                    count: g.start - cursor,
                });
            }
            ranges.push(g);
            cursor = cursor.max(g.start + g.count);
        }
        if cursor < total {
            ranges.push(TriangleGroup {
                start: cursor,
                count: total - cursor,
            });
        }
        ranges
    }

    /// Merge another mesh into this one, keeping both as separate groups.
    pub fn merge(&mut self, other: &TriangleMesh) {
        let own_groups = self.root_ranges();
        let offset_tris = self.num_triangles();
        let offset_verts = self.num_vertices() as u32;

        self.ensure_index();
        let other_indices: Vec<u32> = (0..other.num_triangles())
            .flat_map(|t| other.triangle_indices(t))
            .map(|i| i as u32 + offset_verts)
            .collect();
        self.vertices.extend_from_slice(&other.vertices);
        if let Some(indices) = self.indices.as_mut() {
            indices.extend(other_indices);
        }

        self.groups = own_groups;
        self.groups.extend(other.root_ranges().into_iter().map(|g| TriangleGroup {
            start: g.start + offset_tris,
            count: g.count,
        }));
    }

    /// A copy with every vertex moved by `transform`.
    pub fn transformed(&self, transform: &Transform) -> TriangleMesh {
        let mut out = self.clone();
        for (i, v) in out.vertices.chunks_exact_mut(3).enumerate() {
            let p = transform.apply_point(&self.vertex(i));
            v[0] = p.x as f32;
            v[1] = p.y as f32;
            v[2] = p.z as f32;
        }
        out
    }

    /// Check buffer lengths, index bounds, and that groups are in range and
    /// disjoint.
    pub fn validate(&self) -> Result<()> {
        if self.vertices.len() % 3 != 0 {
            return Err(MeshError::VertexBufferLength(self.vertices.len()));
        }
        let vertex_count = self.num_vertices();
        match &self.indices {
            Some(indices) => {
                if indices.len() % 3 != 0 {
                    return Err(MeshError::IndexBufferLength(indices.len()));
                }
                if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                    return Err(MeshError::IndexOutOfBounds {
                        index,
                        vertex_count,
                    });
                }
            }
            None if vertex_count % 3 != 0 => {
                return Err(MeshError::VertexBufferLength(self.vertices.len()));
            }
            None => {}
        }
        let triangle_count = self.num_triangles();
        for g in &self.groups {
            if g.start + g.count > triangle_count {
                return Err(MeshError::GroupOutOfRange {
                    start: g.start,
                    end: g.start + g.count,
                    triangle_count,
                });
            }
        }
        let mut sorted = self.groups.clone();
        sorted.sort_by_key(|g| (g.start, g.count));
        for pair in sorted.windows(2) {
            if pair[1].start < pair[0].start + pair[0].count {
                return Err(MeshError::GroupsOverlap {
                    first: pair[0].start,
                    second: pair[1].start,
                });
            }
        }
        Ok(())
    }
}
