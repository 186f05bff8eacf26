//! Error types for mesh buffers.

use thiserror::Error;

/// Errors raised when validating triangle mesh buffers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// Position buffer length is not a multiple of three.
    #[error("vertex buffer length {0} is not a multiple of 3")]
    VertexBufferLength(usize),

    /// Index buffer length is not a multiple of three.
    #[error("index buffer length {0} is not a multiple of 3")]
    IndexBufferLength(usize),

    /// An index references a vertex past the end of the position buffer.
    #[error("index {index} out of bounds for {vertex_count} vertices")]
    IndexOutOfBounds {
        /// The offending vertex index.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// A triangle group extends past the last triangle.
    #[error("group {start}..{end} exceeds triangle count {triangle_count}")]
    GroupOutOfRange {
        /// First triangle of the group.
        start: usize,
        /// One past the last triangle of the group.
        end: usize,
        /// Number of triangles in the mesh.
        triangle_count: usize,
    },

    /// Two triangle groups share triangles.
    #[error("groups starting at {first} and {second} overlap")]
    GroupsOverlap {
        /// Start of the earlier group.
        first: usize,
        /// Start of the group that begins inside it.
        second: usize,
    },
}

/// Result type for mesh operations.
pub type Result<T> = std::result::Result<T, MeshError>;
