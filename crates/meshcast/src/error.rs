//! Error types for intersection queries.

use meshcast_bvh::BuildError;
use meshcast_geom::MeshError;
use thiserror::Error;

/// Errors surfaced before a query starts traversing.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The transform between the two frames has no inverse.
    #[error("transform is not invertible")]
    NonInvertibleTransform,

    /// The queried mesh has no bounds tree.
    #[error("mesh has no bounds tree; build one first")]
    MissingBoundsTree,

    /// Requested root does not exist.
    #[error("root {root} out of range (hierarchy has {roots} roots)")]
    RootOutOfRange {
        /// Requested root.
        root: usize,
        /// Number of roots in the hierarchy.
        roots: usize,
    },

    /// Mesh buffers are malformed.
    #[error("invalid mesh: {0}")]
    Mesh(#[from] MeshError),

    /// Building a bounds tree failed.
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
