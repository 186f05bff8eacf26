//! Error types for hierarchy construction.

use meshcast_geom::MeshError;
use thiserror::Error;

/// Errors that can occur while building or adopting a hierarchy.
#[derive(Error, Debug)]
pub enum BuildError {
    /// Invalid build settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// The source mesh failed validation.
    #[error("invalid mesh: {0}")]
    Mesh(#[from] MeshError),

    /// A packed root buffer is not a whole number of nodes.
    #[error("root {root} has {len} words, not a multiple of {stride}")]
    MalformedBuffer {
        /// Root index.
        root: usize,
        /// Buffer length in 32-bit words.
        len: usize,
        /// Words per node.
        stride: usize,
    },

    /// Settings document could not be parsed.
    #[error("failed to parse settings: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type for hierarchy operations.
pub type Result<T> = std::result::Result<T, BuildError>;
