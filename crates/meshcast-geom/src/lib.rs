#![warn(missing_docs)]

//! Bounding primitives and triangle predicates for meshcast.
//!
//! - [`Aabb3`] - axis-aligned box, the node volume of every hierarchy
//! - [`OrientedBox`] - an [`Aabb3`] carried into another frame, used for pruning
//! - [`Triangle`] - working triangle with the exact overlap predicate
//! - [`TriangleMesh`] - flat position and index buffers
//!
//! None of these types compute contact points or depths; the predicates
//! answer yes or no.

pub mod aabb;
pub mod error;
pub mod mesh;
pub mod obb;
pub mod primitives;
pub mod triangle;

pub use aabb::Aabb3;
pub use error::{MeshError, Result};
pub use mesh::{TriangleGroup, TriangleMesh};
pub use obb::{AxisBounds, OrientedBox};
pub use triangle::Triangle;
