#![warn(missing_docs)]

//! BVH-accelerated intersection queries between triangle meshes.
//!
//! Build a hierarchy over one mesh, then ask whether another mesh, placed by
//! a transform into the first mesh's frame, touches it anywhere:
//!
//! ```ignore
//! use meshcast::{BvhSettings, Mesh, Transform};
//! use meshcast::primitives::make_sphere;
//!
//! let a = Mesh::with_bounds_tree(make_sphere(1.0, 16, 32), &BvhSettings::default())?;
//! let b = Mesh::new(make_sphere(1.0, 16, 32))?;
//! assert!(a.intersects_geometry(&b, &Transform::translation(1.5, 0.0, 0.0))?);
//! ```
//!
//! If the other mesh has its own hierarchy, each leaf of the first walks it
//! in turn; otherwise leaves are tested against every triangle.

pub mod brute_force;
pub mod cast;
pub mod error;
pub mod frame;
pub mod mesh;

pub use brute_force::intersects_brute_force;
pub use cast::{intersects_geometry, intersects_geometry_with_stats, QueryStats};
pub use error::{QueryError, Result};
pub use frame::FrameTransform;
pub use mesh::Mesh;

pub use meshcast_bvh::{BuildError, BvhSettings, MeshBvh, SplitStrategy};
pub use meshcast_geom::{primitives, Aabb3, MeshError, OrientedBox, Triangle, TriangleMesh};
pub use meshcast_math::{Point3, Tolerance, Transform, Vec3};
