//! Hierarchy-accelerated queries.

mod intersects_geometry;

pub use intersects_geometry::{intersects_geometry, intersects_geometry_with_stats};
pub(crate) use intersects_geometry::intersects_roots;

use serde::Serialize;

/// Work counters for one query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueryStats {
    /// Nodes of the queried hierarchy entered.
    pub nodes_visited: usize,
    /// Leaves of the queried hierarchy that reached triangle tests.
    pub leaves_visited: usize,
    /// Oriented-box versus node-box tests, over both hierarchies.
    pub bounds_tests: usize,
    /// Exact triangle-triangle tests.
    pub triangle_pairs: usize,
}
