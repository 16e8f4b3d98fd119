//! Spatial partitioning data structures
//!
//! Provides the bounding volume hierarchy that backs actor-vs-actor
//! collision and area queries in 2D space.

mod dynamic_tree;

pub use dynamic_tree::{DynamicTree, ProxyId, AABB_EXTENSION, AABB_MULTIPLIER};
