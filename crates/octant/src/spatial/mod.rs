//! Spatial partitioning data structures
//!
//! Bounding-volume octree over an external object store, rebuilt wholesale
//! whenever the objects move.

mod aabb;
mod config;
mod octree;
mod store;

#[cfg(test)]
mod tests;

pub use aabb::AABB;
pub use config::{OctreeConfig, OctreeError, MAX_SANE_LEVEL};
pub use octree::{octant_direction, OctantKey, OctantNode, OctantTree, WireCubeRenderer, OCTANT_CHILDREN};
pub use store::{AabbStore, BoundsStore};
