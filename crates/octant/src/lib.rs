//! # Octant
//!
//! An octree spatial index for axis-aligned bounding boxes.
//!
//! ## Features
//!
//! - **Arena Octree**: Nodes live in a slot map and reference each other by key
//! - **Adaptive Subdivision**: Octants split while they hold too many objects
//! - **Leaf Registry**: Occupied leaves are listed for quick narrow-phase passes
//! - **Debug Drawing**: Wireframe output through a pluggable renderer
//! - **File Configuration**: Tree settings load from TOML or RON
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use octant::prelude::*;
//!
//! let mut store: AabbStore = (0..20)
//!     .map(|i| AABB::cube(Vec3::new(i as f32, 0.0, 0.0), 0.5))
//!     .collect();
//!
//! let mut tree = OctantTree::new(&mut store, OctreeConfig::new(3, 5));
//! println!("{} octants, {} occupied leaves", tree.octant_count(), tree.leaf_registry().len());
//!
//! // Objects moved: wipe their cell tags and rebuild
//! store.clear_cells();
//! tree.rebuild_world(&mut store);
//!
//! let mut debug = OctreeDebugVisualizer::new();
//! debug.draw(&tree);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod spatial;
pub mod debug;

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError},
        debug::{DebugDrawSystem, DebugShape, DisplayMode, OctreeDebugVisualizer},
        foundation::math::{Vec3, Vec4},
        spatial::{
            AabbStore, BoundsStore, OctantKey, OctantNode, OctantTree, OctreeConfig, OctreeError,
            WireCubeRenderer, AABB,
        },
    };
}
