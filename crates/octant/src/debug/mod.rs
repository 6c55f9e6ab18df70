//! Debug module for visualization and debugging tools
//!
//! Shapes are recorded here and handed to whatever renderer the host
//! application uses.

pub mod draw;
pub mod octree_debug;

pub use draw::{DebugDrawSystem, DebugShape};
pub use octree_debug::{DisplayMode, OctreeDebugColors, OctreeDebugVisualizer};
