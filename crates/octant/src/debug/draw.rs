//! Debug drawing primitives and system
//!
//! Records simple shapes for an external renderer to pick up. Nothing here
//! touches a graphics API.

use crate::foundation::math::{Vec3, Vec4};
use crate::spatial::WireCubeRenderer;

/// Debug shape primitives that can be rendered for visualization
#[derive(Clone, Debug, PartialEq)]
pub enum DebugShape {
    /// Axis-aligned box at center with half-extents
    Box {
        /// Box center
        center: Vec3,
        /// Half-size along each axis
        extents: Vec3,
        /// RGBA color
        color: Vec4,
        /// Seconds left before the shape expires
        duration: f32,
        /// Outline only
        wireframe: bool,
    },

    /// Point at position
    Point {
        /// Point location
        position: Vec3,
        /// RGBA color
        color: Vec4,
        /// Point size in pixels
        size: f32,
        /// Seconds left before the shape expires
        duration: f32,
    },
}

impl DebugShape {
    /// Get remaining duration
    pub fn duration(&self) -> f32 {
        match self {
            DebugShape::Box { duration, .. } | DebugShape::Point { duration, .. } => *duration,
        }
    }

    /// Decrease duration by delta_time, returns true if expired
    pub fn tick(&mut self, delta_time: f32) -> bool {
        match self {
            DebugShape::Box { duration, .. } | DebugShape::Point { duration, .. } => {
                *duration -= delta_time;
                *duration <= 0.0
            }
        }
    }
}

/// Debug drawing system for rendering debug shapes
///
/// Shapes expire once their duration runs out; a zero duration lasts until
/// the next [`DebugDrawSystem::update`].
#[derive(Debug)]
pub struct DebugDrawSystem {
    /// Shapes waiting to be rendered
    shapes: Vec<DebugShape>,

    /// Master enable/disable flag
    pub enabled: bool,
}

impl DebugDrawSystem {
    /// Create a new debug draw system
    pub fn new() -> Self {
        Self {
            shapes: Vec::new(),
            enabled: true,
        }
    }

    /// Draw a box
    pub fn draw_box(&mut self, center: Vec3, extents: Vec3, color: Vec4, duration: f32) {
        if !self.enabled {
            return;
        }

        self.shapes.push(DebugShape::Box {
            center,
            extents,
            color,
            duration,
            wireframe: true,
        });
    }

    /// Draw a point
    pub fn draw_point(&mut self, position: Vec3, color: Vec4, size: f32, duration: f32) {
        if !self.enabled {
            return;
        }

        self.shapes.push(DebugShape::Point {
            position,
            color,
            size,
            duration,
        });
    }

    /// Update shape lifetimes and remove expired shapes
    pub fn update(&mut self, delta_time: f32) {
        if !self.enabled {
            return;
        }

        self.shapes.retain_mut(|shape| !shape.tick(delta_time));
    }

    /// Get all shapes for rendering
    pub fn get_shapes(&self) -> Vec<&DebugShape> {
        if !self.enabled {
            return Vec::new();
        }

        self.shapes.iter().collect()
    }

    /// Get the number of active shapes
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Clear all shapes
    pub fn clear(&mut self) {
        self.shapes.clear();
    }
}

impl Default for DebugDrawSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Octree wireframes last a single frame
impl WireCubeRenderer for DebugDrawSystem {
    fn draw_wire_cube(&mut self, center: Vec3, size: f32, color: Vec4) {
        self.draw_box(center, Vec3::repeat(size * 0.5), color, 0.0);
    }
}
