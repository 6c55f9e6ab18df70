//! Demo settings, loadable from a TOML or RON file

use octant::config::{Config, ConfigError};
use octant::spatial::OctreeConfig;
use serde::{Deserialize, Serialize};

/// Simulation parameters for the octree demo
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Number of boxes to scatter
    pub object_count: u32,
    /// Boxes stay inside a cube of this edge length centered on the origin
    pub world_size: f32,
    /// Edge length of every box
    pub box_size: f32,
    /// Top speed along each axis, in units per second
    pub max_speed: f32,
    /// Frames to simulate
    pub frames: u32,
    /// Fixed timestep in seconds
    pub delta_time: f32,
    /// Frames between display mode changes
    pub frames_per_mode: u32,
    /// RNG seed, so runs are repeatable
    pub seed: u64,
    /// Tree settings
    pub octree: OctreeConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            object_count: 40,
            world_size: 100.0,
            box_size: 1.5,
            max_speed: 6.0,
            frames: 600,
            delta_time: 1.0 / 60.0,
            frames_per_mode: 60,
            seed: 7,
            octree: OctreeConfig::default(),
        }
    }
}

impl Config for DemoConfig {
    fn validate_loaded(&self) -> Result<(), ConfigError> {
        self.octree.validate()?;
        positive("world_size", self.world_size)?;
        positive("delta_time", self.delta_time)?;
        non_negative("box_size", self.box_size)?;
        non_negative("max_speed", self.max_speed)?;
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            reason: format!("must be a finite number above zero, got {value}"),
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            reason: format!("must be a finite number, zero or more, got {value}"),
        })
    }
}
