//! Octree configuration
//!
//! Both values are fixed for the lifetime of one tree. Changing them means
//! constructing a new root.

use serde::{Deserialize, Serialize};

use crate::config::{Config, ConfigError};

/// Deepest level [`OctreeConfig::validate`] accepts. A full tree at this
/// depth already holds 8^8 leaves.
pub const MAX_SANE_LEVEL: u32 = 8;

/// Configuration for octree behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OctreeConfig {
    /// Maximum subdivision depth; the root is level 0
    pub max_level: u32,

    /// A node splits once more than this many objects overlap it
    pub ideal_occupancy: u32,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            max_level: 3,
            ideal_occupancy: 5,
        }
    }
}

impl OctreeConfig {
    /// Create a configuration
    pub fn new(max_level: u32, ideal_occupancy: u32) -> Self {
        Self {
            max_level,
            ideal_occupancy,
        }
    }

    /// Check that the values cannot blow up the node count
    ///
    /// The tree itself never clamps; callers opt in to this check.
    pub fn validate(&self) -> Result<(), OctreeError> {
        if self.max_level > MAX_SANE_LEVEL {
            return Err(OctreeError::LevelTooDeep {
                max_level: self.max_level,
                limit: MAX_SANE_LEVEL,
            });
        }
        Ok(())
    }
}

impl Config for OctreeConfig {
    fn validate_loaded(&self) -> Result<(), ConfigError> {
        Ok(self.validate()?)
    }
}

/// Errors reported when validating octree settings
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OctreeError {
    /// Subdivision depth above [`MAX_SANE_LEVEL`]
    #[error("max level {max_level} exceeds the limit of {limit}")]
    LevelTooDeep {
        /// Requested depth
        max_level: u32,
        /// Accepted maximum
        limit: u32,
    },
}
