//! Math utilities and types
//!
//! Thin aliases over nalgebra so the spatial code reads in engine terms.

pub use nalgebra::{Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type, used for RGBA colors
pub type Vec4 = Vector4<f32>;

/// Color helpers for debug output
pub mod colors {
    use super::Vec4;

    /// Opaque white
    pub fn white() -> Vec4 {
        Vec4::new(1.0, 1.0, 1.0, 1.0)
    }

    /// Opaque yellow, the default octant wire color
    pub fn yellow() -> Vec4 {
        Vec4::new(1.0, 1.0, 0.0, 1.0)
    }

    /// Opaque red
    pub fn red() -> Vec4 {
        Vec4::new(1.0, 0.0, 0.0, 1.0)
    }

    /// Opaque cyan
    pub fn cyan() -> Vec4 {
        Vec4::new(0.0, 1.0, 1.0, 1.0)
    }
}

/// Largest component of a vector
pub fn max_component(v: &Vec3) -> f32 {
    v.x.max(v.y).max(v.z)
}
