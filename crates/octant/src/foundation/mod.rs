//! Foundation module - shared building blocks
//!
//! Vector aliases and colors live in [`math`], log setup in [`logging`].

pub mod math;
pub mod logging;
