//! Impi - implicit iso-surface extraction over multi-resolution voxel data

pub mod core;
pub mod math;
pub mod voxel;
pub mod geometry;
