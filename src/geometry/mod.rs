//! Iso-surface geometry: parameters, orchestration and the kernel hand-off

pub mod params;
pub mod kernel;
pub mod impi;

pub use params::{ImpiParams, SourceParams, VolumeInput, DEFAULT_ISO_VALUE};
pub use kernel::{IntersectionKernel, VoxelCollector, VoxelResolver};
pub use impi::Impi;
