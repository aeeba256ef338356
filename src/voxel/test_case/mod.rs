//! Synthetic voxel sources that exercise the single-cell and multi-resolution
//! paths without any external data

pub mod test_voxel;
pub mod test_octant;
pub mod test_amr;

pub use test_voxel::{TestVoxel, TEST_VOXEL_ISO};
pub use test_octant::{TestOctant, TEST_OCTANT_ISO};
pub use test_amr::{TestAmr, TEST_AMR_ISO};
