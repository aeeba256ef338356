//! Voxel sources and the entity types they hand to the intersection kernel

pub mod voxel;
pub mod range;
pub mod source;
pub mod structured;
pub mod octant;
pub mod test_case;

pub use voxel::{corner_index, trilinear, Voxel, VoxelRef, CORNER_COUNT};
pub use range::ValueRange;
pub use source::VoxelSource;
pub use structured::{
    LogicalVolume, RefinementPolicy, SegmentedVolumeSource, StructuredVolumeSource, Volume,
};
pub use octant::{Octant, OctantSource};
pub use test_case::{TestAmr, TestOctant, TestVoxel};
