//! Single-cell test source

use crate::math::aabb::Aabb;
use crate::voxel::range::ValueRange;
use crate::voxel::source::VoxelSource;
use crate::voxel::voxel::{Voxel, VoxelRef, CORNER_COUNT};

/// Iso value that cuts through the default corner values
pub const TEST_VOXEL_ISO: f32 = 20.0;

/// One voxel over the unit cube
#[derive(Clone, Debug)]
pub struct TestVoxel {
    voxel: Voxel,
}

impl TestVoxel {
    /// Corners `0, 10, .., 70` in corner-index order
    pub fn new() -> Self {
        Self::with_values(std::array::from_fn(|i| i as f32 * 10.0))
    }

    pub fn with_values(vertex_values: [f32; CORNER_COUNT]) -> Self {
        Self {
            voxel: Voxel::new(Aabb::UNIT, vertex_values),
        }
    }

    fn check(&self, voxel_ref: VoxelRef) {
        assert!(
            voxel_ref.0 == 0,
            "voxel ref {:?} was not produced by this test voxel",
            voxel_ref
        );
    }
}

impl Default for TestVoxel {
    fn default() -> Self {
        Self::new()
    }
}

impl VoxelSource for TestVoxel {
    fn active_voxels(&self, iso_value: f32) -> Vec<VoxelRef> {
        if self.voxel.straddles(iso_value) {
            vec![VoxelRef(0)]
        } else {
            Vec::new()
        }
    }

    fn voxel_bounds(&self, voxel_ref: VoxelRef) -> Aabb {
        self.check(voxel_ref);
        self.voxel.bounds
    }

    fn voxel(&self, voxel_ref: VoxelRef) -> Voxel {
        self.check(voxel_ref);
        self.voxel
    }

    fn value_range(&self) -> ValueRange {
        self.voxel.value_range()
    }

    fn cell_count(&self) -> usize {
        1
    }

    fn name(&self) -> &'static str {
        "test_voxel"
    }
}
