//! Vertex-centred AMR test case: a 2x2x2-cell base level over the unit cube in
//! which one cell is refined into another 2x2x2-cell finer level.
//!
//! The refined parent is replaced by its children in the octant list; it stays
//! available through [`TestOctant::refined_parent`].

use crate::core::types::{UVec3, Vec3};
use crate::math::aabb::Aabb;
use crate::voxel::octant::{Octant, OctantSource};
use crate::voxel::range::ValueRange;
use crate::voxel::source::VoxelSource;
use crate::voxel::voxel::{Voxel, VoxelRef};

/// Iso value that crosses both levels of the default test octant
pub const TEST_OCTANT_ISO: f32 = 0.7;

const BASE_WIDTH: f32 = 0.5;

/// Distance from the origin
fn field(p: Vec3) -> f32 {
    p.length()
}

pub struct TestOctant {
    source: OctantSource,
    refined_parent: Octant,
}

impl TestOctant {
    /// Refine the base cell at the origin
    pub fn new() -> Self {
        Self::with_refined_cell(UVec3::ZERO)
    }

    /// Refine the base cell at `cell` (each component 0 or 1)
    pub fn with_refined_cell(cell: UVec3) -> Self {
        debug_assert!(cell.cmple(UVec3::ONE).all());
        let cell = cell.min(UVec3::ONE);

        let parent_bounds = Aabb::from_corner_width(cell.as_vec3() * BASE_WIDTH, BASE_WIDTH);
        let refined_parent = Octant::from_field(parent_bounds, field);

        let mut octants = Vec::with_capacity(15);
        for z in 0..2 {
            for y in 0..2 {
                for x in 0..2 {
                    let base = UVec3::new(x, y, z);
                    if base == cell {
                        continue;
                    }
                    let lower = base.as_vec3() * BASE_WIDTH;
                    octants.push(Octant::from_field(Aabb::from_corner_width(lower, BASE_WIDTH), field));
                }
            }
        }
        octants.extend(refined_parent.refine(field));

        log::debug!(
            "Test octant: {} octants, refined cell {:?}",
            octants.len(),
            cell
        );

        Self {
            source: OctantSource::new(octants),
            refined_parent,
        }
    }

    /// The base cell that was replaced by finer octants
    pub fn refined_parent(&self) -> &Octant {
        &self.refined_parent
    }

    /// The eight finer octants, in corner-index order
    pub fn children(&self) -> &[Octant] {
        let octants = self.source.octants();
        &octants[octants.len() - 8..]
    }

    pub fn octants(&self) -> &[Octant] {
        self.source.octants()
    }
}

impl Default for TestOctant {
    fn default() -> Self {
        Self::new()
    }
}

impl VoxelSource for TestOctant {
    fn active_voxels(&self, iso_value: f32) -> Vec<VoxelRef> {
        self.source.active_voxels(iso_value)
    }

    fn voxel_bounds(&self, voxel_ref: VoxelRef) -> Aabb {
        self.source.voxel_bounds(voxel_ref)
    }

    fn voxel(&self, voxel_ref: VoxelRef) -> Voxel {
        self.source.voxel(voxel_ref)
    }

    fn value_range(&self) -> ValueRange {
        self.source.value_range()
    }

    fn cell_count(&self) -> usize {
        self.source.cell_count()
    }

    fn name(&self) -> &'static str {
        "test_octant"
    }
}
