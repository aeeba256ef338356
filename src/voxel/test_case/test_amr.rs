//! AMR-like test case with differently sized voxels right next to each other.
//!
//! Two unit coarse cells sit side by side along x; the second one is refined
//! into eight half-width children. References carry a coarse cell index plus
//! a child index:
//! - bits 0..32: coarse cell index
//! - bits 32..35: child index in `x + 2y + 4z` order
//! - bit 63: set for child references

use crate::core::types::Vec3;
use crate::math::aabb::Aabb;
use crate::voxel::octant::Octant;
use crate::voxel::range::ValueRange;
use crate::voxel::source::VoxelSource;
use crate::voxel::voxel::{Voxel, VoxelRef};

/// Iso value that only crosses the refined cell
pub const TEST_AMR_ISO: f32 = 3.2;

const CHILD_FLAG: u64 = 1 << 63;
const CHILD_SHIFT: u32 = 32;

/// `x + y + z`
fn field(p: Vec3) -> f32 {
    p.x + p.y + p.z
}

struct CoarseCell {
    octant: Octant,
    children: Option<[Octant; 8]>,
}

pub struct TestAmr {
    cells: Vec<CoarseCell>,
    range: ValueRange,
}

impl TestAmr {
    pub fn new() -> Self {
        let left = Octant::from_field(Aabb::UNIT, field);
        let right = Octant::from_field(
            Aabb::from_corner_width(Vec3::new(1.0, 0.0, 0.0), 1.0),
            field,
        );
        let cells = vec![
            CoarseCell { octant: left, children: None },
            CoarseCell { octant: right, children: Some(right.refine(field)) },
        ];
        let range = cells
            .iter()
            .fold(ValueRange::EMPTY, |r, c| r.merged(c.octant.value_range()));
        Self { cells, range }
    }

    /// Coarse cell at `index` and whether it was refined
    pub fn coarse(&self, index: usize) -> Option<(&Octant, bool)> {
        self.cells.get(index).map(|c| (&c.octant, c.children.is_some()))
    }

    fn encode(coarse: usize, child: Option<usize>) -> VoxelRef {
        match child {
            Some(child) => VoxelRef(CHILD_FLAG | (child as u64) << CHILD_SHIFT | coarse as u64),
            None => VoxelRef(coarse as u64),
        }
    }

    fn leaf(&self, voxel_ref: VoxelRef) -> &Octant {
        let raw = voxel_ref.0;
        let coarse = (raw & u32::MAX as u64) as usize;
        let cell = self.cells.get(coarse);
        let leaf = match (cell, raw & CHILD_FLAG != 0) {
            (Some(cell), false) if cell.children.is_none() => Some(&cell.octant),
            (Some(cell), true) => {
                let child = ((raw & !CHILD_FLAG) >> CHILD_SHIFT) as usize;
                cell.children.as_ref().and_then(|c| c.get(child))
            }
            _ => None,
        };
        match leaf {
            Some(octant) => octant,
            None => panic!("voxel ref {:?} was not produced by this AMR test case", voxel_ref),
        }
    }
}

impl Default for TestAmr {
    fn default() -> Self {
        Self::new()
    }
}

impl VoxelSource for TestAmr {
    fn active_voxels(&self, iso_value: f32) -> Vec<VoxelRef> {
        let mut active = Vec::new();
        for (i, cell) in self.cells.iter().enumerate() {
            // The field is linear, so children never leave their parent's range
            if !cell.octant.value_range().contains(iso_value) {
                continue;
            }
            match &cell.children {
                Some(children) => active.extend(
                    children
                        .iter()
                        .enumerate()
                        .filter(|(_, c)| c.value_range().contains(iso_value))
                        .map(|(c, _)| Self::encode(i, Some(c))),
                ),
                None => active.push(Self::encode(i, None)),
            }
        }
        active
    }

    fn voxel_bounds(&self, voxel_ref: VoxelRef) -> Aabb {
        self.leaf(voxel_ref).bounds
    }

    fn voxel(&self, voxel_ref: VoxelRef) -> Voxel {
        self.leaf(voxel_ref).to_voxel()
    }

    fn value_range(&self) -> ValueRange {
        self.range
    }

    fn cell_count(&self) -> usize {
        self.cells
            .iter()
            .map(|c| c.children.as_ref().map_or(1, |ch| ch.len()))
            .sum()
    }

    fn name(&self) -> &'static str {
        "test_amr"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::source::contract;

    fn all_refs() -> Vec<VoxelRef> {
        let mut refs = vec![TestAmr::encode(0, None)];
        refs.extend((0..8).map(|c| TestAmr::encode(1, Some(c))));
        refs
    }

    #[test]
    fn test_layout() {
        let source = TestAmr::new();
        assert_eq!(source.cell_count(), 9);
        assert_eq!(source.value_range(), ValueRange::new(0.0, 4.0));
        assert!(!source.coarse(0).unwrap().1);
        assert!(source.coarse(1).unwrap().1);
    }

    #[test]
    fn test_default_iso_only_hits_fine_cells() {
        let source = TestAmr::new();
        let active = source.active_voxels(TEST_AMR_ISO);
        assert!(!active.is_empty());
        for r in active {
            let bounds = source.voxel_bounds(r);
            assert_eq!(bounds.size(), Vec3::splat(0.5));
            assert!(bounds.min.x >= 1.0);
        }
    }

    #[test]
    fn test_mixed_sizes_share_face() {
        let source = TestAmr::new();
        // x + y + z = 1.5 crosses the coarse cell and the children touching x = 1
        let active = source.active_voxels(1.5);
        assert!(active.contains(&TestAmr::encode(0, None)));
        assert!(active.contains(&TestAmr::encode(1, Some(0))));
    }

    #[test]
    fn test_contract() {
        let source = TestAmr::new();
        let refs = all_refs();
        for iso in [0.5, 1.5, 2.0, TEST_AMR_ISO, 3.9] {
            contract::assert_exact(&source, &refs, iso);
        }
        contract::assert_resolver_contract(&source, TEST_AMR_ISO);
    }

    #[test]
    #[should_panic(expected = "not produced by this AMR test case")]
    fn test_parent_of_refined_cell_is_not_a_leaf() {
        TestAmr::new().voxel(TestAmr::encode(1, None));
    }
}
