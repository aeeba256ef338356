//! Voxel source abstraction.
//!
//! A voxel source owns one volumetric representation (uniform grid,
//! segmented grid, octant list, synthetic test case) and exposes it to the
//! rest of the pipeline through opaque [`VoxelRef`]s. Each concrete source
//! has its own typed constructor; the trait only covers what happens after
//! the data is loaded.

use crate::math::aabb::Aabb;
use crate::voxel::range::ValueRange;
use crate::voxel::voxel::{Voxel, VoxelRef};

/// Trait for volumetric representations that can enumerate and resolve
/// iso-surface cells.
///
/// Implementations are immutable after construction, so the resolver calls
/// may be issued concurrently from any number of threads.
pub trait VoxelSource: Send + Sync {
    /// List every cell whose corner range contains `iso_value`.
    ///
    /// A representation may conservatively report extra cells, but must never
    /// drop one whose range contains the iso value. An iso value outside the
    /// data range yields an empty list. The order carries no meaning.
    fn active_voxels(&self, iso_value: f32) -> Vec<VoxelRef>;

    /// Object-space bounds of a cell. Pure decode plus lookup.
    ///
    /// Panics if `voxel_ref` was not produced by this source.
    fn voxel_bounds(&self, voxel_ref: VoxelRef) -> Aabb;

    /// Bounds and all 8 corner values of a cell.
    ///
    /// Panics if `voxel_ref` was not produced by this source.
    fn voxel(&self, voxel_ref: VoxelRef) -> Voxel;

    /// Range of every corner value stored in this source
    fn value_range(&self) -> ValueRange;

    /// Number of leaf cells an enumeration scans
    fn cell_count(&self) -> usize;

    /// Short name used in log output
    fn name(&self) -> &'static str;

    /// Fill `out` with the active voxels for `iso_value`, replacing its contents.
    ///
    /// Lets callers reuse one allocation across iso-value changes.
    fn collect_active_voxels(&self, out: &mut Vec<VoxelRef>, iso_value: f32) {
        out.clear();
        out.extend(self.active_voxels(iso_value));
    }
}

#[cfg(test)]
pub(crate) mod contract {
    //! Shared checks every source's tests run against its own data.

    use super::*;

    /// Brute-force expected result: every voxel in `all` that straddles `iso`
    pub fn assert_exact(source: &dyn VoxelSource, all: &[VoxelRef], iso: f32) {
        let mut expected: Vec<VoxelRef> = all
            .iter()
            .copied()
            .filter(|&r| source.voxel(r).straddles(iso))
            .collect();
        let mut actual = source.active_voxels(iso);
        expected.sort();
        actual.sort();
        assert_eq!(actual, expected, "{} at iso {}", source.name(), iso);
    }

    /// Bounds, stability, uniqueness and extreme-iso checks
    pub fn assert_resolver_contract(source: &dyn VoxelSource, iso: f32) {
        let active = source.active_voxels(iso);
        let mut unique = active.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), active.len(), "{} reported a cell twice", source.name());

        for &r in &active {
            let voxel = source.voxel(r);
            assert_eq!(source.voxel_bounds(r), voxel.bounds);
            assert_eq!(source.voxel(r), voxel);
            assert!(voxel.straddles(iso), "{} reported inactive cell {:?}", source.name(), r);
        }

        let range = source.value_range();
        assert!(source.active_voxels(range.max + 1.0).is_empty());
        assert!(source.active_voxels(range.min - 1.0).is_empty());
    }
}
