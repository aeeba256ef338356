//! Voxel source over a single uniform grid

use std::sync::Arc;

use rayon::prelude::*;

use super::volume::{grid_position, linear_index, LogicalVolume};
use crate::core::types::UVec3;
use crate::math::aabb::Aabb;
use crate::voxel::range::ValueRange;
use crate::voxel::source::VoxelSource;
use crate::voxel::voxel::{Voxel, VoxelRef};

/// Uniform structured grid source.
///
/// A [`VoxelRef`] is the linear sample index of the cell's minimum corner.
/// The grid spans `object_bounds` (the unit cube unless configured):
/// sample `idx` sits at `idx / (dims - 1)` mapped into that box.
pub struct StructuredVolumeSource {
    volume: Arc<dyn LogicalVolume>,
    object_bounds: Aabb,
}

impl StructuredVolumeSource {
    /// Source spanning the unit cube
    pub fn new(volume: Arc<dyn LogicalVolume>) -> Self {
        Self::with_bounds(volume, Aabb::UNIT)
    }

    /// Source spanning `object_bounds`
    pub fn with_bounds(volume: Arc<dyn LogicalVolume>, object_bounds: Aabb) -> Self {
        let dims = volume.dims();
        log::debug!(
            "Structured source: {}x{}x{} samples, range {:?}",
            dims.x,
            dims.y,
            dims.z,
            volume.value_range()
        );
        Self { volume, object_bounds }
    }

    pub fn volume(&self) -> &Arc<dyn LogicalVolume> {
        &self.volume
    }

    /// Object-space bounds of the cell whose minimum corner is `cell`
    pub fn cell_bounds(&self, cell: UVec3) -> Aabb {
        let denom = self.volume.cell_dims().as_vec3();
        self.object_bounds
            .sub_box(cell.as_vec3() / denom, (cell + UVec3::ONE).as_vec3() / denom)
    }

    /// Reference for the cell whose minimum corner is `cell`
    pub fn cell_ref(&self, cell: UVec3) -> VoxelRef {
        debug_assert!(cell.cmplt(self.volume.cell_dims()).all());
        VoxelRef(linear_index(self.volume.dims(), cell) as u64)
    }

    fn decode(&self, voxel_ref: VoxelRef) -> UVec3 {
        let dims = self.volume.dims();
        let cell = grid_position(dims, voxel_ref.0 as usize);
        assert!(
            (voxel_ref.0 as usize) < dims.x as usize * dims.y as usize * dims.z as usize
                && cell.cmplt(self.volume.cell_dims()).all(),
            "voxel ref {:?} was not produced by this structured source",
            voxel_ref
        );
        cell
    }

    /// Active cells restricted to the inclusive cell box `[lo, hi]`.
    ///
    /// `hi` is clamped to the last cell; an empty box yields no cells.
    pub fn active_voxels_in(&self, lo: UVec3, hi: UVec3, iso_value: f32) -> Vec<VoxelRef> {
        let cell_dims = self.volume.cell_dims();
        let hi = hi.min(cell_dims - UVec3::ONE);
        if lo.cmpgt(hi).any() || !self.volume.value_range().contains(iso_value) {
            return Vec::new();
        }

        let volume = &self.volume;
        (lo.z..=hi.z)
            .into_par_iter()
            .flat_map_iter(|z| {
                let mut slab = Vec::new();
                for y in lo.y..=hi.y {
                    for x in lo.x..=hi.x {
                        let cell = UVec3::new(x, y, z);
                        let corners = volume.cell_corners(cell);
                        if ValueRange::from_values(&corners).contains(iso_value) {
                            slab.push(VoxelRef(linear_index(volume.dims(), cell) as u64));
                        }
                    }
                }
                slab
            })
            .collect()
    }
}

impl VoxelSource for StructuredVolumeSource {
    fn active_voxels(&self, iso_value: f32) -> Vec<VoxelRef> {
        let last = self.volume.cell_dims() - UVec3::ONE;
        let active = self.active_voxels_in(UVec3::ZERO, last, iso_value);
        log::debug!(
            "Structured scan: {} of {} cells active at iso {}",
            active.len(),
            self.cell_count(),
            iso_value
        );
        active
    }

    fn voxel_bounds(&self, voxel_ref: VoxelRef) -> Aabb {
        self.cell_bounds(self.decode(voxel_ref))
    }

    fn voxel(&self, voxel_ref: VoxelRef) -> Voxel {
        let cell = self.decode(voxel_ref);
        Voxel::new(self.cell_bounds(cell), self.volume.cell_corners(cell))
    }

    fn value_range(&self) -> ValueRange {
        self.volume.value_range()
    }

    fn cell_count(&self) -> usize {
        let c = self.volume.cell_dims();
        c.x as usize * c.y as usize * c.z as usize
    }

    fn name(&self) -> &'static str {
        "structured"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Vec3;
    use crate::voxel::source::contract;
    use crate::voxel::structured::test_volume::{create_test_volume, TEST_VOLUME_ISO};
    use crate::voxel::structured::volume::Volume;

    fn single_cell() -> StructuredVolumeSource {
        let values = vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let vol = Volume::from_values(UVec3::splat(2), values).unwrap();
        StructuredVolumeSource::new(Arc::new(vol))
    }

    fn all_refs(source: &StructuredVolumeSource) -> Vec<VoxelRef> {
        let c = source.volume().cell_dims();
        let mut refs = Vec::new();
        for z in 0..c.z {
            for y in 0..c.y {
                for x in 0..c.x {
                    refs.push(source.cell_ref(UVec3::new(x, y, z)));
                }
            }
        }
        refs
    }

    #[test]
    fn test_single_cell_end_to_end() {
        let source = single_cell();
        let active = source.active_voxels(0.5);
        assert_eq!(active.len(), 1);

        let voxel = source.voxel(active[0]);
        assert_eq!(voxel.bounds, Aabb::UNIT);
        assert_eq!(voxel.vertex_values, [0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_out_of_range_iso_is_empty() {
        let source = single_cell();
        assert!(source.active_voxels(1.5).is_empty());
        assert!(source.active_voxels(-0.5).is_empty());
        assert!(source.active_voxels(f32::NAN).is_empty());
    }

    #[test]
    fn test_cell_bounds_normalized() {
        let vol = Volume::from_fn(UVec3::new(5, 3, 2), |p| p.x as f32).unwrap();
        let source = StructuredVolumeSource::new(Arc::new(vol));
        let bounds = source.cell_bounds(UVec3::new(3, 1, 0));
        assert_eq!(bounds.min, Vec3::new(0.75, 0.5, 0.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_object_bounds_transform() {
        let vol = Volume::from_fn(UVec3::splat(3), |p| p.z as f32).unwrap();
        let world = Aabb::new(Vec3::splat(-2.0), Vec3::splat(2.0));
        let source = StructuredVolumeSource::with_bounds(Arc::new(vol), world);
        let bounds = source.voxel_bounds(source.cell_ref(UVec3::ONE));
        assert_eq!(bounds, Aabb::new(Vec3::ZERO, Vec3::splat(2.0)));
    }

    #[test]
    fn test_matches_brute_force() {
        let vol = create_test_volume(UVec3::splat(12)).unwrap();
        let source = StructuredVolumeSource::new(Arc::new(vol));
        let refs = all_refs(&source);
        for iso in [0.1, TEST_VOLUME_ISO, 0.8] {
            contract::assert_exact(&source, &refs, iso);
        }
        contract::assert_resolver_contract(&source, TEST_VOLUME_ISO);
    }

    #[test]
    fn test_boundary_cells_included() {
        // Field rises along x only in the last cell column
        let vol = Volume::from_fn(UVec3::splat(4), |p| if p.x == 3 { 1.0 } else { 0.0 }).unwrap();
        let source = StructuredVolumeSource::new(Arc::new(vol));
        let active = source.active_voxels(0.5);
        assert_eq!(active.len(), 9);
        for r in active {
            assert_eq!(source.voxel_bounds(r).max.x, 1.0);
        }
    }

    #[test]
    fn test_active_voxels_in_subrange() {
        let vol = Volume::from_fn(UVec3::splat(4), |p| p.x as f32).unwrap();
        let source = StructuredVolumeSource::new(Arc::new(vol));
        let sub = source.active_voxels_in(UVec3::ZERO, UVec3::new(2, 0, 0), 1.5);
        assert_eq!(sub, vec![source.cell_ref(UVec3::new(1, 0, 0))]);
        assert!(source.active_voxels_in(UVec3::ONE, UVec3::ZERO, 1.5).is_empty());
    }

    #[test]
    #[should_panic(expected = "not produced by this structured source")]
    fn test_foreign_ref_panics() {
        let source = single_cell();
        source.voxel(VoxelRef(1));
    }
}
