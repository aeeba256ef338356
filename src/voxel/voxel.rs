//! Voxel entity types shared by every source and the intersection kernel

use bytemuck::{Pod, Zeroable};

use crate::core::types::Vec3;
use crate::math::aabb::Aabb;
use crate::voxel::range::ValueRange;

/// Number of corners of a trilinear cell
pub const CORNER_COUNT: usize = 8;

/// Corner code for the cell corner at offset `(x, y, z)`, each 0 or 1.
///
/// Every source and the intersection kernel agree on `x + 2y + 4z`.
#[inline]
pub const fn corner_index(x: usize, y: usize, z: usize) -> usize {
    x | (y << 1) | (z << 2)
}

/// Unit offset of corner `index` (inverse of [`corner_index`])
#[inline]
pub fn corner_offset(index: usize) -> Vec3 {
    debug_assert!(index < CORNER_COUNT);
    Vec3::new(
        (index & 1) as f32,
        ((index >> 1) & 1) as f32,
        ((index >> 2) & 1) as f32,
    )
}

/// Trilinear interpolation of 8 corner values at local position `t` in `[0,1]^3`
pub fn trilinear(values: &[f32; CORNER_COUNT], t: Vec3) -> f32 {
    let x00 = values[0] + (values[1] - values[0]) * t.x;
    let x10 = values[2] + (values[3] - values[2]) * t.x;
    let x01 = values[4] + (values[5] - values[4]) * t.x;
    let x11 = values[6] + (values[7] - values[6]) * t.x;
    let y0 = x00 + (x10 - x00) * t.y;
    let y1 = x01 + (x11 - x01) * t.y;
    y0 + (y1 - y0) * t.z
}

/// Opaque reference to one cell of a voxel source.
///
/// The bit layout is private to the source that produced it; a reference is
/// only ever resolved by that same source. `Pod` so a reference list can be
/// handed to a kernel as a plain `&[u64]`.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable)]
pub struct VoxelRef(pub u64);

impl VoxelRef {
    /// Raw 64-bit key
    pub fn raw(self) -> u64 {
        self.0
    }

    /// View a reference list as raw keys
    pub fn as_raw_slice(refs: &[VoxelRef]) -> &[u64] {
        bytemuck::cast_slice(refs)
    }
}

impl From<u64> for VoxelRef {
    fn from(raw: u64) -> Self {
        VoxelRef(raw)
    }
}

/// Self-contained description of one trilinear cell
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Voxel {
    /// Object-space extent of the cell
    pub bounds: Aabb,
    /// Corner samples indexed by [`corner_index`]
    pub vertex_values: [f32; CORNER_COUNT],
}

impl Voxel {
    pub fn new(bounds: Aabb, vertex_values: [f32; CORNER_COUNT]) -> Self {
        Self { bounds, vertex_values }
    }

    /// Value at corner `(x, y, z)`, each 0 or 1
    pub fn corner_value(&self, x: usize, y: usize, z: usize) -> f32 {
        self.vertex_values[corner_index(x, y, z)]
    }

    /// Min/max over the 8 corners
    pub fn value_range(&self) -> ValueRange {
        ValueRange::from_values(&self.vertex_values)
    }

    /// True if the cell's corner range contains `iso_value`
    pub fn straddles(&self, iso_value: f32) -> bool {
        self.value_range().contains(iso_value)
    }

    /// Interpolated field value at a point inside the cell
    pub fn sample(&self, pos: Vec3) -> f32 {
        let t = (pos - self.bounds.min) / self.bounds.size();
        trilinear(&self.vertex_values, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corner_index_ordering() {
        assert_eq!(corner_index(0, 0, 0), 0);
        assert_eq!(corner_index(1, 0, 0), 1);
        assert_eq!(corner_index(0, 1, 0), 2);
        assert_eq!(corner_index(0, 0, 1), 4);
        assert_eq!(corner_index(1, 1, 1), 7);
        for i in 0..CORNER_COUNT {
            let o = corner_offset(i);
            assert_eq!(corner_index(o.x as usize, o.y as usize, o.z as usize), i);
        }
    }

    #[test]
    fn test_trilinear_hits_corners() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        for i in 0..CORNER_COUNT {
            assert_eq!(trilinear(&values, corner_offset(i)), values[i]);
        }
        assert_eq!(trilinear(&values, Vec3::splat(0.5)), 3.5);
    }

    #[test]
    fn test_voxel_ref_is_u64_sized() {
        assert_eq!(std::mem::size_of::<VoxelRef>(), 8);
        let refs = [VoxelRef(3), VoxelRef(9)];
        assert_eq!(VoxelRef::as_raw_slice(&refs), &[3, 9]);
    }

    #[test]
    fn test_voxel_straddles() {
        let voxel = Voxel::new(Aabb::UNIT, [0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]);
        assert!(voxel.straddles(0.5));
        assert!(voxel.straddles(1.0));
        assert!(!voxel.straddles(1.5));
        assert_eq!(voxel.corner_value(0, 0, 1), 1.0);
        assert_eq!(voxel.sample(Vec3::new(0.3, 0.7, 0.25)), 0.25);
    }
}
