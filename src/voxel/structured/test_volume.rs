//! Procedural blob volume for running the structured path without data files

use super::volume::Volume;
use crate::core::types::{Result, UVec3, Vec3};

/// Iso value that cuts through the blobs of [`create_test_volume`]
pub const TEST_VOLUME_ISO: f32 = 0.5;

/// (center, radius) of each blob in normalized grid space
const BLOBS: [(Vec3, f32); 4] = [
    (Vec3::new(0.2, 0.1, 0.7), 0.3),
    (Vec3::new(0.3, 0.3, 0.2), 0.2),
    (Vec3::new(0.8, 0.4, 0.9), 0.1),
    (Vec3::new(0.5, 0.5, 0.5), 0.4),
];

/// Linear falloff basis: 1 at `center`, 0 at distance `radius` and beyond
fn blob(pos: Vec3, center: Vec3, radius: f32) -> f32 {
    let dist = pos.distance(center);
    if dist > radius {
        0.0
    } else {
        1.0 - dist / radius
    }
}

/// Sum of the blob field at normalized position `pos`
pub fn blob_field(pos: Vec3) -> f32 {
    BLOBS.iter().map(|&(c, r)| blob(pos, c, r)).sum()
}

/// Sample [`blob_field`] at `idx / (dims - 1)` for every grid position
pub fn create_test_volume(dims: UVec3) -> Result<Volume<f32>> {
    let denom = (dims.max(UVec3::splat(2)) - UVec3::ONE).as_vec3();
    Volume::from_fn(dims, |idx| blob_field(idx.as_vec3() / denom))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::structured::volume::LogicalVolume;

    #[test]
    fn test_blob_peak_and_falloff() {
        assert_eq!(blob(Vec3::ZERO, Vec3::ZERO, 0.5), 1.0);
        assert_eq!(blob(Vec3::ONE, Vec3::ZERO, 0.5), 0.0);
    }

    #[test]
    fn test_volume_crosses_iso() {
        let vol = create_test_volume(UVec3::splat(16)).expect("test volume");
        let range = vol.value_range();
        assert!(range.min < TEST_VOLUME_ISO);
        assert!(range.max > TEST_VOLUME_ISO);
    }
}
