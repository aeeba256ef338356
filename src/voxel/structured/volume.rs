//! Dense scalar grids backing the structured sources

use bytemuck::Pod;

use crate::core::error::Error;
use crate::core::types::{Result, UVec3};
use crate::voxel::range::ValueRange;
use crate::voxel::voxel::{corner_index, CORNER_COUNT};

/// Scalar sample types a raw volume may be stored as
pub trait Scalar: Pod + Send + Sync + 'static {
    fn to_f32(self) -> f32;
}

impl Scalar for f32 {
    fn to_f32(self) -> f32 {
        self
    }
}

impl Scalar for f64 {
    fn to_f32(self) -> f32 {
        self as f32
    }
}

impl Scalar for u8 {
    fn to_f32(self) -> f32 {
        self as f32
    }
}

impl Scalar for u16 {
    fn to_f32(self) -> f32 {
        self as f32
    }
}

/// Type-erased view of a vertex-centred scalar grid.
///
/// Sample `(x, y, z)` lives at linear index `x + nx * (y + ny * z)`.
pub trait LogicalVolume: Send + Sync {
    /// Number of samples per axis
    fn dims(&self) -> UVec3;

    /// Sample at grid position `idx`
    fn value(&self, idx: UVec3) -> f32;

    /// Range of all samples
    fn value_range(&self) -> ValueRange;

    /// The 8 samples of the cell whose minimum corner is `cell`
    fn cell_corners(&self, cell: UVec3) -> [f32; CORNER_COUNT] {
        let mut corners = [0.0; CORNER_COUNT];
        for z in 0..2 {
            for y in 0..2 {
                for x in 0..2 {
                    corners[corner_index(x, y, z)] =
                        self.value(cell + UVec3::new(x as u32, y as u32, z as u32));
                }
            }
        }
        corners
    }

    /// Number of cells per axis
    fn cell_dims(&self) -> UVec3 {
        self.dims() - UVec3::ONE
    }
}

/// Linear sample index of `idx` in a grid of `dims`
#[inline]
pub fn linear_index(dims: UVec3, idx: UVec3) -> usize {
    idx.x as usize + dims.x as usize * (idx.y as usize + dims.y as usize * idx.z as usize)
}

/// Inverse of [`linear_index`]
#[inline]
pub fn grid_position(dims: UVec3, linear: usize) -> UVec3 {
    let nx = dims.x as usize;
    let ny = dims.y as usize;
    UVec3::new(
        (linear % nx) as u32,
        ((linear / nx) % ny) as u32,
        (linear / (nx * ny)) as u32,
    )
}

/// Total samples in a grid of `dims`.
///
/// Fails with [`Error::Config`] if the count does not fit in `usize`.
pub fn sample_count(dims: UVec3) -> Result<usize> {
    (dims.x as usize)
        .checked_mul(dims.y as usize)
        .and_then(|n| n.checked_mul(dims.z as usize))
        .ok_or_else(|| Error::config(format!("volume dims {:?} are too large", dims)))
}

/// Dense grid of `T` samples
#[derive(Clone, Debug)]
pub struct Volume<T: Scalar> {
    dims: UVec3,
    values: Vec<T>,
    range: ValueRange,
}

impl<T: Scalar> Volume<T> {
    /// Wrap existing samples.
    ///
    /// Every axis needs at least 2 samples (one cell) and `values` must hold
    /// exactly `dims.x * dims.y * dims.z` samples.
    pub fn from_values(dims: UVec3, values: Vec<T>) -> Result<Self> {
        if dims.cmplt(UVec3::splat(2)).any() {
            return Err(Error::config(format!(
                "volume dims {:?} need at least 2 samples per axis",
                dims
            )));
        }
        let expected = sample_count(dims)?;
        if values.len() != expected {
            return Err(Error::config(format!(
                "volume dims {:?} need {} samples, got {}",
                dims,
                expected,
                values.len()
            )));
        }
        let range = values
            .iter()
            .fold(ValueRange::EMPTY, |r, v| r.including(v.to_f32()));
        Ok(Self { dims, values, range })
    }

    /// Build a volume by evaluating `f` at every grid position
    pub fn from_fn(dims: UVec3, mut f: impl FnMut(UVec3) -> T) -> Result<Self> {
        let values = (0..sample_count(dims)?)
            .map(|i| f(grid_position(dims, i)))
            .collect();
        Self::from_values(dims, values)
    }

    /// Raw samples in x-fastest order
    pub fn values(&self) -> &[T] {
        &self.values
    }
}

impl<T: Scalar> LogicalVolume for Volume<T> {
    fn dims(&self) -> UVec3 {
        self.dims
    }

    #[inline]
    fn value(&self, idx: UVec3) -> f32 {
        self.values[linear_index(self.dims, idx)].to_f32()
    }

    fn value_range(&self) -> ValueRange {
        self.range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_index_roundtrip() {
        let dims = UVec3::new(3, 4, 5);
        let idx = UVec3::new(2, 1, 3);
        let linear = linear_index(dims, idx);
        assert_eq!(linear, 2 + 3 * (1 + 4 * 3));
        assert_eq!(grid_position(dims, linear), idx);
    }

    #[test]
    fn test_rejects_bad_dims() {
        assert!(Volume::<f32>::from_values(UVec3::new(1, 2, 2), vec![0.0; 4]).is_err());
        assert!(Volume::<f32>::from_values(UVec3::splat(2), vec![0.0; 7]).is_err());
    }

    #[test]
    fn test_rejects_overflowing_dims() {
        let dims = UVec3::splat(1 << 22);
        assert!(matches!(sample_count(dims), Err(Error::Config(_))));
        assert!(matches!(
            Volume::<f32>::from_values(dims, Vec::new()),
            Err(Error::Config(_))
        ));
        assert!(Volume::<u8>::from_fn(dims, |_| 0).is_err());
        assert_eq!(sample_count(UVec3::new(3, 4, 5)).unwrap(), 60);
    }

    #[test]
    fn test_cell_corners_ordering() {
        let vol = Volume::from_fn(UVec3::splat(3), |p| (p.x + 10 * p.y + 100 * p.z) as u16)
            .unwrap();
        let corners = vol.cell_corners(UVec3::new(1, 0, 1));
        assert_eq!(corners[corner_index(0, 0, 0)], 101.0);
        assert_eq!(corners[corner_index(1, 0, 0)], 102.0);
        assert_eq!(corners[corner_index(0, 1, 0)], 111.0);
        assert_eq!(corners[corner_index(0, 0, 1)], 201.0);
        assert_eq!(corners[corner_index(1, 1, 1)], 212.0);
    }

    #[test]
    fn test_value_range() {
        let vol = Volume::from_values(UVec3::splat(2), vec![3u8, 1, 4, 1, 5, 9, 2, 6]).unwrap();
        assert_eq!(vol.value_range(), ValueRange::new(1.0, 9.0));
        assert_eq!(vol.cell_dims(), UVec3::ONE);
    }
}
