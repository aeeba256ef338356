//! Raw volume file loading
//!
//! A raw volume is a headerless dump of `dims.x * dims.y * dims.z` samples in
//! native byte order, x fastest.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::volume::{sample_count, LogicalVolume, Scalar, Volume};
use crate::core::error::Error;
use crate::core::types::{Result, UVec3};

/// Sample type stored in a raw file
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    #[default]
    F32,
    F64,
    U8,
    U16,
}

impl ScalarKind {
    /// Bytes per sample
    pub fn size(self) -> usize {
        match self {
            ScalarKind::F32 => 4,
            ScalarKind::F64 => 8,
            ScalarKind::U8 => 1,
            ScalarKind::U16 => 2,
        }
    }
}

/// Load a raw volume of `T` samples.
///
/// Fails with [`Error::Config`] if `dims` overflow, with
/// [`Error::VolumeLoad`] if the file cannot be read and with
/// [`Error::ShortRead`] if it holds fewer bytes than `dims` requires.
/// Trailing bytes are ignored.
pub fn load_raw<T: Scalar>(path: &Path, dims: UVec3) -> Result<Volume<T>> {
    let stride = std::mem::size_of::<T>();
    let expected = sample_count(dims)?
        .checked_mul(stride)
        .ok_or_else(|| Error::config(format!("volume dims {:?} are too large", dims)))?;

    let bytes = std::fs::read(path).map_err(|source| Error::VolumeLoad {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.len() < expected {
        return Err(Error::ShortRead {
            path: path.to_path_buf(),
            expected,
            actual: bytes.len(),
        });
    }

    let values: Vec<T> = bytes[..expected]
        .chunks_exact(stride)
        .map(bytemuck::pod_read_unaligned::<T>)
        .collect();

    log::info!(
        "Loaded raw volume '{}' ({}x{}x{}, {} bytes)",
        path.display(),
        dims.x,
        dims.y,
        dims.z,
        expected
    );

    Volume::from_values(dims, values)
}

/// Load a raw volume whose sample type is only known at run time
pub fn load_raw_as(path: &Path, dims: UVec3, kind: ScalarKind) -> Result<Arc<dyn LogicalVolume>> {
    Ok(match kind {
        ScalarKind::F32 => Arc::new(load_raw::<f32>(path, dims)?),
        ScalarKind::F64 => Arc::new(load_raw::<f64>(path, dims)?),
        ScalarKind::U8 => Arc::new(load_raw::<u8>(path, dims)?),
        ScalarKind::U16 => Arc::new(load_raw::<u16>(path, dims)?),
    })
}
