//! Geometry parameters supplied by the host application.
//!
//! Parameters arrive as JSON (or are built in code) and select exactly one
//! voxel source variant. Each variant carries the data only it needs, so the
//! orchestrator never has to inspect a built source to finish initializing it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::{Result, UVec3, Vec3};
use crate::math::aabb::Aabb;
use crate::voxel::octant::OctantSource;
use crate::voxel::source::VoxelSource;
use crate::voxel::structured::{
    create_test_volume, load_raw_as, LogicalVolume, RefinementPolicy, ScalarKind,
    SegmentedVolumeSource, StructuredVolumeSource, Volume, TEST_VOLUME_ISO,
};
use crate::voxel::test_case::{TestAmr, TestOctant, TestVoxel, TEST_AMR_ISO, TEST_OCTANT_ISO, TEST_VOXEL_ISO};

/// Iso value used when neither the parameters nor the variant name one
pub const DEFAULT_ISO_VALUE: f32 = 0.7;

/// Default fine cells per axis for refined segmented cells
pub const DEFAULT_SUBDIVISIONS: u32 = 2;

fn default_subdivisions() -> u32 {
    DEFAULT_SUBDIVISIONS
}

/// Where a scalar grid comes from
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VolumeInput {
    /// Headerless raw file
    Raw {
        path: PathBuf,
        dims: [u32; 3],
        #[serde(default)]
        scalar: ScalarKind,
        /// Substitute the procedural blob volume if the file cannot be loaded
        #[serde(default)]
        fallback_to_test_volume: bool,
    },
    /// Samples supplied directly, x fastest
    Inline { dims: [u32; 3], values: Vec<f32> },
    /// Procedural blob volume
    Test { dims: [u32; 3] },
}

impl VolumeInput {
    pub fn dims(&self) -> UVec3 {
        match self {
            VolumeInput::Raw { dims, .. }
            | VolumeInput::Inline { dims, .. }
            | VolumeInput::Test { dims } => UVec3::from(*dims),
        }
    }

    /// Materialize the grid
    pub fn load(&self) -> Result<Arc<dyn LogicalVolume>> {
        match self {
            VolumeInput::Raw { path, scalar, fallback_to_test_volume, .. } => {
                match load_raw_as(path, self.dims(), *scalar) {
                    Ok(volume) => Ok(volume),
                    Err(err) if *fallback_to_test_volume => {
                        log::warn!("{}; using procedural test volume instead", err);
                        Ok(Arc::new(create_test_volume(self.dims())?))
                    }
                    Err(err) => Err(err),
                }
            }
            VolumeInput::Inline { values, .. } => {
                Ok(Arc::new(Volume::from_values(self.dims(), values.clone())?))
            }
            VolumeInput::Test { .. } => Ok(Arc::new(create_test_volume(self.dims())?)),
        }
    }
}

/// Voxel source selection plus its representation-specific data
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceParams {
    Structured {
        volume: VolumeInput,
        /// Object-space `[min, max]`; unit cube when absent
        #[serde(default)]
        bounds: Option<[[f32; 3]; 2]>,
    },
    Segmented {
        volume: VolumeInput,
        segmentation: VolumeInput,
        #[serde(default = "default_subdivisions")]
        subdivisions: u32,
        #[serde(default)]
        refinement: RefinementPolicy,
    },
    /// Three parallel arrays: `widths` starts with the octant count,
    /// `points` is a flat xyz list, `values` holds 8 corners per octant
    Octant {
        widths: Vec<f32>,
        points: Vec<f32>,
        values: Vec<f32>,
    },
    TestVoxel,
    #[default]
    TestOctant,
    TestAmr,
}

impl SourceParams {
    /// Variant name as it appears in configuration
    pub fn kind_name(&self) -> &'static str {
        match self {
            SourceParams::Structured { .. } => "structured",
            SourceParams::Segmented { .. } => "segmented",
            SourceParams::Octant { .. } => "octant",
            SourceParams::TestVoxel => "test_voxel",
            SourceParams::TestOctant => "test_octant",
            SourceParams::TestAmr => "test_amr",
        }
    }

    /// Iso value that makes the variant's built-in data interesting
    pub fn default_iso_value(&self) -> f32 {
        match self {
            SourceParams::Structured { volume: VolumeInput::Test { .. }, .. } => TEST_VOLUME_ISO,
            SourceParams::TestVoxel => TEST_VOXEL_ISO,
            SourceParams::TestOctant => TEST_OCTANT_ISO,
            SourceParams::TestAmr => TEST_AMR_ISO,
            _ => DEFAULT_ISO_VALUE,
        }
    }

    /// Construct and initialize the selected source
    pub fn build(&self) -> Result<Arc<dyn VoxelSource>> {
        Ok(match self {
            SourceParams::Structured { volume, bounds } => {
                let volume = volume.load()?;
                let bounds = match bounds {
                    Some([min, max]) => Aabb::new(Vec3::from(*min), Vec3::from(*max)),
                    None => Aabb::UNIT,
                };
                Arc::new(StructuredVolumeSource::with_bounds(volume, bounds))
            }
            SourceParams::Segmented { volume, segmentation, subdivisions, refinement } => {
                Arc::new(SegmentedVolumeSource::new(
                    volume.load()?,
                    segmentation.load()?,
                    *subdivisions,
                    *refinement,
                )?)
            }
            SourceParams::Octant { widths, points, values } => {
                let points: &[[f32; 3]] = bytemuck::try_cast_slice(points.as_slice()).map_err(|_| {
                    Error::config(format!(
                        "octant point array length {} is not a multiple of 3",
                        points.len()
                    ))
                })?;
                Arc::new(OctantSource::from_arrays(widths, points, values)?)
            }
            SourceParams::TestVoxel => Arc::new(TestVoxel::new()),
            SourceParams::TestOctant => Arc::new(TestOctant::new()),
            SourceParams::TestAmr => Arc::new(TestAmr::new()),
        })
    }
}

/// Everything a geometry commit reads
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpiParams {
    /// Overrides the variant's default iso value
    #[serde(default)]
    pub iso_value: Option<f32>,
    #[serde(default)]
    pub source: SourceParams,
}

impl ImpiParams {
    pub fn new(source: SourceParams) -> Self {
        Self { iso_value: None, source }
    }

    pub fn with_iso_value(mut self, iso_value: f32) -> Self {
        self.iso_value = Some(iso_value);
        self
    }

    /// Effective iso value
    pub fn iso_value(&self) -> f32 {
        self.iso_value
            .unwrap_or_else(|| self.source.default_iso_value())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read parameters from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_test_octant() {
        let params = ImpiParams::default();
        assert_eq!(params.source, SourceParams::TestOctant);
        assert_eq!(params.iso_value(), TEST_OCTANT_ISO);
    }

    #[test]
    fn test_iso_override() {
        let params = ImpiParams::new(SourceParams::TestAmr).with_iso_value(1.25);
        assert_eq!(params.iso_value(), 1.25);
        assert_eq!(ImpiParams::new(SourceParams::TestAmr).iso_value(), TEST_AMR_ISO);
    }

    #[test]
    fn test_parse_structured_json() {
        let params = ImpiParams::from_json_str(
            r#"{
                "iso_value": 0.5,
                "source": {
                    "kind": "structured",
                    "volume": { "type": "inline", "dims": [2, 2, 2], "values": [0, 0, 0, 0, 1, 1, 1, 1] }
                }
            }"#,
        )
        .expect("valid json");
        assert_eq!(params.iso_value(), 0.5);
        let source = params.source.build().expect("build");
        assert_eq!(source.name(), "structured");
        assert_eq!(source.active_voxels(0.5).len(), 1);
    }

    #[test]
    fn test_parse_segmented_defaults() {
        let params = ImpiParams::from_json_str(
            r#"{ "source": {
                "kind": "segmented",
                "volume": { "type": "test", "dims": [8, 8, 8] },
                "segmentation": { "type": "test", "dims": [8, 8, 8] }
            } }"#,
        )
        .expect("valid json");
        match &params.source {
            SourceParams::Segmented { subdivisions, refinement, .. } => {
                assert_eq!(*subdivisions, DEFAULT_SUBDIVISIONS);
                assert_eq!(*refinement, RefinementPolicy::Tight);
            }
            other => panic!("Expected segmented params, got {:?}", other),
        }
        assert_eq!(params.iso_value(), DEFAULT_ISO_VALUE);
    }

    #[test]
    fn test_octant_points_must_be_xyz_triples() {
        let source = SourceParams::Octant {
            widths: vec![1.0, 1.0],
            points: vec![0.0, 0.0],
            values: vec![0.0; 8],
        };
        assert!(matches!(source.build(), Err(Error::Config(_))));
    }

    #[test]
    fn test_octant_arrays_build() {
        let source = SourceParams::Octant {
            widths: vec![1.0, 2.0],
            points: vec![1.0, 1.0, 1.0],
            values: (0..8).map(|v| v as f32).collect(),
        };
        let source = source.build().expect("build");
        let active = source.active_voxels(3.5);
        assert_eq!(active.len(), 1);
        assert_eq!(source.voxel_bounds(active[0]), Aabb::new(Vec3::ONE, Vec3::splat(3.0)));
    }

    #[test]
    fn test_missing_raw_file() {
        let input = VolumeInput::Raw {
            path: PathBuf::from("/nonexistent/impi/volume.raw"),
            dims: [4, 4, 4],
            scalar: ScalarKind::F32,
            fallback_to_test_volume: false,
        };
        assert!(matches!(input.load(), Err(Error::VolumeLoad { .. })));
    }

    #[test]
    fn test_raw_fallback_is_explicit() {
        let input = VolumeInput::Raw {
            path: PathBuf::from("/nonexistent/impi/volume.raw"),
            dims: [4, 4, 4],
            scalar: ScalarKind::F32,
            fallback_to_test_volume: true,
        };
        let volume = input.load().expect("fallback volume");
        assert_eq!(volume.dims(), UVec3::splat(4));
    }

    #[test]
    fn test_params_file_roundtrip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("impi.json");
        let params = ImpiParams::new(SourceParams::TestVoxel).with_iso_value(30.0);
        std::fs::write(&path, serde_json::to_string_pretty(&params).unwrap()).unwrap();
        assert_eq!(ImpiParams::load(&path).expect("load"), params);
    }
}
