//! Hand-off to the intersection kernel.
//!
//! The kernel that builds and intersects bilinear-patch primitives lives
//! outside this crate. It receives the active reference list once and pulls
//! per-voxel data lazily through a [`VoxelResolver`].

use std::sync::Arc;

use rayon::prelude::*;

use crate::math::aabb::Aabb;
use crate::voxel::source::VoxelSource;
use crate::voxel::voxel::{Voxel, VoxelRef};

/// Clonable handle that resolves references against the source that made them
#[derive(Clone)]
pub struct VoxelResolver {
    source: Arc<dyn VoxelSource>,
}

impl std::fmt::Debug for VoxelResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoxelResolver")
            .field("source", &self.source.name())
            .finish()
    }
}

impl VoxelResolver {
    pub fn new(source: Arc<dyn VoxelSource>) -> Self {
        Self { source }
    }

    /// Bounds of `voxel_ref`
    pub fn bounds(&self, voxel_ref: VoxelRef) -> Aabb {
        self.source.voxel_bounds(voxel_ref)
    }

    /// Bounds and corner values of `voxel_ref`
    pub fn voxel(&self, voxel_ref: VoxelRef) -> Voxel {
        self.source.voxel(voxel_ref)
    }

    pub fn source(&self) -> &Arc<dyn VoxelSource> {
        &self.source
    }
}

/// Consumer of the active voxel list
pub trait IntersectionKernel {
    /// Build primitives for `voxel_refs`, resolving them through `resolver`
    /// as needed. Called once per geometry finalize.
    fn build(&mut self, voxel_refs: &[VoxelRef], resolver: VoxelResolver, iso_value: f32);
}

/// Kernel that resolves every reference up front.
///
/// Does no intersection work; used by the CLI, benches and tests to inspect
/// what a real kernel would receive.
#[derive(Debug, Default)]
pub struct VoxelCollector {
    pub refs: Vec<VoxelRef>,
    pub voxels: Vec<Voxel>,
    /// Union of all resolved voxel bounds, `None` if nothing was active
    pub bounds: Option<Aabb>,
    pub iso_value: f32,
    /// Number of `build` calls received
    pub builds: usize,
}

impl IntersectionKernel for VoxelCollector {
    fn build(&mut self, voxel_refs: &[VoxelRef], resolver: VoxelResolver, iso_value: f32) {
        self.refs = voxel_refs.to_vec();
        self.voxels = voxel_refs.par_iter().map(|&r| resolver.voxel(r)).collect();
        self.bounds = self
            .voxels
            .iter()
            .map(|v| v.bounds)
            .reduce(|a, b| a.merged(&b));
        self.iso_value = iso_value;
        self.builds += 1;
    }
}
