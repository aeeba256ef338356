//! Implicit iso-surface geometry.
//!
//! `Impi` owns a single voxel source for its whole lifetime. The first commit
//! builds the source from the supplied parameters; later commits only update
//! the iso value. Finalize enumerates the active voxels and hands them to the
//! intersection kernel.

use std::sync::Arc;

use crate::core::error::Error;
use crate::core::types::Result;
use crate::geometry::kernel::{IntersectionKernel, VoxelResolver};
use crate::geometry::params::{ImpiParams, DEFAULT_ISO_VALUE};
use crate::math::aabb::Aabb;
use crate::voxel::source::VoxelSource;
use crate::voxel::voxel::VoxelRef;

/// Iso-surface geometry over one voxel source
pub struct Impi {
    source: Option<Arc<dyn VoxelSource>>,
    iso_value: f32,
    /// Iso value of the built variant, used when a commit names none
    default_iso_value: f32,
    active_voxels: Vec<VoxelRef>,
}

impl std::fmt::Debug for Impi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Impi")
            .field("source", &self.source.as_ref().map(|s| s.name()))
            .field("iso_value", &self.iso_value)
            .field("active_voxels", &self.active_voxels.len())
            .finish()
    }
}

impl Default for Impi {
    fn default() -> Self {
        Self::new()
    }
}

impl Impi {
    /// Uncommitted geometry; no data is read until [`Impi::commit`]
    pub fn new() -> Self {
        Self {
            source: None,
            iso_value: DEFAULT_ISO_VALUE,
            default_iso_value: DEFAULT_ISO_VALUE,
            active_voxels: Vec::new(),
        }
    }

    /// Read parameters.
    ///
    /// The voxel source is constructed on the first successful commit and
    /// kept afterwards; every commit refreshes the iso value. Without an
    /// explicit iso value the built variant's default applies, whatever
    /// variant later parameters name. A failed first commit leaves the
    /// geometry uncommitted.
    pub fn commit(&mut self, params: &ImpiParams) -> Result<()> {
        if self.source.is_none() {
            let source = params.source.build()?;
            log::info!(
                "Impi: built {} source ({} cells, value range [{}, {}])",
                source.name(),
                source.cell_count(),
                source.value_range().min,
                source.value_range().max
            );
            self.source = Some(source);
            self.default_iso_value = params.source.default_iso_value();
        } else {
            log::debug!("Impi: source already built, refreshing iso value only");
        }
        self.iso_value = params.iso_value.unwrap_or(self.default_iso_value);
        Ok(())
    }

    /// Enumerate active voxels and hand them to `kernel`.
    ///
    /// Returns the number of active voxels.
    pub fn finalize(&mut self, kernel: &mut dyn IntersectionKernel) -> Result<usize> {
        let source = self.source.as_ref().ok_or(Error::NotCommitted)?;

        let start = std::time::Instant::now();
        source.collect_active_voxels(&mut self.active_voxels, self.iso_value);
        log::info!(
            "Impi: {} active voxels of {} at iso {} in {:.1}ms",
            self.active_voxels.len(),
            source.cell_count(),
            self.iso_value,
            start.elapsed().as_secs_f64() * 1000.0
        );

        kernel.build(
            &self.active_voxels,
            VoxelResolver::new(Arc::clone(source)),
            self.iso_value,
        );
        Ok(self.active_voxels.len())
    }

    pub fn is_committed(&self) -> bool {
        self.source.is_some()
    }

    pub fn iso_value(&self) -> f32 {
        self.iso_value
    }

    pub fn source(&self) -> Option<&Arc<dyn VoxelSource>> {
        self.source.as_ref()
    }

    /// Active voxels of the last finalize
    pub fn active_voxels(&self) -> &[VoxelRef] {
        &self.active_voxels
    }

    /// Resolver for the committed source
    pub fn resolver(&self) -> Option<VoxelResolver> {
        self.source.as_ref().map(|s| VoxelResolver::new(Arc::clone(s)))
    }

    /// Object-space bounds reported before any voxel is resolved
    pub fn bounds(&self) -> Aabb {
        Aabb::UNIT
    }
}
