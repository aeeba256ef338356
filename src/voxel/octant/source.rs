//! Data-driven octant source.
//!
//! Octants are an explicit list, not a grid, so a [`VoxelRef`] is simply the
//! octant's index in that list. Octants of equal width are grouped into
//! levels; a level whose value range misses the iso value is skipped whole.

use crate::core::error::Error;
use crate::core::types::{Result, Vec3};
use crate::math::aabb::Aabb;
use crate::voxel::octant::Octant;
use crate::voxel::range::ValueRange;
use crate::voxel::source::VoxelSource;
use crate::voxel::voxel::{Voxel, VoxelRef, CORNER_COUNT};

/// Octants sharing one width
#[derive(Clone, Debug)]
struct OctantLevel {
    width: f32,
    range: ValueRange,
    members: Vec<u32>,
}

/// Voxel source over a heterogeneous-width octant list
#[derive(Clone, Debug)]
pub struct OctantSource {
    octants: Vec<Octant>,
    /// Coarsest first
    levels: Vec<OctantLevel>,
    range: ValueRange,
}

impl OctantSource {
    /// Build from a ready octant list
    pub fn new(octants: Vec<Octant>) -> Self {
        let mut levels: Vec<OctantLevel> = Vec::new();
        for (i, octant) in octants.iter().enumerate() {
            let slot = match levels.iter().position(|l| l.width == octant.width) {
                Some(slot) => slot,
                None => {
                    levels.push(OctantLevel {
                        width: octant.width,
                        range: ValueRange::EMPTY,
                        members: Vec::new(),
                    });
                    levels.len() - 1
                }
            };
            let level = &mut levels[slot];
            level.range = level.range.merged(octant.value_range());
            level.members.push(i as u32);
        }
        levels.sort_by(|a, b| b.width.total_cmp(&a.width));

        let range = levels
            .iter()
            .fold(ValueRange::EMPTY, |r, l| r.merged(l.range));

        log::debug!(
            "Octant source: {} octants in {} levels, range {:?}",
            octants.len(),
            levels.len(),
            range
        );

        Self { octants, levels, range }
    }

    /// Build from three parallel arrays.
    ///
    /// - `widths`: the octant count `n` followed by `n` edge lengths
    /// - `points`: at least `n` lower-corner positions
    /// - `values`: at least `8n` corner values, `x + 2y + 4z` order per octant
    pub fn from_arrays(widths: &[f32], points: &[[f32; 3]], values: &[f32]) -> Result<Self> {
        let (&count, widths) = widths
            .split_first()
            .ok_or_else(|| Error::config("octant width array is empty"))?;
        if !(count >= 0.0 && count.fract() == 0.0) {
            return Err(Error::config(format!("invalid octant count {}", count)));
        }
        let count = count as usize;

        if widths.len() < count {
            return Err(Error::config(format!(
                "octant width array holds {} widths, count says {}",
                widths.len(),
                count
            )));
        }
        if points.len() < count {
            return Err(Error::config(format!(
                "octant point array holds {} points, need {}",
                points.len(),
                count
            )));
        }
        if values.len() < count * CORNER_COUNT {
            return Err(Error::config(format!(
                "octant value array holds {} values, need {}",
                values.len(),
                count * CORNER_COUNT
            )));
        }

        let octants = widths[..count]
            .iter()
            .zip(points)
            .zip(values.chunks_exact(CORNER_COUNT))
            .enumerate()
            .map(|(i, ((&width, &point), corners))| {
                if !(width > 0.0 && width.is_finite()) {
                    return Err(Error::config(format!("octant {} has width {}", i, width)));
                }
                let mut vertex_values = [0.0; CORNER_COUNT];
                vertex_values.copy_from_slice(corners);
                Ok(Octant::new(Vec3::from(point), width, vertex_values))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(octants))
    }

    pub fn octants(&self) -> &[Octant] {
        &self.octants
    }

    /// Number of distinct widths
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Reference for the octant at `index`
    pub fn octant_ref(&self, index: usize) -> VoxelRef {
        debug_assert!(index < self.octants.len());
        VoxelRef(index as u64)
    }

    fn octant(&self, voxel_ref: VoxelRef) -> &Octant {
        match self.octants.get(voxel_ref.0 as usize) {
            Some(octant) => octant,
            None => panic!(
                "voxel ref {:?} was not produced by this octant source ({} octants)",
                voxel_ref,
                self.octants.len()
            ),
        }
    }
}

impl VoxelSource for OctantSource {
    fn active_voxels(&self, iso_value: f32) -> Vec<VoxelRef> {
        let mut active = Vec::new();
        for level in &self.levels {
            if !level.range.contains(iso_value) {
                continue;
            }
            active.extend(
                level
                    .members
                    .iter()
                    .filter(|&&i| self.octants[i as usize].value_range().contains(iso_value))
                    .map(|&i| VoxelRef(i as u64)),
            );
        }
        log::debug!(
            "Octant scan: {} of {} octants active at iso {}",
            active.len(),
            self.octants.len(),
            iso_value
        );
        active
    }

    fn voxel_bounds(&self, voxel_ref: VoxelRef) -> Aabb {
        self.octant(voxel_ref).bounds
    }

    fn voxel(&self, voxel_ref: VoxelRef) -> Voxel {
        self.octant(voxel_ref).to_voxel()
    }

    fn value_range(&self) -> ValueRange {
        self.range
    }

    fn cell_count(&self) -> usize {
        self.octants.len()
    }

    fn name(&self) -> &'static str {
        "octant"
    }
}
