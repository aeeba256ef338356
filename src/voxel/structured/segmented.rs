//! Structured grid with a co-registered segmentation grid.
//!
//! Cells that sit on a segment boundary are split into a finer virtual grid of
//! `subdivisions^3` sub-cells whose corner values are trilinear interpolants
//! of the coarse corners. Interior cells stay coarse.
//!
//! Reference layout:
//! - bits 0..40: linear sample index of the coarse cell's minimum corner
//! - bits 40..61: fine sub-cell coordinates, 7 bits per axis (x lowest)
//! - bit 63: set for fine references

use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::volume::{grid_position, linear_index, LogicalVolume};
use crate::core::error::Error;
use crate::core::types::{Result, UVec3, Vec3};
use crate::math::aabb::Aabb;
use crate::voxel::range::ValueRange;
use crate::voxel::source::VoxelSource;
use crate::voxel::voxel::{corner_index, corner_offset, trilinear, Voxel, VoxelRef, CORNER_COUNT};

/// Largest supported fine cells per axis (7 bits in the reference)
pub const MAX_SUBDIVISIONS: u32 = 128;

const COARSE_BITS: u32 = 40;
const COARSE_MASK: u64 = (1 << COARSE_BITS) - 1;
const FINE_AXIS_BITS: u32 = 7;
const FINE_AXIS_MASK: u64 = (1 << FINE_AXIS_BITS) - 1;
const REFINED_FLAG: u64 = 1 << 63;

/// Decides which coarse cells sit on a segment boundary
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefinementPolicy {
    /// Refine when the cell's 8 corner labels are not all equal
    #[default]
    Tight,
    /// Refine when any label in the cell's one-sample-wide neighborhood
    /// (clamped to the grid) differs from the minimum-corner label
    Loose,
}

/// Decoded segmented reference
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SegmentedRef {
    Coarse { cell: usize },
    Fine { cell: usize, sub: UVec3 },
}

impl SegmentedRef {
    fn encode(self) -> VoxelRef {
        match self {
            SegmentedRef::Coarse { cell } => VoxelRef(cell as u64),
            SegmentedRef::Fine { cell, sub } => {
                let fine = sub.x as u64
                    | (sub.y as u64) << FINE_AXIS_BITS
                    | (sub.z as u64) << (2 * FINE_AXIS_BITS);
                VoxelRef(REFINED_FLAG | fine << COARSE_BITS | cell as u64)
            }
        }
    }

    fn decode(voxel_ref: VoxelRef) -> Self {
        let raw = voxel_ref.0;
        let cell = (raw & COARSE_MASK) as usize;
        if raw & REFINED_FLAG == 0 {
            return SegmentedRef::Coarse { cell };
        }
        let fine = (raw & !REFINED_FLAG) >> COARSE_BITS;
        let sub = UVec3::new(
            (fine & FINE_AXIS_MASK) as u32,
            ((fine >> FINE_AXIS_BITS) & FINE_AXIS_MASK) as u32,
            ((fine >> (2 * FINE_AXIS_BITS)) & FINE_AXIS_MASK) as u32,
        );
        SegmentedRef::Fine { cell, sub }
    }
}

/// Segmented structured grid source
pub struct SegmentedVolumeSource {
    volume: Arc<dyn LogicalVolume>,
    segmentation: Arc<dyn LogicalVolume>,
    subdivisions: u32,
    policy: RefinementPolicy,
    object_bounds: Aabb,
}

impl SegmentedVolumeSource {
    /// Build a source over the unit cube.
    ///
    /// `segmentation` must have the same dims as `volume`; `subdivisions`
    /// must lie in `1..=MAX_SUBDIVISIONS`.
    pub fn new(
        volume: Arc<dyn LogicalVolume>,
        segmentation: Arc<dyn LogicalVolume>,
        subdivisions: u32,
        policy: RefinementPolicy,
    ) -> Result<Self> {
        if volume.dims() != segmentation.dims() {
            return Err(Error::config(format!(
                "segmentation dims {:?} do not match volume dims {:?}",
                segmentation.dims(),
                volume.dims()
            )));
        }
        if !(1..=MAX_SUBDIVISIONS).contains(&subdivisions) {
            return Err(Error::config(format!(
                "segmented subdivisions must be in 1..={}, got {}",
                MAX_SUBDIVISIONS, subdivisions
            )));
        }
        let samples = volume.dims();
        if (samples.x as u64) * (samples.y as u64) * (samples.z as u64) > COARSE_MASK {
            return Err(Error::config("segmented volume too large for 40-bit cell index"));
        }
        Ok(Self {
            volume,
            segmentation,
            subdivisions,
            policy,
            object_bounds: Aabb::UNIT,
        })
    }

    /// Map the grid into `object_bounds` instead of the unit cube
    pub fn with_bounds(mut self, object_bounds: Aabb) -> Self {
        self.object_bounds = object_bounds;
        self
    }

    pub fn subdivisions(&self) -> u32 {
        self.subdivisions
    }

    pub fn policy(&self) -> RefinementPolicy {
        self.policy
    }

    /// Whether the refinement policy splits the coarse cell at `cell`
    pub fn refines_cell(&self, cell: UVec3) -> bool {
        if self.subdivisions == 1 {
            return false;
        }
        match self.policy {
            RefinementPolicy::Tight => {
                let labels = self.segmentation.cell_corners(cell);
                labels.iter().any(|&l| l != labels[0])
            }
            RefinementPolicy::Loose => {
                let last = self.segmentation.dims() - UVec3::ONE;
                let lo = cell.max(UVec3::ONE) - UVec3::ONE;
                let hi = (cell + UVec3::splat(2)).min(last);
                let label = self.segmentation.value(cell);
                for z in lo.z..=hi.z {
                    for y in lo.y..=hi.y {
                        for x in lo.x..=hi.x {
                            if self.segmentation.value(UVec3::new(x, y, z)) != label {
                                return true;
                            }
                        }
                    }
                }
                false
            }
        }
    }

    /// Object-space bounds of the coarse cell at `cell`
    pub fn cell_bounds(&self, cell: UVec3) -> Aabb {
        let denom = self.volume.cell_dims().as_vec3();
        self.object_bounds
            .sub_box(cell.as_vec3() / denom, (cell + UVec3::ONE).as_vec3() / denom)
    }

    fn fine_bounds(&self, coarse: &Aabb, sub: UVec3) -> Aabb {
        let n = self.subdivisions as f32;
        coarse.sub_box(sub.as_vec3() / n, (sub + UVec3::ONE).as_vec3() / n)
    }

    /// Corner values of fine sub-cell `sub`.
    ///
    /// Fine corners that coincide with a coarse corner copy it exactly, so the
    /// coarse extremes survive refinement bit for bit.
    fn fine_corners(&self, coarse: &[f32; CORNER_COUNT], sub: UVec3) -> [f32; CORNER_COUNT] {
        let n = self.subdivisions;
        let mut corners = [0.0; CORNER_COUNT];
        for (i, corner) in corners.iter_mut().enumerate() {
            let grid = sub + corner_offset(i).as_uvec3();
            let on_coarse_corner = (grid.cmpeq(UVec3::ZERO) | grid.cmpeq(UVec3::splat(n))).all();
            *corner = if on_coarse_corner {
                let c = grid / n;
                coarse[corner_index(c.x as usize, c.y as usize, c.z as usize)]
            } else {
                let t: Vec3 = grid.as_vec3() / n as f32;
                trilinear(coarse, t)
            };
        }
        corners
    }

    fn coarse_cell(&self, linear: usize) -> UVec3 {
        let dims = self.volume.dims();
        let cell = grid_position(dims, linear);
        assert!(
            linear < (dims.x as usize * dims.y as usize * dims.z as usize)
                && cell.cmplt(self.volume.cell_dims()).all(),
            "voxel ref cell {} was not produced by this segmented source",
            linear
        );
        cell
    }

    fn resolve(&self, voxel_ref: VoxelRef) -> (UVec3, Option<UVec3>) {
        match SegmentedRef::decode(voxel_ref) {
            SegmentedRef::Coarse { cell } => (self.coarse_cell(cell), None),
            SegmentedRef::Fine { cell, sub } => {
                assert!(
                    sub.cmplt(UVec3::splat(self.subdivisions)).all(),
                    "voxel ref {:?} has a sub-cell outside this segmented source",
                    voxel_ref
                );
                (self.coarse_cell(cell), Some(sub))
            }
        }
    }

    /// Emit the active references of one coarse cell into `out`
    fn scan_cell(&self, cell: UVec3, iso_value: f32, out: &mut Vec<VoxelRef>) -> bool {
        let corners = self.volume.cell_corners(cell);
        // Fine values interpolate the coarse corners, so they stay inside this range
        if !ValueRange::from_values(&corners).contains(iso_value) {
            return false;
        }
        let linear = linear_index(self.volume.dims(), cell);
        if !self.refines_cell(cell) {
            out.push(SegmentedRef::Coarse { cell: linear }.encode());
            return false;
        }

        let n = self.subdivisions;
        for z in 0..n {
            for y in 0..n {
                for x in 0..n {
                    let sub = UVec3::new(x, y, z);
                    let fine = self.fine_corners(&corners, sub);
                    if ValueRange::from_values(&fine).contains(iso_value) {
                        out.push(SegmentedRef::Fine { cell: linear, sub }.encode());
                    }
                }
            }
        }
        true
    }
}

impl VoxelSource for SegmentedVolumeSource {
    fn active_voxels(&self, iso_value: f32) -> Vec<VoxelRef> {
        if !self.volume.value_range().contains(iso_value) {
            return Vec::new();
        }
        let cell_dims = self.volume.cell_dims();

        let slabs: Vec<(Vec<VoxelRef>, usize)> = (0..cell_dims.z)
            .into_par_iter()
            .map(|z| {
                let mut slab = Vec::new();
                let mut refined = 0;
                for y in 0..cell_dims.y {
                    for x in 0..cell_dims.x {
                        if self.scan_cell(UVec3::new(x, y, z), iso_value, &mut slab) {
                            refined += 1;
                        }
                    }
                }
                (slab, refined)
            })
            .collect();

        let refined: usize = slabs.iter().map(|(_, r)| r).sum();
        let active: Vec<VoxelRef> = slabs.into_iter().flat_map(|(slab, _)| slab).collect();
        log::debug!(
            "Segmented scan: {} refs at iso {} ({} boundary cells refined x{})",
            active.len(),
            iso_value,
            refined,
            self.subdivisions
        );
        active
    }

    fn voxel_bounds(&self, voxel_ref: VoxelRef) -> Aabb {
        let (cell, sub) = self.resolve(voxel_ref);
        let coarse = self.cell_bounds(cell);
        match sub {
            Some(sub) => self.fine_bounds(&coarse, sub),
            None => coarse,
        }
    }

    fn voxel(&self, voxel_ref: VoxelRef) -> Voxel {
        let (cell, sub) = self.resolve(voxel_ref);
        let coarse_bounds = self.cell_bounds(cell);
        let corners = self.volume.cell_corners(cell);
        match sub {
            Some(sub) => Voxel::new(
                self.fine_bounds(&coarse_bounds, sub),
                self.fine_corners(&corners, sub),
            ),
            None => Voxel::new(coarse_bounds, corners),
        }
    }

    fn value_range(&self) -> ValueRange {
        self.volume.value_range()
    }

    fn cell_count(&self) -> usize {
        let c = self.volume.cell_dims();
        c.x as usize * c.y as usize * c.z as usize
    }

    fn name(&self) -> &'static str {
        "segmented"
    }
}
