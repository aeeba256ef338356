//! Variable-resolution octant lists (AMR-style data)

pub mod source;

pub use source::OctantSource;

use crate::core::types::Vec3;
use crate::math::aabb::Aabb;
use crate::voxel::range::ValueRange;
use crate::voxel::voxel::{Voxel, CORNER_COUNT};

/// One cubic cell of a variable-resolution octant list
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Octant {
    pub bounds: Aabb,
    /// Edge length; octants of equal width form one level
    pub width: f32,
    /// Corner samples indexed by `x + 2y + 4z`
    pub vertex_values: [f32; CORNER_COUNT],
}

impl Octant {
    /// Octant with lower corner `lower` and edge length `width`
    pub fn new(lower: Vec3, width: f32, vertex_values: [f32; CORNER_COUNT]) -> Self {
        Self {
            bounds: Aabb::from_corner_width(lower, width),
            width,
            vertex_values,
        }
    }

    /// Octant over `bounds` with corners sampled from `field`
    pub fn from_field(bounds: Aabb, field: impl Fn(Vec3) -> f32) -> Self {
        let mut vertex_values = [0.0; CORNER_COUNT];
        for (i, value) in vertex_values.iter_mut().enumerate() {
            *value = field(bounds.corner(i));
        }
        Self {
            bounds,
            width: bounds.size().x,
            vertex_values,
        }
    }

    /// The eight half-width children, in `x + 2y + 4z` order, sampled from `field`
    pub fn refine(&self, field: impl Fn(Vec3) -> f32) -> [Octant; 8] {
        std::array::from_fn(|i| Octant::from_field(self.bounds.child_octant(i as u8), &field))
    }

    pub fn value_range(&self) -> ValueRange {
        ValueRange::from_values(&self.vertex_values)
    }

    pub fn to_voxel(&self) -> Voxel {
        Voxel::new(self.bounds, self.vertex_values)
    }
}
