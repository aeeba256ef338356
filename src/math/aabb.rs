//! Axis-aligned bounding box

use crate::core::types::Vec3;

/// Axis-aligned bounding box defined by min and max corners.
///
/// Used for every voxel and octant extent handed to the intersection kernel.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// The `[0,1]^3` cube every geometry reports before its source is built
    pub const UNIT: Aabb = Aabb {
        min: Vec3::ZERO,
        max: Vec3::ONE,
    };

    /// Create AABB from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create a cube from its lower corner and edge length
    pub fn from_corner_width(lower: Vec3, width: f32) -> Self {
        Self {
            min: lower,
            max: lower + Vec3::splat(width),
        }
    }

    /// Get size (max - min)
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Get center point
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Enclosed volume
    pub fn volume(&self) -> f32 {
        let s = self.size();
        s.x * s.y * s.z
    }

    /// Map a normalized position `t` in `[0,1]^3` into this box
    pub fn lerp(&self, t: Vec3) -> Vec3 {
        self.min + self.size() * t
    }

    /// Sub-box spanning the normalized range `[t_min, t_max]`
    pub fn sub_box(&self, t_min: Vec3, t_max: Vec3) -> Aabb {
        Aabb::new(self.lerp(t_min), self.lerp(t_max))
    }

    /// Position of corner `index` (bit 0 = x, bit 1 = y, bit 2 = z)
    pub fn corner(&self, index: usize) -> Vec3 {
        debug_assert!(index < 8);
        Vec3::new(
            if index & 1 != 0 { self.max.x } else { self.min.x },
            if index & 2 != 0 { self.max.y } else { self.min.y },
            if index & 4 != 0 { self.max.z } else { self.min.z },
        )
    }

    /// Check if point is inside AABB (boundary inclusive)
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Check if `other` lies entirely inside this box (boundary inclusive)
    pub fn contains_aabb(&self, other: &Aabb) -> bool {
        self.contains_point(other.min) && self.contains_point(other.max)
    }

    /// Volume shared by both boxes, zero when they only touch
    pub fn overlap_volume(&self, other: &Aabb) -> f32 {
        let extent = (self.max.min(other.max) - self.min.max(other.min)).max(Vec3::ZERO);
        extent.x * extent.y * extent.z
    }

    /// Return merged AABB containing both
    pub fn merged(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Get child octant AABB for octree subdivision
    /// index: 0-7 representing xyz octant (bit 0=x, bit 1=y, bit 2=z)
    pub fn child_octant(&self, index: u8) -> Aabb {
        debug_assert!(index < 8);
        let half = self.size() * 0.5;
        let offset = Vec3::new(
            if index & 1 != 0 { half.x } else { 0.0 },
            if index & 2 != 0 { half.y } else { 0.0 },
            if index & 4 != 0 { half.z } else { 0.0 },
        );
        Aabb::new(self.min + offset, self.min + offset + half)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_accessors() {
        assert_eq!(Aabb::UNIT.center(), Vec3::splat(0.5));
        assert_eq!(Aabb::UNIT.size(), Vec3::ONE);
        assert_eq!(Aabb::UNIT.volume(), 1.0);
    }

    #[test]
    fn test_from_corner_width() {
        let aabb = Aabb::from_corner_width(Vec3::new(1.0, 2.0, 3.0), 0.5);
        assert_eq!(aabb.max, Vec3::new(1.5, 2.5, 3.5));
    }

    #[test]
    fn test_corner_ordering() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::new(1.0, 2.0, 4.0));
        assert_eq!(aabb.corner(0), Vec3::ZERO);
        assert_eq!(aabb.corner(1), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(aabb.corner(2), Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(aabb.corner(4), Vec3::new(0.0, 0.0, 4.0));
        assert_eq!(aabb.corner(7), aabb.max);
    }

    #[test]
    fn test_sub_box() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::splat(2.0));
        let sub = aabb.sub_box(Vec3::splat(0.25), Vec3::splat(0.5));
        assert_eq!(sub, Aabb::new(Vec3::splat(0.5), Vec3::ONE));
    }

    #[test]
    fn test_containment() {
        let outer = Aabb::UNIT;
        let inner = Aabb::new(Vec3::splat(0.25), Vec3::splat(0.5));
        assert!(outer.contains_aabb(&inner));
        assert!(!inner.contains_aabb(&outer));
        assert!(!outer.contains_point(Vec3::splat(1.5)));
    }

    #[test]
    fn test_overlap_volume() {
        let a = Aabb::UNIT;
        let b = Aabb::new(Vec3::splat(0.5), Vec3::splat(1.5));
        let touching = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        assert_eq!(a.overlap_volume(&b), 0.125);
        assert_eq!(a.overlap_volume(&touching), 0.0);
    }

    #[test]
    fn test_child_octant() {
        let parent = Aabb::new(Vec3::ZERO, Vec3::splat(2.0));
        assert_eq!(parent.child_octant(0), Aabb::UNIT);
        assert_eq!(parent.child_octant(7), Aabb::new(Vec3::ONE, Vec3::splat(2.0)));
    }
}
