//! Scalar value ranges used for iso-value selection

/// Closed interval `[min, max]` of scalar samples
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    /// Range that contains nothing; identity for [`ValueRange::merged`]
    pub const EMPTY: ValueRange = ValueRange {
        min: f32::INFINITY,
        max: f32::NEG_INFINITY,
    };

    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Range spanned by a set of samples
    pub fn from_values(values: &[f32]) -> Self {
        values.iter().fold(Self::EMPTY, |range, &v| range.including(v))
    }

    /// True if `min <= iso_value <= max`. NaN is never contained.
    #[inline]
    pub fn contains(&self, iso_value: f32) -> bool {
        self.min <= iso_value && iso_value <= self.max
    }

    pub fn is_empty(&self) -> bool {
        !(self.min <= self.max)
    }

    /// Range extended to include `value`
    #[inline]
    pub fn including(self, value: f32) -> Self {
        Self {
            min: self.min.min(value),
            max: self.max.max(value),
        }
    }

    /// Smallest range containing both
    pub fn merged(self, other: ValueRange) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_values() {
        let range = ValueRange::from_values(&[3.0, -1.0, 2.0]);
        assert_eq!(range, ValueRange::new(-1.0, 3.0));
    }

    #[test]
    fn test_contains_is_inclusive() {
        let range = ValueRange::new(0.0, 1.0);
        assert!(range.contains(0.0));
        assert!(range.contains(1.0));
        assert!(!range.contains(1.0001));
        assert!(!range.contains(f32::NAN));
    }

    #[test]
    fn test_empty_range() {
        assert!(ValueRange::EMPTY.is_empty());
        assert!(!ValueRange::EMPTY.contains(0.0));
        assert!(ValueRange::from_values(&[]).is_empty());
        let merged = ValueRange::EMPTY.merged(ValueRange::new(2.0, 4.0));
        assert_eq!(merged, ValueRange::new(2.0, 4.0));
    }
}
