//! Fixed-point arithmetic for the integer contrast path

/// Fixed-point scale factor (40.24 format)
///
/// - 24 fractional bits, stored in an `i64`
/// - Precision: 1/16777216 ≈ 0.00000006
///
/// Applying the scale is a multiply followed by an arithmetic right shift,
/// which mirrors `(value * scale).floor()` on the float path for
/// non-negative values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FixedScale(i64);

impl FixedScale {
    /// Number of fractional bits
    pub const FRACTIONAL_BITS: u32 = 24;

    /// `numerator / denominator` computed in integer arithmetic
    pub fn from_ratio(numerator: i64, denominator: i64) -> Option<Self> {
        if denominator == 0 {
            return None;
        }
        Some(FixedScale((numerator << Self::FRACTIONAL_BITS) / denominator))
    }

    /// Multiply `value` by this scale and shift the fraction away
    #[inline]
    pub fn apply(&self, value: i64) -> i64 {
        value.wrapping_mul(self.0) >> Self::FRACTIONAL_BITS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_basic() {
        let two = FixedScale::from_ratio(6, 3).unwrap();
        assert_eq!(two.apply(21), 42);
        assert_eq!(FixedScale::from_ratio(1, 4).unwrap().apply(10), 2);
    }

    #[test]
    fn test_ratio_matches_float_floor() {
        let scale = FixedScale::from_ratio(255, 97).unwrap();
        let float_scale = 255.0 / 97.0;
        for v in 0..=97i64 {
            let fixed = scale.apply(v);
            let float = (v as f64 * float_scale).floor() as i64;
            assert!((fixed - float).abs() <= 1, "v={} fixed={} float={}", v, fixed, float);
        }
        assert!(FixedScale::from_ratio(1, 0).is_none());
    }
}
