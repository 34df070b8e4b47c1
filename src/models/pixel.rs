//! Element types supported by the engine

/// Element types a [`Matrix`](crate::models::Matrix) can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelKind {
    /// 8-bit unsigned (greyscale, binary masks)
    U8,
    /// 32-bit signed (labels, fixed-point intermediates)
    I32,
    /// 32-bit unsigned, packed ARGB
    U32,
    /// 32-bit float
    F32,
}

impl PixelKind {
    /// Short lowercase name used in error messages
    pub fn name(self) -> &'static str {
        match self {
            PixelKind::U8 => "u8",
            PixelKind::I32 => "i32",
            PixelKind::U32 => "u32",
            PixelKind::F32 => "f32",
        }
    }
}

/// Numeric element stored in a buffer view
///
/// Every algorithm is written once against this trait; arithmetic runs in
/// `f64` and is converted back with rounding and saturation for the integer
/// types.
pub trait Pixel: Copy + Default + PartialOrd + std::fmt::Debug + 'static {
    /// Runtime tag for this element type
    const KIND: PixelKind;

    /// Widen to `f64`
    fn to_f64(self) -> f64;

    /// Narrow from `f64`, rounding and saturating for integer types
    fn from_f64(value: f64) -> Self;

    /// Absolute value (identity for unsigned types)
    fn magnitude(self) -> Self;

    /// Bilinear blend of four neighbours with fractional offsets `fx`, `fy`
    fn bilinear(tl: Self, tr: Self, bl: Self, br: Self, fx: f64, fy: f64) -> Self {
        Self::from_f64(blend(
            tl.to_f64(),
            tr.to_f64(),
            bl.to_f64(),
            br.to_f64(),
            fx,
            fy,
        ))
    }
}

#[inline]
fn blend(tl: f64, tr: f64, bl: f64, br: f64, fx: f64, fy: f64) -> f64 {
    let top = tl + (tr - tl) * fx;
    let bottom = bl + (br - bl) * fx;
    top + (bottom - top) * fy
}

impl Pixel for u8 {
    const KIND: PixelKind = PixelKind::U8;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value.round().clamp(0.0, 255.0) as u8
    }

    #[inline]
    fn magnitude(self) -> Self {
        self
    }
}

impl Pixel for i32 {
    const KIND: PixelKind = PixelKind::I32;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        // `as` saturates at the i32 limits and maps NaN to 0
        value.round() as i32
    }

    #[inline]
    fn magnitude(self) -> Self {
        self.saturating_abs()
    }
}

impl Pixel for u32 {
    const KIND: PixelKind = PixelKind::U32;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value.round() as u32
    }

    #[inline]
    fn magnitude(self) -> Self {
        self
    }

    /// Packed ARGB is blended per 8-bit channel
    fn bilinear(tl: Self, tr: Self, bl: Self, br: Self, fx: f64, fy: f64) -> Self {
        let mut out = 0u32;
        for shift in [24u32, 16, 8, 0] {
            let channel = |v: u32| ((v >> shift) & 0xFF) as f64;
            let value = blend(channel(tl), channel(tr), channel(bl), channel(br), fx, fy);
            out |= (value.round().clamp(0.0, 255.0) as u32) << shift;
        }
        out
    }
}

impl Pixel for f32 {
    const KIND: PixelKind = PixelKind::F32;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn magnitude(self) -> Self {
        self.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_conversions_saturate() {
        assert_eq!(u8::from_f64(300.0), 255);
        assert_eq!(u8::from_f64(-4.0), 0);
        assert_eq!(u8::from_f64(12.5), 13);
        assert_eq!(i32::from_f64(-7.4), -7);
        assert_eq!(u32::from_f64(-1.0), 0);
    }

    #[test]
    fn test_magnitude() {
        assert_eq!((-5i32).magnitude(), 5);
        assert_eq!(i32::MIN.magnitude(), i32::MAX);
        assert_eq!((-2.5f32).magnitude(), 2.5);
        assert_eq!(7u8.magnitude(), 7);
    }

    #[test]
    fn test_argb_bilinear_per_channel() {
        let black = 0xFF00_0000u32;
        let white = 0xFFFF_FFFFu32;
        let mid = u32::bilinear(black, white, black, white, 0.5, 0.0);
        assert_eq!(mid >> 24, 0xFF);
        assert_eq!((mid >> 16) & 0xFF, 128);
        assert_eq!(mid & 0xFF, 128);
    }

    #[test]
    fn test_scalar_bilinear() {
        let v = f32::bilinear(0.0, 10.0, 20.0, 30.0, 0.5, 0.5);
        assert!((v - 15.0).abs() < 1e-6);
    }
}
