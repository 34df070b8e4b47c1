//! Per-pixel arithmetic and channel extraction
//!
//! These are the element-wise primitives the heavier stages are built from.
//! Each walks its views row by row, so strided regions cost the same as
//! contiguous buffers.

use crate::error::{MrzError, Result};
use crate::models::{Matrix, Pixel};
use crate::utils::binarization::range;
use crate::utils::fixed_point::FixedScale;

/// One 8-bit channel of a packed ARGB pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Bits 24..32
    Alpha,
    /// Bits 16..24
    Red,
    /// Bits 8..16
    Green,
    /// Bits 0..8
    Blue,
}

impl Channel {
    fn shift(self) -> u32 {
        match self {
            Channel::Alpha => 24,
            Channel::Red => 16,
            Channel::Green => 8,
            Channel::Blue => 0,
        }
    }
}

/// Copy one channel of a packed ARGB view into a new 8-bit matrix
pub fn extract_channel(image: &Matrix<u32>, channel: Channel) -> Matrix<u8> {
    let shift = channel.shift();
    image.map(|argb| ((argb >> shift) & 0xFF) as u8)
}

/// `dst[i] += src[i] * scalar` over matching extents
pub fn weighted_addition<T: Pixel>(dst: &mut Matrix<f32>, src: &Matrix<T>, scalar: f32) -> Result<()> {
    dst.zip_rows_mut(src, |d, s| {
        for (acc, &v) in d.iter_mut().zip(s) {
            *acc += (v.to_f64() as f32) * scalar;
        }
    })
}

/// Divide every element by `divisor`
pub fn scalar_division(image: &mut Matrix<f32>, divisor: f32) -> Result<()> {
    if divisor == 0.0 {
        return Err(MrzError::invalid("scalar division by zero"));
    }
    image.for_each_row_mut(|_, row| {
        for v in row.iter_mut() {
            *v /= divisor;
        }
    });
    Ok(())
}

/// `v' = (v + offset) * scale` on a float view
///
/// With `clamp_offset`, values that fall below zero after the offset are
/// pinned to zero before scaling.
pub fn scalar_linear_transform(image: &mut Matrix<f32>, offset: f32, scale: f32, clamp_offset: bool) {
    image.for_each_row_mut(|_, row| {
        for v in row.iter_mut() {
            let mut shifted = *v + offset;
            if clamp_offset && shifted < 0.0 {
                shifted = 0.0;
            }
            *v = shifted * scale;
        }
    });
}

/// Integer element types that support the fixed-point transform path
pub trait IntPixel: Pixel {
    /// Widen to `i64`
    fn to_i64(self) -> i64;
    /// Narrow from `i64`, saturating at the type's limits
    fn saturate_from(value: i64) -> Self;
}

impl IntPixel for u8 {
    fn to_i64(self) -> i64 {
        self as i64
    }

    fn saturate_from(value: i64) -> Self {
        value.clamp(0, u8::MAX as i64) as u8
    }
}

impl IntPixel for i32 {
    fn to_i64(self) -> i64 {
        self as i64
    }

    fn saturate_from(value: i64) -> Self {
        value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }
}

/// `v' = ((v + offset) * scale) >> 24` on an integer view
///
/// Fixed-point twin of [`scalar_linear_transform`]; for non-negative inputs
/// the result equals the floor of the float path up to one step of the
/// 24-bit scale.
pub fn scalar_linear_transform_fixed<T: IntPixel>(
    image: &mut Matrix<T>,
    offset: i64,
    scale: FixedScale,
    clamp_offset: bool,
) {
    image.for_each_row_mut(|_, row| {
        for v in row.iter_mut() {
            let mut shifted = v.to_i64() + offset;
            if clamp_offset && shifted < 0 {
                shifted = 0;
            }
            *v = T::saturate_from(scale.apply(shifted));
        }
    });
}

/// Stretch a float view so its range maps onto `[0, target_max]`
///
/// A constant view is left untouched.
pub fn contrast_stretch(image: &mut Matrix<f32>, target_max: f32) {
    let Some((min, max)) = range(image) else {
        return;
    };
    if max <= min {
        return;
    }
    let scale = target_max / (max - min);
    scalar_linear_transform(image, -min, scale, true);
}

/// Integer contrast stretch through the fixed-point path
pub fn contrast_stretch_fixed<T: IntPixel>(image: &mut Matrix<T>, target_max: i64) {
    let Some((min, max)) = range(image) else {
        return;
    };
    let (min, max) = (min.to_i64(), max.to_i64());
    if max <= min {
        return;
    }
    if let Some(scale) = FixedScale::from_ratio(target_max, max - min) {
        scalar_linear_transform_fixed(image, -min, scale, true);
    }
}

/// Set every element to `value`
pub fn fill<T: Pixel>(image: &mut Matrix<T>, value: T) {
    image.for_each_row_mut(|_, row| row.fill(value));
}

/// Replace every element with its magnitude
pub fn abs<T: Pixel>(image: &mut Matrix<T>) {
    image.for_each_row_mut(|_, row| {
        for v in row.iter_mut() {
            *v = v.magnitude();
        }
    });
}

/// Element-wise `a - b` into a new matrix
pub fn subtract<T: Pixel>(a: &Matrix<T>, b: &Matrix<T>) -> Result<Matrix<T>> {
    let mut out = a.deep_copy();
    out.zip_rows_mut(b, |d, s| {
        for (v, &rhs) in d.iter_mut().zip(s) {
            *v = T::from_f64(v.to_f64() - rhs.to_f64());
        }
    })?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_channels() {
        let image = Matrix::from_vec(2, 1, vec![0x80_11_22_33u32, 0xFF_00_FF_01]).unwrap();
        assert_eq!(extract_channel(&image, Channel::Alpha).to_vec(), vec![0x80, 0xFF]);
        assert_eq!(extract_channel(&image, Channel::Red).to_vec(), vec![0x11, 0x00]);
        assert_eq!(extract_channel(&image, Channel::Green).to_vec(), vec![0x22, 0xFF]);
        assert_eq!(extract_channel(&image, Channel::Blue).to_vec(), vec![0x33, 0x01]);
    }

    #[test]
    fn test_weighted_addition_on_region() {
        let src = Matrix::from_fn(4, 4, |x, y| (x + 10 * y) as u8);
        let window = src.region(1, 1, 2, 2).unwrap();
        let mut acc = Matrix::<f32>::filled(2, 2, 1.0);
        weighted_addition(&mut acc, &window, 0.5).unwrap();
        assert_eq!(acc.to_vec(), vec![6.5, 7.0, 11.5, 12.0]);

        let wrong = Matrix::<u8>::new(3, 2);
        assert!(weighted_addition(&mut acc, &wrong, 1.0).is_err());
    }

    #[test]
    fn test_scalar_division() {
        let mut m = Matrix::filled(2, 2, 9.0f32);
        scalar_division(&mut m, 3.0).unwrap();
        assert!(m.to_vec().iter().all(|&v| v == 3.0));
        assert!(scalar_division(&mut m, 0.0).is_err());
    }

    #[test]
    fn test_linear_transform_clamps_offset() {
        let mut m = Matrix::from_vec(3, 1, vec![5.0f32, 10.0, 20.0]).unwrap();
        scalar_linear_transform(&mut m, -10.0, 2.0, true);
        assert_eq!(m.to_vec(), vec![0.0, 0.0, 20.0]);
    }

    #[test]
    fn test_fixed_path_tracks_float_path() {
        let values: Vec<i32> = (0..200).map(|v| v * 3 - 50).collect();
        let mut fixed = Matrix::from_vec(20, 10, values.clone()).unwrap();
        let mut float = Matrix::from_vec(20, 10, values.iter().map(|&v| v as f32).collect()).unwrap();

        contrast_stretch_fixed(&mut fixed, 255);
        contrast_stretch(&mut float, 255.0);

        for (f, g) in fixed.to_vec().iter().zip(float.to_vec()) {
            assert!((*f as f32 - g.floor()).abs() <= 1.0, "fixed={} float={}", f, g);
        }
        assert_eq!(fixed.get(0, 0), 0);
        assert!(fixed.get(19, 9) >= 254);
    }

    #[test]
    fn test_contrast_stretch_constant_is_noop() {
        let mut m = Matrix::filled(3, 3, 4.0f32);
        contrast_stretch(&mut m, 255.0);
        assert!(m.to_vec().iter().all(|&v| v == 4.0));
    }

    #[test]
    fn test_fill_and_abs_through_region() {
        let mut m = Matrix::from_fn(4, 4, |x, y| x as i32 - y as i32);
        abs(&mut m);
        assert_eq!(m.get(0, 3), 3);

        let mut window = m.region(1, 1, 2, 2).unwrap();
        fill(&mut window, 9);
        assert_eq!(m.get(2, 2), 9);
        assert_eq!(m.get(0, 0), 0);
        assert_eq!(m.get(3, 3), 0);
    }

    #[test]
    fn test_subtract() {
        let a = Matrix::filled(2, 2, 10u8);
        let b = Matrix::from_vec(2, 2, vec![1u8, 2, 3, 4]).unwrap();
        assert_eq!(subtract(&a, &b).unwrap().to_vec(), vec![9, 8, 7, 6]);
    }
}
