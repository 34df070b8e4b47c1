//! Type-erased buffer views

use crate::error::{MrzError, Result};
use crate::models::{Matrix, Pixel, PixelKind};
use crate::utils::binarization;
use crate::utils::channels::{self, Channel};
use crate::utils::convolution;
use crate::utils::geometry;

/// A buffer view of any supported element type
///
/// Call sites that accept "an image of whatever pixel type" take this enum
/// and dispatch once; each arm runs the generic algorithm on the concrete
/// type. Operations that make no sense for a type return
/// [`MrzError::InvalidArgument`].
#[derive(Debug, Clone, PartialEq)]
pub enum AnyMatrix {
    /// 8-bit unsigned
    U8(Matrix<u8>),
    /// 32-bit signed
    I32(Matrix<i32>),
    /// Packed ARGB
    U32(Matrix<u32>),
    /// 32-bit float
    F32(Matrix<f32>),
}

macro_rules! dispatch {
    ($self:expr, $m:ident => $body:expr) => {
        match $self {
            AnyMatrix::U8($m) => $body,
            AnyMatrix::I32($m) => $body,
            AnyMatrix::U32($m) => $body,
            AnyMatrix::F32($m) => $body,
        }
    };
}

macro_rules! rewrap {
    ($self:expr, $m:ident => $body:expr) => {
        match $self {
            AnyMatrix::U8($m) => AnyMatrix::U8($body),
            AnyMatrix::I32($m) => AnyMatrix::I32($body),
            AnyMatrix::U32($m) => AnyMatrix::U32($body),
            AnyMatrix::F32($m) => AnyMatrix::F32($body),
        }
    };
}

impl AnyMatrix {
    /// Element type tag
    pub fn kind(&self) -> PixelKind {
        match self {
            AnyMatrix::U8(_) => PixelKind::U8,
            AnyMatrix::I32(_) => PixelKind::I32,
            AnyMatrix::U32(_) => PixelKind::U32,
            AnyMatrix::F32(_) => PixelKind::F32,
        }
    }

    /// View width
    pub fn width(&self) -> usize {
        dispatch!(self, m => m.width())
    }

    /// View height
    pub fn height(&self) -> usize {
        dispatch!(self, m => m.height())
    }

    /// Zero-copy window of the same element type
    pub fn region(&self, x: usize, y: usize, width: usize, height: usize) -> Result<AnyMatrix> {
        Ok(match self {
            AnyMatrix::U8(m) => AnyMatrix::U8(m.region(x, y, width, height)?),
            AnyMatrix::I32(m) => AnyMatrix::I32(m.region(x, y, width, height)?),
            AnyMatrix::U32(m) => AnyMatrix::U32(m.region(x, y, width, height)?),
            AnyMatrix::F32(m) => AnyMatrix::F32(m.region(x, y, width, height)?),
        })
    }

    /// `(min, max)` widened to `f64`
    pub fn range(&self) -> Option<(f64, f64)> {
        dispatch!(self, m => binarization::range(m).map(|(lo, hi)| (lo.to_f64(), hi.to_f64())))
    }

    /// See [`binarization::threshold`]
    pub fn threshold(&self, min: f64, max: f64) -> Matrix<u8> {
        dispatch!(self, m => binarization::threshold(m, min, max))
    }

    /// See [`binarization::threshold_single`]
    pub fn threshold_single(&self, t: f64) -> Matrix<u8> {
        dispatch!(self, m => binarization::threshold_single(m, t))
    }

    /// See [`binarization::otsu_threshold`]
    pub fn otsu_threshold(&self) -> f64 {
        dispatch!(self, m => binarization::otsu_threshold(m))
    }

    /// Magnitude in place; packed ARGB has no meaningful sign
    pub fn abs(&mut self) -> Result<()> {
        match self {
            AnyMatrix::U32(_) => return Err(unsupported("abs", PixelKind::U32)),
            AnyMatrix::U8(m) => channels::abs(m),
            AnyMatrix::I32(m) => channels::abs(m),
            AnyMatrix::F32(m) => channels::abs(m),
        }
        Ok(())
    }

    /// Stretch the value range onto `[0, target_max]`
    ///
    /// Floats take the float path; `u8` and `i32` take the 24-bit fixed-point
    /// path. Packed ARGB is rejected.
    pub fn contrast_stretch(&mut self, target_max: f64) -> Result<()> {
        match self {
            AnyMatrix::F32(m) => channels::contrast_stretch(m, target_max as f32),
            AnyMatrix::U8(m) => channels::contrast_stretch_fixed(m, target_max as i64),
            AnyMatrix::I32(m) => channels::contrast_stretch_fixed(m, target_max as i64),
            AnyMatrix::U32(_) => return Err(unsupported("contrast stretch", PixelKind::U32)),
        }
        Ok(())
    }

    /// One 8-bit channel; only packed ARGB has channels
    pub fn extract_channel(&self, channel: Channel) -> Result<Matrix<u8>> {
        match self {
            AnyMatrix::U32(m) => Ok(channels::extract_channel(m, channel)),
            other => Err(unsupported("channel extraction", other.kind())),
        }
    }

    /// Convolution always produces a float view
    pub fn convolute(&self, kernel: &Matrix<f32>) -> Result<Matrix<f32>> {
        match self {
            AnyMatrix::U32(_) => Err(unsupported("convolution", PixelKind::U32)),
            AnyMatrix::U8(m) => convolution::convolute(m, kernel),
            AnyMatrix::I32(m) => convolution::convolute(m, kernel),
            AnyMatrix::F32(m) => convolution::convolute(m, kernel),
        }
    }

    /// Quarter turn clockwise
    pub fn rotate90(&self) -> AnyMatrix {
        rewrap!(self, m => geometry::rotate90(m))
    }

    /// Half turn
    pub fn rotate180(&self) -> AnyMatrix {
        rewrap!(self, m => geometry::rotate180(m))
    }

    /// Quarter turn counter-clockwise
    pub fn rotate270(&self) -> AnyMatrix {
        rewrap!(self, m => geometry::rotate270(m))
    }

    /// Projective resampling; ARGB is interpolated per channel
    pub fn linear_transform(
        &self,
        transform: &Matrix<f32>,
        out_width: usize,
        out_height: usize,
    ) -> Result<AnyMatrix> {
        Ok(match self {
            AnyMatrix::U8(m) => AnyMatrix::U8(geometry::linear_transform(m, transform, out_width, out_height)?),
            AnyMatrix::I32(m) => AnyMatrix::I32(geometry::linear_transform(m, transform, out_width, out_height)?),
            AnyMatrix::U32(m) => AnyMatrix::U32(geometry::linear_transform(m, transform, out_width, out_height)?),
            AnyMatrix::F32(m) => AnyMatrix::F32(geometry::linear_transform(m, transform, out_width, out_height)?),
        })
    }

    /// Copy into a float view; ARGB is converted through luminance
    pub fn to_f32(&self) -> Matrix<f32> {
        match self {
            AnyMatrix::U32(m) => crate::utils::grayscale::argb_to_luminance_f32(m),
            AnyMatrix::U8(m) => m.to_f32(),
            AnyMatrix::I32(m) => m.to_f32(),
            AnyMatrix::F32(m) => m.deep_copy(),
        }
    }

    /// The `u8` view, if that is the variant
    pub fn as_u8(&self) -> Option<&Matrix<u8>> {
        match self {
            AnyMatrix::U8(m) => Some(m),
            _ => None,
        }
    }

    /// The `f32` view, if that is the variant
    pub fn as_f32(&self) -> Option<&Matrix<f32>> {
        match self {
            AnyMatrix::F32(m) => Some(m),
            _ => None,
        }
    }
}

fn unsupported(op: &str, kind: PixelKind) -> MrzError {
    MrzError::invalid(format!("{} is not supported for {} pixels", op, kind.name()))
}

impl From<Matrix<u8>> for AnyMatrix {
    fn from(m: Matrix<u8>) -> Self {
        AnyMatrix::U8(m)
    }
}

impl From<Matrix<i32>> for AnyMatrix {
    fn from(m: Matrix<i32>) -> Self {
        AnyMatrix::I32(m)
    }
}

impl From<Matrix<u32>> for AnyMatrix {
    fn from(m: Matrix<u32>) -> Self {
        AnyMatrix::U32(m)
    }
}

impl From<Matrix<f32>> for AnyMatrix {
    fn from(m: Matrix<f32>) -> Self {
        AnyMatrix::F32(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_extent() {
        let any: AnyMatrix = Matrix::<i32>::new(3, 2).into();
        assert_eq!(any.kind(), PixelKind::I32);
        assert_eq!((any.width(), any.height()), (3, 2));
    }

    #[test]
    fn test_channel_extraction_requires_argb() {
        let argb: AnyMatrix = Matrix::filled(2, 2, 0xFF12_3456u32).into();
        assert_eq!(argb.extract_channel(Channel::Green).unwrap().get(0, 0), 0x34);

        let grey: AnyMatrix = Matrix::<u8>::new(2, 2).into();
        let err = grey.extract_channel(Channel::Red).unwrap_err();
        assert!(matches!(err, MrzError::InvalidArgument(_)));
    }

    #[test]
    fn test_contrast_stretch_dispatch() {
        let mut floats: AnyMatrix = Matrix::from_vec(3, 1, vec![10.0f32, 20.0, 30.0]).unwrap().into();
        floats.contrast_stretch(100.0).unwrap();
        assert_eq!(floats.as_f32().unwrap().to_vec(), vec![0.0, 50.0, 100.0]);

        let mut bytes: AnyMatrix = Matrix::from_vec(3, 1, vec![10u8, 20, 30]).unwrap().into();
        bytes.contrast_stretch(100.0).unwrap();
        assert_eq!(bytes.as_u8().unwrap().to_vec(), vec![0, 50, 100]);

        let mut argb: AnyMatrix = Matrix::<u32>::new(2, 2).into();
        assert!(argb.contrast_stretch(255.0).is_err());
        assert!(argb.abs().is_err());
    }

    #[test]
    fn test_rotation_keeps_type() {
        let any: AnyMatrix = Matrix::from_fn(3, 2, |x, y| (x + y) as f32).into();
        let turned = any.rotate90();
        assert_eq!(turned.kind(), PixelKind::F32);
        assert_eq!((turned.width(), turned.height()), (2, 3));
        assert_eq!(turned.rotate270(), any);
    }

    #[test]
    fn test_linear_transform_rejects_non_3x3() {
        let any: AnyMatrix = Matrix::<u8>::new(4, 4).into();
        let err = any.linear_transform(&Matrix::new(2, 2), 4, 4).unwrap_err();
        assert!(matches!(err, MrzError::InvalidArgument(_)));
    }

    #[test]
    fn test_threshold_through_region() {
        let any: AnyMatrix = Matrix::from_vec(4, 1, vec![100i32, 30, 150, 50]).unwrap().into();
        assert_eq!(any.threshold(150.0, 50.0).to_vec(), vec![0, 1, 1, 1]);
        let window = any.region(1, 0, 2, 1).unwrap();
        assert_eq!(window.range(), Some((30.0, 150.0)));
    }
}
