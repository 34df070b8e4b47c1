//! ARGB packing and luminance conversion
//!
//! Y = 0.299*R + 0.587*G + 0.114*B, in integer form
//! Y = (76*R + 150*G + 29*B) >> 8

use crate::models::Matrix;

/// Coefficients for grayscale conversion: Y = (76*R + 150*G + 29*B) >> 8
const COEF_R: u32 = 76;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

/// Luminance of one packed ARGB pixel (alpha ignored)
#[inline]
pub fn luminance(argb: u32) -> u8 {
    let r = (argb >> 16) & 0xFF;
    let g = (argb >> 8) & 0xFF;
    let b = argb & 0xFF;
    ((COEF_R * r + COEF_G * g + COEF_B * b) >> 8) as u8
}

/// Pack 8-bit channels into one ARGB word
#[inline]
pub fn pack_argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Opaque grey ARGB pixel
#[inline]
pub fn grey_argb(v: u8) -> u32 {
    pack_argb(0xFF, v, v, v)
}

/// Packed ARGB view to an 8-bit luminance matrix
pub fn argb_to_grayscale(image: &Matrix<u32>) -> Matrix<u8> {
    image.map(luminance)
}

/// Packed ARGB view to a float luminance matrix (pipeline working type)
pub fn argb_to_luminance_f32(image: &Matrix<u32>) -> Matrix<f32> {
    image.map(|argb| luminance(argb) as f32)
}

/// Interleaved RGBA bytes to packed ARGB words
///
/// Trailing bytes that do not form a whole pixel are ignored.
pub fn rgba_to_argb(rgba: &[u8]) -> Vec<u32> {
    rgba.chunks_exact(4)
        .map(|px| pack_argb(px[3], px[0], px[1], px[2]))
        .collect()
}
