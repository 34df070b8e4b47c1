//! Valid-mode convolution built from shifted regions
//!
//! Each non-zero tap adds `weight * region(dx, dy)` into a float accumulator,
//! so the inner loop is a plain row-wise multiply-add over aliased windows.
//! The output is `(w - kw + 1) x (h - kh + 1)`; element `[x, y]` corresponds
//! to the input pixel under the kernel's top-left tap.

use tracing::trace;

use crate::error::{MrzError, Result};
use crate::models::{Matrix, Pixel};
use crate::utils::channels::{scalar_division, weighted_addition};
use crate::utils::kernels::{
    EdgeOperator, binomial_kernel, horizontal_edge_kernel, sharpen_kernel, vertical_edge_kernel,
};

/// Convolve `image` with `kernel` without padding
///
/// The accumulated result is divided by the sum of the kernel's weights, so
/// kernels that do not sum to 1 still produce a weighted average. A zero
/// weight sum (derivative kernels) skips the division.
pub fn convolute<T: Pixel>(image: &Matrix<T>, kernel: &Matrix<f32>) -> Result<Matrix<f32>> {
    if kernel.is_empty() {
        return Err(MrzError::invalid("convolution kernel is empty"));
    }
    if kernel.width() > image.width() || kernel.height() > image.height() {
        return Err(MrzError::invalid(format!(
            "{}x{} kernel does not fit a {}x{} image",
            kernel.width(),
            kernel.height(),
            image.width(),
            image.height()
        )));
    }

    let out_width = image.width() - kernel.width() + 1;
    let out_height = image.height() - kernel.height() + 1;
    let mut accumulator = Matrix::<f32>::new(out_width, out_height);
    let mut weight_sum = 0.0f32;
    let mut taps = 0usize;

    for dy in 0..kernel.height() {
        for dx in 0..kernel.width() {
            let weight = kernel.get(dx, dy);
            if weight == 0.0 {
                continue;
            }
            weight_sum += weight;
            taps += 1;
            let window = image.region(dx, dy, out_width, out_height)?;
            weighted_addition(&mut accumulator, &window, weight)?;
        }
    }

    trace!(
        kernel_width = kernel.width(),
        kernel_height = kernel.height(),
        taps,
        weight_sum,
        "convolution done"
    );

    if weight_sum != 0.0 {
        scalar_division(&mut accumulator, weight_sum)?;
    }
    Ok(accumulator)
}

/// Separable binomial blur of the given radius
///
/// Shrinks the image by `radius` on every side.
pub fn gaussian_blur<T: Pixel>(image: &Matrix<T>, radius: usize) -> Result<Matrix<f32>> {
    if radius == 0 {
        return Ok(image.to_f32());
    }
    let rows = convolute(image, &binomial_kernel(radius, true))?;
    convolute(&rows, &binomial_kernel(radius, false))
}

/// Sharpen with the fixed 3x3 kernel (shrinks by one pixel per side)
pub fn sharpen<T: Pixel>(image: &Matrix<T>) -> Result<Matrix<f32>> {
    convolute(image, &sharpen_kernel())
}

/// Signed x-derivative; large where intensity changes along a row
pub fn vertical_edges<T: Pixel>(image: &Matrix<T>, operator: EdgeOperator) -> Result<Matrix<f32>> {
    convolute(image, &vertical_edge_kernel(operator))
}

/// Signed y-derivative; large where intensity changes down a column
pub fn horizontal_edges<T: Pixel>(image: &Matrix<T>, operator: EdgeOperator) -> Result<Matrix<f32>> {
    convolute(image, &horizontal_edge_kernel(operator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::kernels::box_kernel;

    #[test]
    fn test_box_kernel_is_local_average() {
        let image = Matrix::from_vec(
            4,
            4,
            vec![
                1u8, 2, 3, 4, //
                5, 6, 7, 8, //
                9, 10, 11, 12, //
                13, 14, 15, 16,
            ],
        )
        .unwrap();
        let out = convolute(&image, &box_kernel(3, 3)).unwrap();
        assert_eq!((out.width(), out.height()), (2, 2));
        // (1+2+3+5+6+7+9+10+11) / 9 = 6
        assert!((out.get(0, 0) - 6.0).abs() < 1e-5);
        assert!((out.get(1, 0) - 7.0).abs() < 1e-5);
        assert!((out.get(0, 1) - 10.0).abs() < 1e-5);
        assert!((out.get(1, 1) - 11.0).abs() < 1e-5);
    }

    #[test]
    fn test_constant_weight_kernel_normalizes() {
        let image = Matrix::from_fn(5, 3, |x, y| (x * y) as f32);
        let ones = convolute(&image, &box_kernel(2, 2)).unwrap();
        let fours = convolute(&image, &Matrix::filled(2, 2, 4.0f32)).unwrap();
        assert_eq!(ones, fours);
    }

    #[test]
    fn test_zero_sum_kernel_skips_division() {
        let image = Matrix::from_fn(5, 3, |x, _| (x * 10) as f32);
        let edges = vertical_edges(&image, EdgeOperator::Sobel).unwrap();
        // (-1 -2 -1) * x + (1 + 2 + 1) * (x + 2) per column step of 10
        assert!(edges.to_vec().iter().all(|&v| (v - 80.0).abs() < 1e-4));

        let flat = horizontal_edges(&image, EdgeOperator::Scharr).unwrap();
        assert!(flat.to_vec().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_kernel_larger_than_image() {
        let image = Matrix::<u8>::new(2, 2);
        assert!(convolute(&image, &box_kernel(3, 1)).is_err());
        assert!(convolute(&image, &Matrix::new(0, 0)).is_err());
    }

    #[test]
    fn test_gaussian_blur_preserves_constant() {
        let image = Matrix::filled(20, 12, 50u8);
        let blurred = gaussian_blur(&image, 3).unwrap();
        assert_eq!((blurred.width(), blurred.height()), (14, 6));
        assert!(blurred.to_vec().iter().all(|&v| (v - 50.0).abs() < 1e-3));
    }

    #[test]
    fn test_convolute_region_input() {
        let image = Matrix::from_fn(6, 6, |x, _| if x >= 3 { 100.0f32 } else { 0.0 });
        let window = image.region(1, 1, 4, 4).unwrap();
        let out = convolute(&window, &box_kernel(1, 1)).unwrap();
        assert_eq!(out.get(1, 0), 0.0);
        assert_eq!(out.get(2, 0), 100.0);
    }

    #[test]
    fn test_sharpen_constant_is_identity() {
        let image = Matrix::filled(5, 5, 12.0f32);
        let out = sharpen(&image).unwrap();
        assert!(out.to_vec().iter().all(|&v| (v - 12.0).abs() < 1e-5));
    }
}
