//! Fixed convolution kernels
//!
//! Weights are compile-time constants; [`kernel_3x3`] wraps them in a fresh
//! float view when a stage needs one.

use crate::models::Matrix;

/// Sharpen: centre boost with 4-neighbour subtraction (weights sum to 1)
pub const SHARPEN: [f32; 9] = [0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0];

/// Sobel x-derivative (responds to vertical edges)
pub const SOBEL_X: [f32; 9] = [-1.0, 0.0, 1.0, -2.0, 0.0, 2.0, -1.0, 0.0, 1.0];

/// Sobel y-derivative (responds to horizontal edges)
pub const SOBEL_Y: [f32; 9] = [-1.0, -2.0, -1.0, 0.0, 0.0, 0.0, 1.0, 2.0, 1.0];

/// Scharr x-derivative (responds to vertical edges)
pub const SCHARR_X: [f32; 9] = [-3.0, 0.0, 3.0, -10.0, 0.0, 10.0, -3.0, 0.0, 3.0];

/// Scharr y-derivative (responds to horizontal edges)
pub const SCHARR_Y: [f32; 9] = [-3.0, -10.0, -3.0, 0.0, 0.0, 0.0, 3.0, 10.0, 3.0];

/// Gradient operator family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeOperator {
    /// 1-2-1 smoothing across the derivative
    Sobel,
    /// 3-10-3 smoothing across the derivative
    #[default]
    Scharr,
}

/// Wrap nine row-major weights in a 3x3 kernel view
pub fn kernel_3x3(weights: &[f32; 9]) -> Matrix<f32> {
    Matrix::from_fn(3, 3, |x, y| weights[y * 3 + x])
}

/// Sharpen kernel
pub fn sharpen_kernel() -> Matrix<f32> {
    kernel_3x3(&SHARPEN)
}

/// x-derivative kernel for the given operator
pub fn vertical_edge_kernel(operator: EdgeOperator) -> Matrix<f32> {
    match operator {
        EdgeOperator::Sobel => kernel_3x3(&SOBEL_X),
        EdgeOperator::Scharr => kernel_3x3(&SCHARR_X),
    }
}

/// y-derivative kernel for the given operator
pub fn horizontal_edge_kernel(operator: EdgeOperator) -> Matrix<f32> {
    match operator {
        EdgeOperator::Sobel => kernel_3x3(&SOBEL_Y),
        EdgeOperator::Scharr => kernel_3x3(&SCHARR_Y),
    }
}

/// Binomial row `C(2r, k)`, the integer approximation of a Gaussian
///
/// Returned as `(2r+1) x 1` when `horizontal`, else `1 x (2r+1)`.
pub fn binomial_kernel(radius: usize, horizontal: bool) -> Matrix<f32> {
    let n = 2 * radius;
    let mut weights = Vec::with_capacity(n + 1);
    let mut c = 1.0f64;
    for k in 0..=n {
        weights.push(c as f32);
        c = c * (n - k) as f64 / (k + 1) as f64;
    }
    if horizontal {
        Matrix::from_fn(n + 1, 1, |x, _| weights[x])
    } else {
        Matrix::from_fn(1, n + 1, |_, y| weights[y])
    }
}

/// `width x height` kernel of ones (box filter after normalization)
pub fn box_kernel(width: usize, height: usize) -> Matrix<f32> {
    Matrix::filled(width, height, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binomial_weights() {
        let k = binomial_kernel(3, true);
        assert_eq!(k.width(), 7);
        assert_eq!(k.height(), 1);
        assert_eq!(k.to_vec(), vec![1.0, 6.0, 15.0, 20.0, 15.0, 6.0, 1.0]);

        let v = binomial_kernel(1, false);
        assert_eq!((v.width(), v.height()), (1, 3));
        assert_eq!(v.to_vec(), vec![1.0, 2.0, 1.0]);
    }

    #[test]
    fn test_derivative_kernels_sum_to_zero() {
        for weights in [SOBEL_X, SOBEL_Y, SCHARR_X, SCHARR_Y] {
            assert_eq!(weights.iter().sum::<f32>(), 0.0);
        }
        assert_eq!(SHARPEN.iter().sum::<f32>(), 1.0);
    }

    #[test]
    fn test_kernel_layout() {
        let k = vertical_edge_kernel(EdgeOperator::Scharr);
        assert_eq!(k.get(0, 1), -10.0);
        assert_eq!(k.get(2, 1), 10.0);
        let k = horizontal_edge_kernel(EdgeOperator::Sobel);
        assert_eq!(k.get(1, 0), -2.0);
        assert_eq!(k.get(1, 2), 2.0);
    }
}
