//! Grey-level morphology with a rectangular structuring element
//!
//! The element is `(2 * rx + 1) x (2 * ry + 1)`. Every primitive works in
//! valid mode: erode and dilate shrink the image by `rx` on the left and
//! right and by `ry` on the top and bottom, so composites shrink by twice
//! that. Min and max filters are separable, so each primitive runs as a
//! horizontal pass followed by a vertical pass.

use tracing::trace;

use crate::error::{MrzError, Result};
use crate::models::{Matrix, Pixel};
use crate::utils::channels::subtract;

/// Morphological operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorphOp {
    /// Local minimum
    Erode,
    /// Local maximum
    Dilate,
    /// Erode then dilate
    Open,
    /// Dilate then erode
    Close,
    /// Closing minus the aligned input (dark detail on a light background)
    BlackHat,
    /// Aligned input minus the opening (light detail on a dark background)
    TopHat,
}

impl MorphOp {
    /// Pixels removed from each side along an axis for a radius `r`
    pub fn shrink(self, r: usize) -> usize {
        match self {
            MorphOp::Erode | MorphOp::Dilate => r,
            _ => 2 * r,
        }
    }
}

/// Apply `op` with radii `(rx, ry)`
pub fn morph<T: Pixel>(image: &Matrix<T>, op: MorphOp, rx: usize, ry: usize) -> Result<Matrix<T>> {
    match op {
        MorphOp::Erode => erode(image, rx, ry),
        MorphOp::Dilate => dilate(image, rx, ry),
        MorphOp::Open => open(image, rx, ry),
        MorphOp::Close => close(image, rx, ry),
        MorphOp::BlackHat => black_hat(image, rx, ry),
        MorphOp::TopHat => top_hat(image, rx, ry),
    }
}

/// Minimum over the element
pub fn erode<T: Pixel>(image: &Matrix<T>, rx: usize, ry: usize) -> Result<Matrix<T>> {
    extremum_filter(image, rx, ry, |a, b| if b < a { b } else { a })
}

/// Maximum over the element
pub fn dilate<T: Pixel>(image: &Matrix<T>, rx: usize, ry: usize) -> Result<Matrix<T>> {
    extremum_filter(image, rx, ry, |a, b| if b > a { b } else { a })
}

/// Erosion followed by dilation
pub fn open<T: Pixel>(image: &Matrix<T>, rx: usize, ry: usize) -> Result<Matrix<T>> {
    dilate(&erode(image, rx, ry)?, rx, ry)
}

/// Dilation followed by erosion; fills dark gaps narrower than the element
pub fn close<T: Pixel>(image: &Matrix<T>, rx: usize, ry: usize) -> Result<Matrix<T>> {
    erode(&dilate(image, rx, ry)?, rx, ry)
}

/// `close(image) - image`, with the input cropped to the closing's extent
///
/// Output pixel `[x, y]` corresponds to input pixel `[x + 2rx, y + 2ry]`.
pub fn black_hat<T: Pixel>(image: &Matrix<T>, rx: usize, ry: usize) -> Result<Matrix<T>> {
    let closed = close(image, rx, ry)?;
    let aligned = image.region(2 * rx, 2 * ry, closed.width(), closed.height())?;
    subtract(&closed, &aligned)
}

/// `image - open(image)`, with the input cropped to the opening's extent
pub fn top_hat<T: Pixel>(image: &Matrix<T>, rx: usize, ry: usize) -> Result<Matrix<T>> {
    let opened = open(image, rx, ry)?;
    let aligned = image.region(2 * rx, 2 * ry, opened.width(), opened.height())?;
    subtract(&aligned, &opened)
}

fn extremum_filter<T: Pixel, F: Fn(T, T) -> T + Copy>(
    image: &Matrix<T>,
    rx: usize,
    ry: usize,
    pick: F,
) -> Result<Matrix<T>> {
    let (kw, kh) = (2 * rx + 1, 2 * ry + 1);
    if kw > image.width() || kh > image.height() {
        return Err(MrzError::invalid(format!(
            "{}x{} structuring element does not fit a {}x{} image",
            kw,
            kh,
            image.width(),
            image.height()
        )));
    }

    let rows = horizontal_pass(image, kw, pick);
    let out = vertical_pass(&rows, kh, pick);
    trace!(rx, ry, width = out.width(), height = out.height(), "extremum filter");
    Ok(out)
}

fn horizontal_pass<T: Pixel, F: Fn(T, T) -> T>(image: &Matrix<T>, kw: usize, pick: F) -> Matrix<T> {
    let out_width = image.width() + 1 - kw;
    let mut data = Vec::with_capacity(out_width * image.height());
    image.for_each_row(|_, row| {
        for window in row.windows(kw) {
            let mut acc = window[0];
            for &v in &window[1..] {
                acc = pick(acc, v);
            }
            data.push(acc);
        }
    });
    Matrix::from_fn(out_width, image.height(), |x, y| data[y * out_width + x])
}

fn vertical_pass<T: Pixel, F: Fn(T, T) -> T>(image: &Matrix<T>, kh: usize, pick: F) -> Matrix<T> {
    let width = image.width();
    let out_height = image.height() + 1 - kh;
    let source = image.to_vec();
    Matrix::from_fn(width, out_height, |x, y| {
        let mut acc = source[y * width + x];
        for dy in 1..kh {
            acc = pick(acc, source[(y + dy) * width + x]);
        }
        acc
    })
}
