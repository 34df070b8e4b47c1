//! Geometric transforms: quarter-turn rotations and projective resampling

use crate::error::{MrzError, Result};
use crate::models::{Matrix, Pixel, Point};

/// Homogeneous 3x3 transform
///
/// Maps `(x, y, 1)` to `(a11 x + a12 y + a13, a21 x + a22 y + a23, a31 x + a32 y + a33)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform3 {
    /// Row 1, column 1
    pub a11: f64,
    /// Row 1, column 2
    pub a12: f64,
    /// Row 1, column 3
    pub a13: f64,
    /// Row 2, column 1
    pub a21: f64,
    /// Row 2, column 2
    pub a22: f64,
    /// Row 2, column 3
    pub a23: f64,
    /// Row 3, column 1
    pub a31: f64,
    /// Row 3, column 2
    pub a32: f64,
    /// Row 3, column 3
    pub a33: f64,
}

impl Transform3 {
    /// Identity transform
    pub fn identity() -> Self {
        Self::from_rows([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Pure translation by `(tx, ty)`
    pub fn translation(tx: f64, ty: f64) -> Self {
        Self::from_rows([[1.0, 0.0, tx], [0.0, 1.0, ty], [0.0, 0.0, 1.0]])
    }

    /// Axis-aligned scale
    pub fn scale(sx: f64, sy: f64) -> Self {
        Self::from_rows([[sx, 0.0, 0.0], [0.0, sy, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Build from row-major coefficients
    pub fn from_rows(rows: [[f64; 3]; 3]) -> Self {
        Self {
            a11: rows[0][0],
            a12: rows[0][1],
            a13: rows[0][2],
            a21: rows[1][0],
            a22: rows[1][1],
            a23: rows[1][2],
            a31: rows[2][0],
            a32: rows[2][1],
            a33: rows[2][2],
        }
    }

    /// Row-major coefficients
    pub fn to_rows(&self) -> [[f64; 3]; 3] {
        [
            [self.a11, self.a12, self.a13],
            [self.a21, self.a22, self.a23],
            [self.a31, self.a32, self.a33],
        ]
    }

    /// Read a transform from a 3x3 float view (element `[col, row]`)
    pub fn from_matrix(m: &Matrix<f32>) -> Result<Self> {
        if m.width() != 3 || m.height() != 3 {
            return Err(MrzError::invalid(format!(
                "transform must be 3x3, got {}x{}",
                m.width(),
                m.height()
            )));
        }
        let mut rows = [[0.0f64; 3]; 3];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, value) in row.iter_mut().enumerate() {
                *value = m.get(c, r) as f64;
            }
        }
        Ok(Self::from_rows(rows))
    }

    /// Write this transform into a fresh 3x3 float view
    pub fn to_matrix(&self) -> Matrix<f32> {
        let rows = self.to_rows();
        Matrix::from_fn(3, 3, |c, r| rows[r][c] as f32)
    }

    /// Create transform from 4 source points to 4 destination points
    ///
    /// `None` when the correspondences are degenerate (three collinear points).
    pub fn from_points(src: &[Point; 4], dst: &[Point; 4]) -> Option<Self> {
        // Direct linear transform with a33 fixed at 1; each row is augmented
        // with its right-hand side
        let mut system = [[0.0f64; 9]; 8];
        for (i, (s, d)) in src.iter().zip(dst).enumerate() {
            let (sx, sy) = (s.x as f64, s.y as f64);
            let (dx, dy) = (d.x as f64, d.y as f64);
            system[2 * i] = [sx, sy, 1.0, 0.0, 0.0, 0.0, -dx * sx, -dx * sy, dx];
            system[2 * i + 1] = [0.0, 0.0, 0.0, sx, sy, 1.0, -dy * sx, -dy * sy, dy];
        }

        let h = gauss_jordan(system)?;
        Some(Self::from_rows([[h[0], h[1], h[2]], [h[3], h[4], h[5]], [h[6], h[7], 1.0]]))
    }

    /// Determinant of the 3x3 matrix
    pub fn determinant(&self) -> f64 {
        self.a11 * (self.a22 * self.a33 - self.a23 * self.a32)
            - self.a12 * (self.a21 * self.a33 - self.a23 * self.a31)
            + self.a13 * (self.a21 * self.a32 - self.a22 * self.a31)
    }

    /// Inverse via the adjugate, `None` when singular
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det.abs() < 1e-12 || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;
        Some(Self {
            a11: (self.a22 * self.a33 - self.a23 * self.a32) * inv,
            a12: (self.a13 * self.a32 - self.a12 * self.a33) * inv,
            a13: (self.a12 * self.a23 - self.a13 * self.a22) * inv,
            a21: (self.a23 * self.a31 - self.a21 * self.a33) * inv,
            a22: (self.a11 * self.a33 - self.a13 * self.a31) * inv,
            a23: (self.a13 * self.a21 - self.a11 * self.a23) * inv,
            a31: (self.a21 * self.a32 - self.a22 * self.a31) * inv,
            a32: (self.a12 * self.a31 - self.a11 * self.a32) * inv,
            a33: (self.a11 * self.a22 - self.a12 * self.a21) * inv,
        })
    }

    /// Homogeneous image of `(x, y, 1)` before perspective division
    #[inline]
    pub fn apply_homogeneous(&self, x: f64, y: f64) -> (f64, f64, f64) {
        (
            self.a11 * x + self.a12 * y + self.a13,
            self.a21 * x + self.a22 * y + self.a23,
            self.a31 * x + self.a32 * y + self.a33,
        )
    }

    /// Map a point, dividing by `t` unless it is exactly 0 or 1
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let (xh, yh, t) = self.apply_homogeneous(x, y);
        if t == 0.0 || t == 1.0 {
            (xh, yh)
        } else {
            (xh / t, yh / t)
        }
    }
}

/// Reduce an augmented `N x (N + 1)` system to the identity and return its
/// last column. Partial pivoting; `None` for a (numerically) singular system.
fn gauss_jordan<const N: usize, const M: usize>(mut system: [[f64; M]; N]) -> Option<[f64; N]> {
    debug_assert_eq!(M, N + 1);
    for col in 0..N {
        let pivot = (col..N).max_by(|&i, &j| system[i][col].abs().total_cmp(&system[j][col].abs()))?;
        if system[pivot][col].abs() < 1e-12 {
            return None;
        }
        system.swap(col, pivot);

        let lead = system[col][col];
        let scaled: [f64; M] = system[col].map(|v| v / lead);
        system[col] = scaled;
        for (r, row) in system.iter_mut().enumerate() {
            if r == col || row[col] == 0.0 {
                continue;
            }
            let factor = row[col];
            row.iter_mut().zip(&scaled).for_each(|(v, p)| *v -= factor * p);
        }
    }
    Some(std::array::from_fn(|r| system[r][N]))
}

/// Quarter turn clockwise; width and height swap
pub fn rotate90<T: Pixel>(image: &Matrix<T>) -> Matrix<T> {
    let (w, h) = (image.width(), image.height());
    let source = image.to_vec();
    Matrix::from_fn(h, w, |x, y| source[(h - 1 - x) * w + y])
}

/// Half turn
pub fn rotate180<T: Pixel>(image: &Matrix<T>) -> Matrix<T> {
    let mut data = image.to_vec();
    data.reverse();
    Matrix::from_fn(image.width(), image.height(), |x, y| data[y * image.width() + x])
}

/// Quarter turn counter-clockwise, the inverse of [`rotate90`]
pub fn rotate270<T: Pixel>(image: &Matrix<T>) -> Matrix<T> {
    let (w, h) = (image.width(), image.height());
    let source = image.to_vec();
    Matrix::from_fn(h, w, |x, y| source[x * w + (w - 1 - y)])
}

/// Resample `image` through the forward transform `transform`
///
/// `transform` must be a 3x3 float view. Each destination pixel is mapped
/// back through the inverse; points landing inside the source are sampled
/// bilinearly, the rest stay at zero.
pub fn linear_transform<T: Pixel>(
    image: &Matrix<T>,
    transform: &Matrix<f32>,
    out_width: usize,
    out_height: usize,
) -> Result<Matrix<T>> {
    let forward = Transform3::from_matrix(transform)?;
    warp(image, &forward, out_width, out_height)
}

/// [`linear_transform`] with an already-parsed transform
pub fn warp<T: Pixel>(
    image: &Matrix<T>,
    forward: &Transform3,
    out_width: usize,
    out_height: usize,
) -> Result<Matrix<T>> {
    let inverse = forward
        .inverse()
        .ok_or_else(|| MrzError::invalid("transform matrix is singular"))?;

    let (w, h) = (image.width(), image.height());
    let source = image.to_vec();
    let sample = |x: usize, y: usize| source[y * w + x];

    let mut data = Vec::with_capacity(out_width * out_height);
    for y in 0..out_height {
        for x in 0..out_width {
            let (x0, y0) = inverse.apply(x as f64, y as f64);
            if !(x0 >= 0.0 && y0 >= 0.0 && x0 < w as f64 && y0 < h as f64) {
                data.push(T::default());
                continue;
            }

            let (ix, iy) = (x0.floor() as usize, y0.floor() as usize);
            let (fx, fy) = (x0 - ix as f64, y0 - iy as f64);
            // The +1 neighbour replicates the last row or column at the edge
            let nx = (ix + 1).min(w - 1);
            let ny = (iy + 1).min(h - 1);
            data.push(T::bilinear(
                sample(ix, iy),
                sample(nx, iy),
                sample(ix, ny),
                sample(nx, ny),
                fx,
                fy,
            ));
        }
    }

    Matrix::from_vec(out_width, out_height, data)
}
