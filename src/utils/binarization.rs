//! Range statistics and thresholding
//!
//! Binary outputs are `Matrix<u8>` holding 0 or 1.

use crate::models::{Matrix, Pixel};

/// Number of histogram bins used by Otsu's method
pub const OTSU_BINS: usize = 256;

/// Minimum and maximum over a view in a single pass, `None` when empty
pub fn range<T: Pixel>(image: &Matrix<T>) -> Option<(T, T)> {
    let mut bounds: Option<(T, T)> = None;
    image.for_each_row(|_, row| {
        for &v in row {
            bounds = match bounds {
                None => Some((v, v)),
                Some((lo, hi)) => Some((
                    if v < lo { v } else { lo },
                    if v > hi { v } else { hi },
                )),
            };
        }
    });
    bounds
}

/// Binary remap against a band
///
/// With `min <= max`, values inside `[min, max]` become 1. With `min > max`
/// the rule inverts: values `>= min` or `<= max` become 1, so the same call
/// expresses band-pass and band-reject.
pub fn threshold<T: Pixel>(image: &Matrix<T>, min: f64, max: f64) -> Matrix<u8> {
    if min <= max {
        image.map(|v| {
            let v = v.to_f64();
            (v >= min && v <= max) as u8
        })
    } else {
        image.map(|v| {
            let v = v.to_f64();
            (v >= min || v <= max) as u8
        })
    }
}

/// One-sided threshold
///
/// `t >= 0` marks values `>= t`; a negative `t` marks values `<= |t|`,
/// producing the negative image of the same cut.
pub fn threshold_single<T: Pixel>(image: &Matrix<T>, t: f64) -> Matrix<u8> {
    if t < 0.0 {
        threshold(image, f64::INFINITY, t.abs())
    } else {
        threshold(image, t, f64::INFINITY)
    }
}

/// Calculate Otsu's optimal threshold over the view's value range
///
/// The range `[min, max]` is split into [`OTSU_BINS`] bins and the split
/// maximizing `w_bg * w_fg * (mean_bg - mean_fg)^2` is chosen. The returned
/// value is the lower edge of the first foreground bin, so `v >= t` selects
/// the bright class. A constant view returns its single value, which puts
/// every element in the same class.
pub fn otsu_threshold<T: Pixel>(image: &Matrix<T>) -> f64 {
    let Some((min, max)) = range(image) else {
        return 0.0;
    };
    let (lo, hi) = (min.to_f64(), max.to_f64());
    if !(hi > lo) {
        return lo;
    }

    let span = hi - lo;
    let mut histogram = [0u64; OTSU_BINS];
    image.for_each_row(|_, row| {
        for &v in row {
            let bin = ((v.to_f64() - lo) / span * OTSU_BINS as f64) as usize;
            histogram[bin.min(OTSU_BINS - 1)] += 1;
        }
    });

    let total: u64 = histogram.iter().sum();
    let sum_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &count)| i as f64 * count as f64)
        .sum();

    let mut weight_bg = 0u64;
    let mut sum_bg = 0.0f64;
    let mut max_variance = -1.0f64;
    let mut split = 0usize;

    for (k, &count) in histogram.iter().enumerate().take(OTSU_BINS - 1) {
        weight_bg += count;
        sum_bg += k as f64 * count as f64;
        if weight_bg == 0 {
            continue;
        }
        let weight_fg = total - weight_bg;
        if weight_fg == 0 {
            break;
        }

        let mean_bg = sum_bg / weight_bg as f64;
        let mean_fg = (sum_total - sum_bg) / weight_fg as f64;
        let variance = weight_bg as f64 * weight_fg as f64 * (mean_bg - mean_fg).powi(2);

        if variance > max_variance {
            max_variance = variance;
            split = k;
        }
    }

    lo + (split + 1) as f64 * span / OTSU_BINS as f64
}

/// Binarize with Otsu's threshold: 1 for the bright class, 0 otherwise
pub fn otsu_binarize<T: Pixel>(image: &Matrix<T>) -> Matrix<u8> {
    let t = otsu_threshold(image);
    threshold(image, t, f64::INFINITY)
}

/// Count of non-zero elements
pub fn count_non_zero<T: Pixel>(image: &Matrix<T>) -> usize {
    let zero = T::default();
    let mut count = 0usize;
    image.for_each_row(|_, row| count += row.iter().filter(|&&v| v != zero).count());
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_over_region() {
        let m = Matrix::from_fn(5, 5, |x, y| (x * 10 + y) as i32 - 20);
        assert_eq!(range(&m), Some((-20, 24)));
        let window = m.region(1, 1, 2, 2).unwrap();
        assert_eq!(range(&window), Some((-9, 2)));
        assert_eq!(range(&Matrix::<u8>::new(0, 3)), None);
    }

    #[test]
    fn test_threshold_band() {
        let m = Matrix::from_vec(4, 1, vec![10u8, 50, 100, 200]).unwrap();
        assert_eq!(threshold(&m, 50.0, 150.0).to_vec(), vec![0, 1, 1, 0]);
    }

    #[test]
    fn test_threshold_inverted_band() {
        let m = Matrix::from_vec(4, 1, vec![100u8, 30, 150, 50]).unwrap();
        assert_eq!(threshold(&m, 150.0, 50.0).to_vec(), vec![0, 1, 1, 1]);
    }

    #[test]
    fn test_threshold_single_negative() {
        let m = Matrix::from_vec(4, 1, vec![100.0f32, 150.0, 200.0, 50.0]).unwrap();
        assert_eq!(threshold_single(&m, 128.0).to_vec(), vec![0, 1, 1, 0]);
        assert_eq!(threshold_single(&m, -128.0).to_vec(), vec![1, 0, 0, 1]);
    }

    #[test]
    fn test_otsu_bimodal() {
        let mut values = vec![10u8; 60];
        values.extend(vec![200u8; 40]);
        let m = Matrix::from_vec(10, 10, values).unwrap();
        let t = otsu_threshold(&m);
        assert!(t > 10.0 && t < 200.0, "threshold {}", t);

        let binary = otsu_binarize(&m);
        assert_eq!(binary.get(0, 0), 0);
        assert_eq!(binary.get(0, 9), 1);
    }

    #[test]
    fn test_otsu_noisy_clusters_split_between() {
        let m = Matrix::from_fn(40, 40, |x, y| {
            let jitter = ((x * 7 + y * 13) % 9) as f32;
            if y < 20 { 20.0 + jitter } else { 180.0 + jitter }
        });
        let t = otsu_threshold(&m);
        assert!(t > 28.0 && t <= 180.0, "threshold {}", t);
    }

    #[test]
    fn test_otsu_constant_image() {
        let m = Matrix::filled(8, 8, 77.0f32);
        assert_eq!(otsu_threshold(&m), 77.0);
        let binary = otsu_binarize(&m);
        assert_eq!(count_non_zero(&binary), 64);
    }
}
