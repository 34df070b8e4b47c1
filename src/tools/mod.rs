//! Developer tooling around the engine: image-file IO and quick statistics
//!
//! Codecs stay out of the engine proper; these helpers are what the
//! diagnostic binary and the benches use to get pixels in and out.

use crate::batch::ArgbImage;
use crate::models::{Matrix, Pixel};
use crate::utils::binarization::{count_non_zero, range};
use crate::utils::grayscale::rgba_to_argb;
use image::GenericImageView;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

fn max_dim_from_env() -> Option<u32> {
    match env::var("MRZ_MAX_DIM") {
        Ok(value) => match value.trim().parse::<u32>() {
            Ok(0) => None,
            Ok(v) => Some(v),
            Err(_) => None,
        },
        Err(_) => None,
    }
}

/// Load an image file as packed ARGB.
///
/// When `MRZ_MAX_DIM` is set, images whose longer side exceeds it are
/// downscaled first.
pub fn load_argb<P: AsRef<Path>>(path: P) -> Result<ArgbImage, image::ImageError> {
    let img = image::open(path)?;
    let img = match max_dim_from_env() {
        Some(max_dim) if img.dimensions().0.max(img.dimensions().1) > max_dim => {
            img.resize(max_dim, max_dim, image::imageops::FilterType::Triangle)
        }
        _ => img,
    };
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(ArgbImage::new(
        width as usize,
        height as usize,
        rgba_to_argb(rgba.as_raw()),
    ))
}

/// Save any view as an 8-bit greyscale image, stretching its range to 0..=255.
pub fn save_grey<T: Pixel, P: AsRef<Path>>(matrix: &Matrix<T>, path: P) -> Result<(), image::ImageError> {
    let (lo, hi) = range(matrix)
        .map(|(lo, hi)| (lo.to_f64(), hi.to_f64()))
        .unwrap_or((0.0, 0.0));
    let scale = if hi > lo { 255.0 / (hi - lo) } else { 0.0 };
    let values = matrix.to_vec();
    let width = matrix.width();
    let grey = image::GrayImage::from_fn(width as u32, matrix.height() as u32, |x, y| {
        let v = values[y as usize * width + x as usize].to_f64();
        image::Luma([((v - lo) * scale).round().clamp(0.0, 255.0) as u8])
    });
    grey.save(path)
}

/// Summary statistics for a view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreyStats {
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
    /// Mean value.
    pub mean: f64,
}

/// Summary statistics for a binary view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryStats {
    /// Count of set pixels.
    pub set_pixels: usize,
    /// Total pixels in the view.
    pub total_pixels: usize,
    /// Ratio of set pixels to total pixels.
    pub set_ratio: f64,
}

/// Compute min/max/mean over a view.
pub fn grey_stats<T: Pixel>(matrix: &Matrix<T>) -> GreyStats {
    let Some((min, max)) = range(matrix) else {
        return GreyStats {
            min: 0.0,
            max: 0.0,
            mean: 0.0,
        };
    };
    let mut sum = 0.0f64;
    matrix.for_each_row(|_, row| sum += row.iter().map(|v| v.to_f64()).sum::<f64>());
    GreyStats {
        min: min.to_f64(),
        max: max.to_f64(),
        mean: sum / matrix.len() as f64,
    }
}

/// Compute set-pixel stats for a binary view.
pub fn binary_stats(binary: &Matrix<u8>) -> BinaryStats {
    let set = count_non_zero(binary);
    let total = binary.len();
    let ratio = if total == 0 {
        0.0
    } else {
        set as f64 / total as f64
    };
    BinaryStats {
        set_pixels: set,
        total_pixels: total,
        set_ratio: ratio,
    }
}

/// Character cell used by [`render_text_rows`]: 6 px of ink, 4 px of gap.
pub const GLYPH_WIDTH: usize = 6;
/// Horizontal distance between glyph starts.
pub const GLYPH_PITCH: usize = 10;

/// Render rows of solid glyph blocks, a stand-in for printed MRZ text.
///
/// Each `(top, bottom)` row is filled with `ink` glyphs from `x_start`
/// while a whole glyph still fits before `x_end`; everything else is
/// `background`.
pub fn render_text_rows(
    width: usize,
    height: usize,
    background: u8,
    ink: u8,
    rows: &[(usize, usize)],
    x_start: usize,
    x_end: usize,
) -> Matrix<u8> {
    Matrix::from_fn(width, height, |x, y| {
        let in_row = rows.iter().any(|&(top, bottom)| y >= top && y < bottom);
        let in_glyph = x >= x_start && {
            let offset = (x - x_start) % GLYPH_PITCH;
            offset < GLYPH_WIDTH && x - offset + GLYPH_WIDTH <= x_end
        };
        if in_row && in_glyph { ink } else { background }
    })
}

/// Default dataset root from environment variables.
pub fn dataset_root_from_env() -> PathBuf {
    env::var("MRZ_DATASET_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("benches/images"))
}

/// Iterate image paths under `root`, sorted, with an optional limit.
pub fn dataset_iter<P: AsRef<Path>>(root: P, limit: Option<usize>) -> impl Iterator<Item = PathBuf> {
    let mut images = collect_images(root.as_ref());
    images.sort();
    if let Some(limit) = limit {
        images.truncate(limit);
    }
    images.into_iter()
}

fn collect_images(root: &Path) -> Vec<PathBuf> {
    let mut stack = vec![root.to_path_buf()];
    let mut images = Vec::new();

    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if let Some(ext) = path.extension() {
                let ext = ext.to_string_lossy().to_lowercase();
                if ext == "png" || ext == "jpg" || ext == "jpeg" || ext == "bmp" {
                    images.push(path);
                }
            }
        }
    }

    images
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static TEMP_FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_path(ext: &str) -> PathBuf {
        let mut path = env::temp_dir();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before UNIX epoch")
            .as_nanos();
        let sequence = TEMP_FILE_COUNTER.fetch_add(1, Ordering::Relaxed);
        path.push(format!("mrz_vision_tools_{nanos}_{sequence}.{ext}"));
        path
    }

    #[test]
    fn save_grey_then_load_argb() {
        let path = temp_path("png");
        let matrix = Matrix::from_fn(4, 2, |x, _| x as f32 * 10.0);
        save_grey(&matrix, &path).unwrap();

        let loaded = load_argb(&path).unwrap();
        assert_eq!((loaded.width, loaded.height), (4, 2));
        // 0..=30 is stretched to 0..=255
        assert_eq!(loaded.pixels[0], 0xFF00_0000);
        assert_eq!(loaded.pixels[3], 0xFFFF_FFFF);
        assert_eq!(loaded.pixels[1] & 0xFF, 85);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn stats_over_views() {
        let matrix = Matrix::from_vec(4, 1, vec![2u8, 4, 6, 8]).unwrap();
        let stats = grey_stats(&matrix);
        assert_eq!((stats.min, stats.max, stats.mean), (2.0, 8.0, 5.0));

        let binary = Matrix::from_vec(4, 1, vec![1u8, 0, 0, 1]).unwrap();
        let stats = binary_stats(&binary.region(1, 0, 3, 1).unwrap());
        assert_eq!(stats.set_pixels, 1);
        assert_eq!(stats.total_pixels, 3);
    }

    #[test]
    fn render_text_rows_layout() {
        let m = render_text_rows(40, 6, 200, 20, &[(1, 3)], 5, 27);
        assert_eq!(m.get(5, 1), 20);
        assert_eq!(m.get(10, 2), 20);
        assert_eq!(m.get(11, 1), 200);
        assert_eq!(m.get(15, 1), 20);
        // A glyph starting at 25 would end past 27
        assert_eq!(m.get(25, 1), 200);
        assert_eq!(m.get(5, 0), 200);
        assert_eq!(m.get(5, 3), 200);
    }

    #[test]
    fn dataset_iter_finds_images() {
        let dir = temp_path("d");
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("b.png"), b"").unwrap();
        fs::write(dir.join("nested").join("a.JPG"), b"").unwrap();
        fs::write(dir.join("notes.txt"), b"").unwrap();

        let found: Vec<PathBuf> = dataset_iter(&dir, None).collect();
        assert_eq!(found.len(), 2);
        assert_eq!(dataset_iter(&dir, Some(1)).count(), 1);
        let _ = fs::remove_dir_all(dir);
    }
}
