//! Caller-side parallelism over independent images
//!
//! Buffer views are `Rc`-backed and never leave the thread that built them.
//! Work crosses threads as owned pixel vectors; each image is processed
//! start to finish on one rayon worker.

use rayon::prelude::*;
use tracing::debug;

use crate::config::MrzConfig;
use crate::error::Result;
use crate::models::{AnyMatrix, BoundingBox, Matrix};
use crate::pipeline::{MrzLocator, MrzRegion};

/// Owned packed-ARGB raster
#[derive(Debug, Clone, PartialEq)]
pub struct ArgbImage {
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
    /// Row-major, `width * height` pixels
    pub pixels: Vec<u32>,
}

impl ArgbImage {
    /// Wrap raw pixels; the length is checked by [`ArgbImage::to_matrix`]
    pub fn new(width: usize, height: usize, pixels: Vec<u32>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Copy a view into an owned image
    pub fn from_matrix(matrix: &Matrix<u32>) -> Self {
        Self::new(matrix.width(), matrix.height(), matrix.to_vec())
    }

    /// View over a copy of the pixels
    pub fn to_matrix(&self) -> Result<Matrix<u32>> {
        Matrix::from_vec(self.width, self.height, self.pixels.clone())
    }
}

/// Owned copy of a located MRZ band
#[derive(Debug, Clone, PartialEq)]
pub struct MrzCrop {
    /// The band in original image coordinates
    pub bounding_box: BoundingBox,
    /// Crop width
    pub width: usize,
    /// Crop height
    pub height: usize,
    /// Row-major black-hat values of the band
    pub pixels: Vec<f32>,
}

impl From<&MrzRegion> for MrzCrop {
    fn from(region: &MrzRegion) -> Self {
        Self {
            bounding_box: region.bounding_box,
            width: region.crop.width(),
            height: region.crop.height(),
            pixels: region.crop.to_vec(),
        }
    }
}

/// Locate the MRZ in every image on the rayon pool
///
/// Results are in input order; one image failing does not affect the rest.
pub fn locate_batch(images: &[ArgbImage], config: &MrzConfig) -> Vec<Result<Option<MrzCrop>>> {
    debug!(images = images.len(), "batch start");
    images
        .par_iter()
        .map(|image| -> Result<Option<MrzCrop>> {
            let locator = MrzLocator::with_config(config.clone());
            let matrix = AnyMatrix::U32(image.to_matrix()?);
            Ok(locator.locate(&matrix)?.as_ref().map(MrzCrop::from))
        })
        .collect()
}
