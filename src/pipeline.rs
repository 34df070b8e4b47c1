//! MRZ extraction pipeline
//!
//! A single linear pass: luminance, blur, black-hat, horizontal gradient,
//! contrast stretch, line close, Otsu, band close, labelling, then a filter
//! loop over the largest components. Every valid-mode stage shrinks the
//! working image, so the pipeline carries the working origin in original
//! image coordinates and uses it to re-centre the final crop.

use tracing::{debug, instrument, trace};

use crate::config::MrzConfig;
use crate::detector::connected_components::{ObjectInfo, ObjectMap};
use crate::error::Result;
use crate::models::{AnyMatrix, BoundingBox, Matrix};
use crate::utils::binarization::{otsu_binarize, otsu_threshold, range};
use crate::utils::channels::{abs, contrast_stretch};
use crate::utils::convolution::{gaussian_blur, vertical_edges};
use crate::utils::morphology::{black_hat, close};

/// A located MRZ band
#[derive(Debug, Clone)]
pub struct MrzRegion {
    /// Window of the black-hat ("for OCR") image covering the band
    pub crop: Matrix<f32>,
    /// The band in original image coordinates
    pub bounding_box: BoundingBox,
    /// The winning component, in band-image coordinates
    pub object: ObjectInfo,
}

/// Why the filter loop rejected a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// `width / height` below the configured minimum
    AspectRatio,
    /// Narrower than the configured fraction of the working width
    Width,
    /// Reduced contour is not a quadrilateral
    Shape,
}

/// Counters collected by one pipeline run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineTelemetry {
    /// Components produced by labelling
    pub candidates: usize,
    /// Candidates examined before one was accepted
    pub examined: usize,
    /// Candidates rejected as too square
    pub rejected_aspect: usize,
    /// Candidates rejected as too narrow
    pub rejected_width: usize,
    /// Candidates whose outline did not reduce to a quadrilateral
    pub rejected_shape: usize,
    /// Otsu threshold used for binarization
    pub otsu_threshold: f64,
    /// True when the pipeline stopped at a flat gradient image
    pub flat_input: bool,
}

impl PipelineTelemetry {
    fn record(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::AspectRatio => self.rejected_aspect += 1,
            Rejection::Width => self.rejected_width += 1,
            Rejection::Shape => self.rejected_shape += 1,
        }
    }
}

/// Every intermediate image of one run, for diagnosis
#[derive(Debug, Clone)]
pub struct StagedResult {
    /// Float luminance of the input
    pub luminance: Matrix<f32>,
    /// Gaussian-blurred luminance
    pub blurred: Matrix<f32>,
    /// Black-hat output, the source of the final crop
    pub for_ocr: Matrix<f32>,
    /// Stretched gradient magnitude
    pub gradient: Matrix<f32>,
    /// Gradient after closing the character gaps
    pub lines: Matrix<f32>,
    /// Otsu binarization of `lines`
    pub binary: Matrix<u8>,
    /// Binary image after closing the line gaps
    pub band: Matrix<u8>,
    /// `None` when the pipeline stopped at a flat gradient
    pub objects: Option<ObjectMap>,
    /// Origin of `band` in original image coordinates
    pub band_origin: (usize, usize),
    /// The accepted band, if any
    pub region: Option<MrzRegion>,
    /// Counters for the run
    pub telemetry: PipelineTelemetry,
}

/// MRZ locator with configuration
#[derive(Debug, Clone, Default)]
pub struct MrzLocator {
    config: MrzConfig,
}

impl MrzLocator {
    /// Create a locator with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a locator with explicit settings
    pub fn with_config(config: MrzConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    pub fn config(&self) -> &MrzConfig {
        &self.config
    }

    /// Locate the MRZ band; `Ok(None)` when no candidate qualifies
    pub fn locate(&self, image: &AnyMatrix) -> Result<Option<MrzRegion>> {
        Ok(self.locate_staged(image)?.region)
    }

    /// [`MrzLocator::locate`] plus the run's counters
    pub fn locate_with_telemetry(&self, image: &AnyMatrix) -> Result<(Option<MrzRegion>, PipelineTelemetry)> {
        let staged = self.locate_staged(image)?;
        Ok((staged.region, staged.telemetry))
    }

    /// Run the pipeline and keep every intermediate image
    ///
    /// Packed ARGB input is converted to luminance first; other element
    /// types are used as grey values.
    #[instrument(level = "debug", skip_all, fields(width = image.width(), height = image.height(), kind = image.kind().name()))]
    pub fn locate_staged(&self, image: &AnyMatrix) -> Result<StagedResult> {
        let config = &self.config;
        let (width, height) = (image.width(), image.height());
        let luminance = image.to_f32();
        let mut origin = (0usize, 0usize);

        let blurred = gaussian_blur(&luminance, config.blur_radius)?;
        origin = shifted(origin, config.blur_radius, config.blur_radius);
        debug!(w = blurred.width(), h = blurred.height(), "blurred");

        let (bx, by) = MrzConfig::blackhat_radii(width, height);
        let for_ocr = black_hat(&blurred, bx, by)?;
        origin = shifted(origin, 2 * bx, 2 * by);
        let for_ocr_origin = origin;
        debug!(w = for_ocr.width(), h = for_ocr.height(), rx = bx, ry = by, "black-hat");

        let mut gradient = vertical_edges(&for_ocr, config.edge_operator)?;
        origin = shifted(origin, 1, 1);
        abs(&mut gradient);

        let mut telemetry = PipelineTelemetry::default();
        let flat = range(&gradient).is_none_or(|(lo, hi)| hi <= lo);
        contrast_stretch(&mut gradient, config.stretch_max);
        debug!(w = gradient.width(), h = gradient.height(), flat, "gradient");

        let (lx, ly) = MrzConfig::line_close_radii(width, height);
        let lines = close(&gradient, lx, ly)?;
        origin = shifted(origin, 2 * lx, 2 * ly);

        telemetry.otsu_threshold = otsu_threshold(&lines);
        let binary = otsu_binarize(&lines);
        debug!(threshold = telemetry.otsu_threshold, "binarized");

        let (cx, cy) = MrzConfig::band_close_radii(width, height);
        let band = close(&binary, cx, cy)?;
        origin = shifted(origin, 2 * cx, 2 * cy);
        debug!(w = band.width(), h = band.height(), origin = ?origin, "band image");

        let mut staged = StagedResult {
            luminance,
            blurred,
            for_ocr,
            gradient,
            lines,
            binary,
            band,
            objects: None,
            band_origin: origin,
            region: None,
            telemetry,
        };

        if flat {
            // Nothing varies along the rows, so there is no text band
            debug!("flat gradient, no MRZ");
            staged.telemetry.flat_input = true;
            return Ok(staged);
        }

        let objects = ObjectMap::build(&staged.band, config.connectivity);
        staged.telemetry.candidates = objects.len();

        let min_width = config.min_width_fraction * staged.band.width() as f64;
        let offset = (origin.0 - for_ocr_origin.0, origin.1 - for_ocr_origin.1);
        let mut region = None;

        for object in objects.sorted_by_size() {
            staged.telemetry.examined += 1;
            if let Some(rejection) = self.reject(object, min_width) {
                trace!(label = object.label, pixels = object.pixel_count, ?rejection, "candidate rejected");
                staged.telemetry.record(rejection);
                continue;
            }

            let crop = objects.extract_with_offset(object.label, &staged.for_ocr, offset.0, offset.1)?;
            let bounding_box = object.bounding_box().translate(origin.0, origin.1);
            debug!(label = object.label, bbox = ?bounding_box, "MRZ located");
            region = Some(MrzRegion {
                crop,
                bounding_box,
                object: object.clone(),
            });
            break;
        }

        if region.is_none() {
            debug!(candidates = staged.telemetry.candidates, "no candidate qualified");
        }
        staged.region = region;
        staged.objects = Some(objects);
        Ok(staged)
    }

    fn reject(&self, object: &ObjectInfo, min_width: f64) -> Option<Rejection> {
        if object.aspect_ratio() < self.config.min_aspect_ratio {
            return Some(Rejection::AspectRatio);
        }
        if (object.width as f64) < min_width {
            return Some(Rejection::Width);
        }
        let corners = object.contour.reduce(self.config.contour_tolerance).len();
        if corners != self.config.required_corners {
            return Some(Rejection::Shape);
        }
        None
    }
}

fn shifted(origin: (usize, usize), dx: usize, dy: usize) -> (usize, usize) {
    (origin.0 + dx, origin.1 + dy)
}

/// Locate the MRZ with default settings
pub fn extract_mrz_region(image: &AnyMatrix) -> Result<Option<MrzRegion>> {
    MrzLocator::new().locate(image)
}

/// Locate the MRZ in a packed ARGB image with default settings
pub fn extract_mrz_region_argb(image: &Matrix<u32>) -> Result<Option<MrzRegion>> {
    extract_mrz_region(&AnyMatrix::U32(image.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::contour::Contour;
    use crate::models::PointI;

    fn object(width: usize, height: usize, corners: &[(i32, i32)]) -> ObjectInfo {
        ObjectInfo {
            label: 1,
            pixel_count: width * height,
            x: 0,
            y: 0,
            width,
            height,
            contour: Contour::new(corners.iter().map(|&(x, y)| PointI::new(x, y)).collect()),
        }
    }

    #[test]
    fn test_reject_reasons() {
        let locator = MrzLocator::new();
        let rect = [(0, 0), (299, 0), (299, 39), (0, 39)];
        assert_eq!(locator.reject(&object(300, 40, &rect), 200.0), None);
        assert_eq!(
            locator.reject(&object(100, 40, &rect), 50.0),
            Some(Rejection::AspectRatio)
        );
        assert_eq!(locator.reject(&object(300, 40, &rect), 301.0), Some(Rejection::Width));

        let triangle = [(0, 0), (299, 0), (150, 39)];
        assert_eq!(
            locator.reject(&object(300, 40, &triangle), 200.0),
            Some(Rejection::Shape)
        );
    }

    #[test]
    fn test_blank_image_is_not_found() {
        let blank: AnyMatrix = Matrix::filled(415, 600, 180u8).into();
        let (region, telemetry) = MrzLocator::new().locate_with_telemetry(&blank).unwrap();
        assert!(region.is_none());
        assert!(telemetry.flat_input);
        assert_eq!(telemetry.candidates, 0);
    }

    #[test]
    fn test_tiny_image_is_invalid() {
        // Smaller than the blur kernel
        let tiny: AnyMatrix = Matrix::<u8>::new(6, 6).into();
        assert!(extract_mrz_region(&tiny).is_err());
    }

    #[test]
    fn test_staged_extents_shrink_consistently() {
        let image: AnyMatrix = Matrix::from_fn(415, 600, |x, y| ((x * 7 + y * 3) % 255) as u8).into();
        let staged = MrzLocator::new().locate_staged(&image).unwrap();
        assert_eq!((staged.blurred.width(), staged.blurred.height()), (409, 594));
        assert_eq!((staged.for_ocr.width(), staged.for_ocr.height()), (385, 586));
        assert_eq!((staged.band.width(), staged.band.height()), (319, 536));
        assert_eq!(staged.band_origin, (48, 32));
    }
}
