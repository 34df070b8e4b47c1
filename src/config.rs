//! Pipeline configuration
//!
//! The structuring-element formulas are tuned against a 415x600 reference
//! document; the integer-division rounding is part of the tuning.

use crate::detector::connected_components::Connectivity;
use crate::utils::kernels::EdgeOperator;

/// Tunables for [`crate::pipeline::MrzLocator`]
#[derive(Debug, Clone, PartialEq)]
pub struct MrzConfig {
    /// Radius of the binomial pre-blur
    pub blur_radius: usize,
    /// Gradient operator applied to the black-hat image
    pub edge_operator: EdgeOperator,
    /// Upper bound of the contrast stretch
    pub stretch_max: f32,
    /// Smallest accepted `width / height` of a candidate
    pub min_aspect_ratio: f64,
    /// Smallest accepted candidate width as a fraction of the working width
    pub min_width_fraction: f64,
    /// Douglas-Peucker tolerance used by the quadrilateral test
    pub contour_tolerance: f64,
    /// Corner count a reduced contour must have
    pub required_corners: usize,
    /// Adjacency used when labelling the binarized band image
    pub connectivity: Connectivity,
}

impl Default for MrzConfig {
    fn default() -> Self {
        Self {
            blur_radius: 3,
            edge_operator: EdgeOperator::Scharr,
            stretch_max: 255.0,
            min_aspect_ratio: 5.0,
            min_width_fraction: 0.75,
            contour_tolerance: 10.0,
            required_corners: 4,
            connectivity: Connectivity::Eight,
        }
    }
}

impl MrzConfig {
    /// Black-hat radii, also used by the line-merging close
    ///
    /// Element sides are `(13W + 208) / 415` and `(5H + 300) / 600`.
    pub fn blackhat_radii(width: usize, height: usize) -> (usize, usize) {
        let side_x = (13 * width + 208) / 415;
        let side_y = (5 * height + 300) / 600;
        (side_x / 2, side_y / 2)
    }

    /// Radii of the close that merges character strokes into line blobs
    pub fn line_close_radii(width: usize, height: usize) -> (usize, usize) {
        Self::blackhat_radii(width, height)
    }

    /// Radii of the second close that merges line blobs into one band
    ///
    /// Element sides are `(21W + 208) / 415` and `(21H + 300) / 600`.
    pub fn band_close_radii(width: usize, height: usize) -> (usize, usize) {
        let side_x = (21 * width + 208) / 415;
        let side_y = (21 * height + 300) / 600;
        (side_x / 2, side_y / 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_resolution_radii() {
        assert_eq!(MrzConfig::blackhat_radii(415, 600), (6, 2));
        assert_eq!(MrzConfig::line_close_radii(415, 600), (6, 2));
        assert_eq!(MrzConfig::band_close_radii(415, 600), (10, 10));
    }

    #[test]
    fn test_radii_rounding() {
        // 13 * 200 + 208 = 2808, / 415 = 6 -> radius 3
        assert_eq!(MrzConfig::blackhat_radii(200, 100).0, 3);
        // 5 * 100 + 300 = 800, / 600 = 1 -> radius 0
        assert_eq!(MrzConfig::blackhat_radii(200, 100).1, 0);
        assert_eq!(MrzConfig::band_close_radii(0, 0), (0, 0));
    }

    #[test]
    fn test_defaults() {
        let config = MrzConfig::default();
        assert_eq!(config.blur_radius, 3);
        assert_eq!(config.connectivity, Connectivity::Eight);
        assert_eq!(config.required_corners, 4);
    }
}
