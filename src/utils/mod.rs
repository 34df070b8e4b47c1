//! Image-processing primitives
//!
//! This module provides the building blocks of the MRZ pipeline:
//! - Per-pixel arithmetic and ARGB channel extraction
//! - Valid-mode convolution and the fixed edge/sharpen/binomial kernels
//! - Range statistics, thresholding and Otsu binarization
//! - Rectangular-element morphology
//! - Quarter-turn rotation and projective resampling
//! - ARGB to luminance conversion

pub mod binarization;
pub mod channels;
pub mod convolution;
pub mod fixed_point;
pub mod geometry;
pub mod grayscale;
pub mod kernels;
pub mod morphology;
