//! mrz_vision - locate the Machine-Readable Zone on identity documents
//!
//! A small matrix engine (strided, aliasing buffer views over shared
//! storage) and the image pipeline built on it: blur, black-hat,
//! gradient, Otsu binarization, morphological closing and connected-component
//! analysis, ending in a crop of the MRZ band ready for OCR.
//!
//! ```no_run
//! use mrz_vision::{Matrix, extract_mrz_region_argb};
//!
//! let pixels = vec![0xFFC8_C8C8u32; 415 * 600];
//! let image = Matrix::from_vec(415, 600, pixels).unwrap();
//! match extract_mrz_region_argb(&image).unwrap() {
//!     Some(region) => println!("MRZ at {:?}", region.bounding_box),
//!     None => println!("no MRZ"),
//! }
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Caller-side parallel processing of independent images
pub mod batch;
/// Pipeline configuration
pub mod config;
/// Connected components and contours
pub mod detector;
/// Error taxonomy
pub mod error;
/// Core data structures (Matrix, AnyMatrix, Pixel, points)
pub mod models;
/// MRZ extraction pipeline
pub mod pipeline;
/// Image-file IO and statistics for development
pub mod tools;
/// Image-processing primitives (arithmetic, convolution, morphology, geometry)
pub mod utils;

pub use config::MrzConfig;
pub use detector::connected_components::{Connectivity, ObjectInfo, ObjectMap};
pub use detector::contour::Contour;
pub use error::{MrzError, Result};
pub use models::{AnyMatrix, BoundingBox, Matrix, Pixel, PixelKind, Point, PointI};
pub use pipeline::{
    MrzLocator, MrzRegion, PipelineTelemetry, StagedResult, extract_mrz_region, extract_mrz_region_argb,
};
