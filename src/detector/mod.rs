//! Component analysis of binarized images
//!
//! - Connected-component labelling into an object map
//! - Boundary tracing and polygon reduction of each component

/// Two-pass labelling, per-object statistics and extraction
pub mod connected_components;
/// Moore-neighbour boundary tracing and Douglas-Peucker reduction
pub mod contour;
