/// Type-erased views
pub mod any_matrix;
/// Shared-buffer matrix views
pub mod matrix;
/// Pixel trait and type tags
pub mod pixel;
/// Points and boxes
pub mod point;

pub use any_matrix::AnyMatrix;
pub use matrix::{Matrix, SharedBuffer};
pub use pixel::{Pixel, PixelKind};
pub use point::{BoundingBox, Point, PointI};
