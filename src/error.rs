//! Error taxonomy for the image engine
//!
//! Only precondition violations are errors. Degenerate inputs (constant
//! images, zero-sum kernels) are handled in place, and a pipeline that finds
//! no MRZ reports `Ok(None)`.

use thiserror::Error;

/// Errors raised by buffer views and the algorithms built on them
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MrzError {
    /// A caller passed arguments the operation cannot accept
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A requested window is not contained in its source view
    #[error(
        "region ({x}, {y}) {width}x{height} is outside the {source_width}x{source_height} view"
    )]
    OutOfBounds {
        /// Requested left edge
        x: usize,
        /// Requested top edge
        y: usize,
        /// Requested width
        width: usize,
        /// Requested height
        height: usize,
        /// Width of the view the region was taken from
        source_width: usize,
        /// Height of the view the region was taken from
        source_height: usize,
    },
}

impl MrzError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, MrzError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_message() {
        let err = MrzError::OutOfBounds {
            x: 4,
            y: 5,
            width: 10,
            height: 2,
            source_width: 8,
            source_height: 8,
        };
        assert_eq!(
            err.to_string(),
            "region (4, 5) 10x2 is outside the 8x8 view"
        );
    }

    #[test]
    fn test_invalid_argument_message() {
        let err = MrzError::invalid("transform must be 3x3");
        assert_eq!(err.to_string(), "invalid argument: transform must be 3x3");
    }
}
