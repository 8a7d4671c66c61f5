//! Error types for pixel buffer operations.

use thiserror::Error;

/// Errors raised while allocating, converting or scaling pixel data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PixelBufferError {
    /// Pixel storage could not be obtained (overflow or memory exhaustion).
    #[error("Allocation failed: {0}")]
    Allocation(String),

    /// Mask or pixel data could not be decoded.
    #[error("Conversion failed: {0}")]
    Conversion(String),

    /// Resampling between two images failed.
    #[error("Scaling failed: {0}")]
    Scale(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PixelBufferError::Conversion("invalid xorBpp 7".to_string());
        assert_eq!(err.to_string(), "Conversion failed: invalid xorBpp 7");

        let err = PixelBufferError::Allocation("4096 bytes".to_string());
        assert!(err.to_string().starts_with("Allocation failed"));
    }
}
