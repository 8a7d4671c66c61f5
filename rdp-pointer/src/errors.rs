//! Error types for the pointer pipeline.

use rdp_pixelbuffer::PixelBufferError;
use thiserror::Error;

/// Errors that can occur while creating, scaling or installing a pointer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PointerError {
    /// Buffer or surface allocation failed.
    #[error("Allocation failed: {0}")]
    Allocation(String),

    /// XOR/AND mask decoding failed.
    #[error("Conversion failed: {0}")]
    Conversion(String),

    /// Coordinate or size scaling could not be computed.
    #[error("Scaling failed: {0}")]
    Scale(String),

    /// Resampling or native cursor construction failed.
    #[error("Cursor build failed: {0}")]
    Build(String),

    /// The UI side of the pointer channel has gone away.
    #[error("Pointer channel disconnected")]
    Disconnected,
}

impl PointerError {
    /// Returns true for resource exhaustion, the only condition that should
    /// be surfaced to the caller as a hard failure.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Allocation(_))
    }
}

impl From<PixelBufferError> for PointerError {
    fn from(err: PixelBufferError) -> Self {
        match err {
            PixelBufferError::Allocation(msg) => Self::Allocation(msg),
            PixelBufferError::Conversion(msg) => Self::Conversion(msg),
            PixelBufferError::Scale(msg) => Self::Build(msg),
        }
    }
}
