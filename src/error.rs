//! Error types for label generation.
//!
//! Every failure in the pipeline is local and synchronous: the caller of the
//! generation step receives one of these and nothing partial is emitted.

use thiserror::Error;

/// Result type alias for label operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for label generation.
#[derive(Error, Debug)]
pub enum Error {
    /// A physical size, DPI or coordinate was negative, zero where a
    /// positive value is required, or not finite.
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),

    /// The bitmap has no pixels on at least one axis.
    ///
    /// Raised before anything reaches the emitter so a zero-length
    /// graphic field is never produced.
    #[error("Bitmap is empty ({width}x{height})")]
    EmptyBitmap { width: u32, height: u32 },

    /// The source image could not be loaded or decoded.
    ///
    /// Callers presenting this to a user should offer a re-upload.
    #[error("Failed to decode image: {0}")]
    DecodeFailure(String),

    /// The scaled image overshoots the label by more than the clamping
    /// tolerance.
    #[error(
        "Scaled image {scaled_width}x{scaled_height} does not fit label {label_width}x{label_height}"
    )]
    FitOverflow {
        scaled_width: u32,
        scaled_height: u32,
        label_width: u32,
        label_height: u32,
    },

    /// The packer and the emitter disagree on the byte count of a field.
    ///
    /// This is a logic defect, not a property of the input.
    #[error("Encoding mismatch: expected {expected} bytes, found {actual}")]
    EncodingMismatch { expected: usize, actual: usize },

    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Invalid configuration parameter: {0}")]
    InvalidConfig(String),

    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    #[error(transparent)]
    Storage(#[from] std::io::Error),

    #[error("Preview service error: {0}")]
    Preview(String),
}

impl Error {
    /// Check if this error indicates a bug rather than bad input.
    ///
    /// Retrying the same deterministic computation cannot succeed either way,
    /// but internal errors deserve a louder report.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::EncodingMismatch { .. })
    }

    /// Check if the user should be asked to supply the image again.
    pub fn suggests_reupload(&self) -> bool {
        matches!(self, Self::DecodeFailure(_))
    }
}
