//! Image quality pipeline.
//!
//! bytes → decode → orientation → resize → grayscale → metrics → decision.
//! Every stage is a pure function of its input; nothing is shared between
//! invocations except the read-only `ThresholdConfig` passed in by reference.

pub mod decision;
pub mod decode;
pub mod grayscale;
pub mod metrics;
pub mod orchestrator;
pub mod orientation;
pub mod resize;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use decision::*;
pub use orchestrator::*;
pub use types::*;

use thiserror::Error;

/// Terminal pipeline failures. None are retried; each maps to one HTTP status.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QualityError {
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Payload of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("Invalid image data: {0}")]
    InvalidImageData(String),
}

impl QualityError {
    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            QualityError::UnsupportedMediaType(_) => "UNSUPPORTED_MEDIA_TYPE",
            QualityError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            QualityError::InvalidImageData(_) => "INVALID_IMAGE_DATA",
        }
    }
}
