//! Error types for buffer/matrix conversion, blurring and screen grabbing
//!
//! The public convenience entry points never surface these errors: they log a
//! warning and hand back an empty or unchanged value. The `try_*` entry points
//! and the building blocks underneath them return [`BridgeResult`] so callers
//! that want to branch on the failure can do so.

use crate::{mat::ElemType, model::PixelFormat};

/// Result type alias for conversion, filtering and capture operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Error type for every fallible operation in the crate
///
/// Each variant carries the context needed to explain the failure, and
/// [`remediation_hint()`](BridgeError::remediation_hint) suggests a next step.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The buffer's pixel format has no matrix equivalent
    #[error("Pixel format {format} is not supported for matrix conversion")]
    UnsupportedFormat {
        /// Format tag of the rejected buffer
        format: PixelFormat,
    },

    /// The matrix element type has no buffer equivalent
    #[error("Matrix element type {elem_type} is not supported for buffer conversion")]
    UnsupportedElemType {
        /// Element type of the rejected matrix
        elem_type: ElemType,
    },

    /// Invalid parameter provided
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: String,
        /// Reason why it's invalid
        reason:    String,
    },

    /// Pixel storage is shorter than the declared geometry requires
    #[error("Pixel storage too small: need {expected} bytes, got {actual}")]
    BufferTooSmall {
        /// Bytes required by rows * stride
        expected: usize,
        /// Bytes actually supplied
        actual:   usize,
    },

    /// Image encoding failed
    #[error("Failed to encode image as {format}: {reason}")]
    EncodingFailed {
        /// Container format that failed
        format: String,
        /// Reason for encoding failure
        reason: String,
    },

    /// Encoded bytes could not be decoded into pixels
    #[error("Failed to decode image: {reason}")]
    DecodingFailed {
        /// Reason for decoding failure
        reason: String,
    },

    /// The screen provider reported no screens at all
    #[error("No screens available for capture")]
    NoScreens,

    /// Grabbing a screen region failed
    #[error("Capture of screen '{screen}' failed: {reason}")]
    CaptureFailed {
        /// Name of the screen being grabbed
        screen: String,
        /// Reason for the failure
        reason: String,
    },

    /// No capture backend compiled in or usable on this platform
    #[error("Capture backend '{backend}' is not available")]
    BackendNotAvailable {
        /// Backend name
        backend: String,
    },

    /// I/O error occurred
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Image processing error
    #[error("Image processing error: {0}")]
    ImageError(String),
}

impl BridgeError {
    /// Returns an actionable remediation hint for this error
    ///
    /// # Examples
    ///
    /// ```
    /// use pixmat::{error::BridgeError, model::PixelFormat};
    ///
    /// let error = BridgeError::UnsupportedFormat {
    ///     format: PixelFormat::Mono,
    /// };
    ///
    /// assert!(error.remediation_hint().contains("convert_to_format"));
    /// ```
    pub fn remediation_hint(&self) -> &str {
        match self {
            BridgeError::UnsupportedFormat { .. } => {
                "Only Grayscale8, Rgb32, Argb32, Argb32Premultiplied, Rgb888 and Rgba64 buffers \
                 map onto a matrix. Call convert_to_format() on the buffer first."
            }
            BridgeError::UnsupportedElemType { .. } => {
                "Only 8-bit 1/3/4-channel and 16-bit 4-channel matrices map onto a buffer. \
                 Convert the matrix to one of those element types first."
            }
            BridgeError::InvalidParameter { parameter, .. } => match parameter.as_str() {
                "ksize" => "Kernel size must be a positive odd number no wider than 2049.",
                "radius" => "Blur radius must be between 1 and 1024.",
                "region" => "The capture rectangle must overlap the selected screen.",
                _ => "Check the parameter value against the API documentation.",
            },
            BridgeError::BufferTooSmall { .. } => {
                "The byte slice must hold at least rows * stride bytes, and the stride must \
                 cover one full row of pixels."
            }
            BridgeError::EncodingFailed { format, .. } => match format.as_str() {
                "jpeg" => "JPEG encoding failed. Try PNG, which is lossless and keeps alpha.",
                "webp" => "WebP encoding is lossless only. Try PNG as a fallback.",
                _ => "Image encoding failed. Try a different container format.",
            },
            BridgeError::DecodingFailed { .. } => {
                "The bytes are not a readable PNG, JPEG, BMP or WebP image. Check that the file \
                 is complete and of a supported type."
            }
            BridgeError::NoScreens => {
                "No screens were reported. Make sure a display server is running and reachable."
            }
            BridgeError::CaptureFailed { .. } => {
                "Screen grabbing failed. Check screen recording permissions for this process."
            }
            BridgeError::BackendNotAvailable { .. } => {
                "Rebuild with the `xcap-backend` feature to grab real screens, or supply your own \
                 ScreenProvider."
            }
            BridgeError::IoError(_) => {
                "An I/O error occurred. Check file paths, permissions and disk space."
            }
            BridgeError::ImageError(_) => {
                "Image processing failed. Ensure the image data is valid and the requested \
                 operation is supported."
            }
        }
    }
}

impl From<image::ImageError> for BridgeError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => BridgeError::IoError(e),
            image::ImageError::Decoding(e) => BridgeError::DecodingFailed {
                reason: e.to_string(),
            },
            other => BridgeError::ImageError(other.to_string()),
        }
    }
}
