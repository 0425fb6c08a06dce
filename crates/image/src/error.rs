//! Error types for the image crate.

use picpik_core::ErrorCode;
use thiserror::Error;

/// Result type alias for image operations.
pub type Result<T> = std::result::Result<T, ImageError>;

/// Errors that can occur during image operations.
#[derive(Debug, Error)]
pub enum ImageError {
    /// Unknown image format
    #[error("Unknown image format")]
    UnknownFormat,

    /// Invalid image data
    #[error("Invalid image data: {0}")]
    InvalidData(String),

    /// Malformed or non-base64 data URL
    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    /// Raster could not be decoded
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// Resize surface could not be acquired
    #[error("Failed to acquire {width}x{height} surface: {reason}")]
    Surface {
        /// Requested surface width
        width: u32,
        /// Requested surface height
        height: u32,
        /// Why the surface was refused
        reason: String,
    },

    /// Surface could not be encoded
    #[error("Failed to encode {format}: {reason}")]
    Encode {
        /// MIME type that was requested
        format: &'static str,
        /// Encoder message
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Blocking codec task panicked or was cancelled
    #[error("Codec task failed: {0}")]
    Task(String),

    /// Image processing error
    #[error("Image processing error: {0}")]
    ProcessingError(#[from] image::ImageError),
}

impl From<ImageError> for picpik_core::Error {
    fn from(err: ImageError) -> Self {
        let code = match &err {
            ImageError::Decode(_)
            | ImageError::UnknownFormat
            | ImageError::InvalidData(_)
            | ImageError::InvalidDataUrl(_) => ErrorCode::DecodeFailed,
            ImageError::Encode { .. } | ImageError::Surface { .. } => ErrorCode::EncodeFailed,
            ImageError::IoError(_) => ErrorCode::IoError,
            ImageError::Task(_) => ErrorCode::Internal,
            ImageError::ProcessingError(_) => ErrorCode::ImageError,
        };
        picpik_core::Error::new(code, err.to_string()).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_error_message() {
        let err = ImageError::Surface {
            width: 0,
            height: 10,
            reason: "zero-sized".into(),
        };
        assert_eq!(err.to_string(), "Failed to acquire 0x10 surface: zero-sized");
    }

    #[test]
    fn test_core_error_codes() {
        let core: picpik_core::Error = ImageError::Decode("truncated".into()).into();
        assert_eq!(core.code, ErrorCode::DecodeFailed);

        let core: picpik_core::Error = ImageError::Encode {
            format: "image/png",
            reason: "boom".into(),
        }
        .into();
        assert_eq!(core.code, ErrorCode::EncodeFailed);
    }
}
