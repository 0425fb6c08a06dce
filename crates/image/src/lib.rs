//! Image metadata extraction, limit validation and resizing.
//!
//! This crate provides:
//! - Metadata reading from in-memory files or paths
//! - Per-field limit validation with handlers and a pluggable reporter
//! - Target dimension calculation for proportional and stretch resizes
//! - Resizing with a bounded retry loop
//! - Format detection from magic bytes
//!
//! ```no_run
//! use picpik_image::{read_image_metadata_from_path, resize_image, Limit, ResizeOption};
//!
//! # async fn demo() {
//! let limit = Limit::new().max_width(4_000).max_size(5_000_000);
//! if let Some(metadata) = read_image_metadata_from_path("danbi.jpg", Some(&limit)).await {
//!     let thumbnail = resize_image(&metadata, &ResizeOption::width(320)).await;
//! }
//! # }
//! ```

#![warn(missing_docs)]

mod codec;
mod data_url;
mod detect;
mod dimensions;
mod error;
mod file;
mod input;
mod metadata;
mod processor;
mod report;
mod resize;
mod validate;

#[cfg(test)]
mod test_support;

pub use codec::{ImageCodec, RasterCodec, MAX_SURFACE_DIMENSION};
pub use data_url::{DataUrl, FALLBACK_MIME_TYPE};
pub use detect::{detect_format, ImageFormat};
pub use dimensions::{
    calc_resize_dimensions, AspectRatio, ResizeDimensions, ResizeMode, ResizeOption, ResizeRequest,
};
pub use error::{ImageError, Result};
pub use file::ImageFile;
pub use input::{check_file_type, InputKind};
pub use metadata::{read_image_metadata, read_image_metadata_from_path, ImageMetadata};
pub use processor::ImageProcessor;
pub use report::{NoopReporter, Reporter, TracingReporter};
pub use resize::{resize_image, ResizedImage};
pub use validate::{
    validate_image_file, validate_image_file_with, ErrorHandler, Limit, LimitField, LimitRule,
    ValidateError,
};

/// `DynamicImage` as used by [`RasterCodec`]
pub use image::DynamicImage;
