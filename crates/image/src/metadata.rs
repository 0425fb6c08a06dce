//! Image metadata extraction.

use crate::data_url::DataUrl;
use crate::file::ImageFile;
use crate::processor::ImageProcessor;
use crate::validate::{validate_image_file_with, Limit, LimitField};
use crate::Result;
use serde::Serialize;
use std::path::Path;

/// What the reader learned about a decoded image.
///
/// Only produced after a successful decode, so the dimensions are those of
/// the decoded raster rather than a header guess.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageMetadata {
    width: u32,
    height: u32,
    size: u64,
    name: String,
    extension: String,
    src: DataUrl,
}

impl ImageMetadata {
    pub(crate) fn from_decoded(file: &ImageFile, src: DataUrl, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            size: file.size(),
            name: file.name().to_string(),
            extension: file.extension(),
            src,
        }
    }

    /// Decoded width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Decoded height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Source file size, always in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Original file name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lowercase extension, empty when the name has none
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Encoded source, decodable without the original file
    pub fn src(&self) -> &DataUrl {
        &self.src
    }

    /// Value of a limitable field
    pub fn field_value(&self, field: LimitField) -> u64 {
        match field {
            LimitField::Width => u64::from(self.width),
            LimitField::Height => u64::from(self.height),
            LimitField::Size => self.size,
        }
    }

    /// Calculate aspect ratio (width / height).
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Check if image is landscape orientation.
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }

    /// Check if image is portrait orientation.
    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }

    /// Check if image is square.
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }
}

/// Lowercase text after the last `.` of `name`, or empty.
pub(crate) fn extension_of(name: &str) -> String {
    name.rfind('.')
        .map(|dot| name[dot + 1..].to_ascii_lowercase())
        .unwrap_or_default()
}

impl ImageProcessor {
    /// Decode `file` and describe it. No validation.
    pub async fn load_metadata(&self, file: &ImageFile) -> Result<ImageMetadata> {
        let src = file.to_data_url();
        tracing::debug!(file = file.name(), bytes = file.size(), "Decoding image");

        let codec = self.codec();
        let url = src.clone();
        let (width, height) = self
            .run_blocking(move || {
                let bytes = url.decode()?;
                let raster = codec.decode(&bytes)?;
                Ok((raster.width(), raster.height()))
            })
            .await?;

        Ok(ImageMetadata::from_decoded(file, src, width, height))
    }

    /// Decode `file`, then check it against `limit` when one is given.
    ///
    /// `None` on any decode failure or failed limit; the reason goes to the
    /// log or to the reporter.
    pub async fn read_metadata(&self, file: &ImageFile, limit: Option<&Limit>) -> Option<ImageMetadata> {
        let metadata = match self.load_metadata(file).await {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::error!(file = file.name(), error = %e, "Failed to read image metadata");
                return None;
            }
        };

        if let Some(limit) = limit {
            if !validate_image_file_with(limit, &metadata, self.reporter()) {
                return None;
            }
        }

        Some(metadata)
    }

    /// Read the file at `path`, then behave as [`read_metadata`](Self::read_metadata).
    pub async fn read_metadata_from_path(
        &self,
        path: impl AsRef<Path>,
        limit: Option<&Limit>,
    ) -> Option<ImageMetadata> {
        let path = path.as_ref();
        match ImageFile::open(path).await {
            Ok(file) => self.read_metadata(&file, limit).await,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to read file");
                None
            }
        }
    }
}

/// Decode `file` and validate it against `limit`.
pub async fn read_image_metadata(file: &ImageFile, limit: Option<&Limit>) -> Option<ImageMetadata> {
    ImageProcessor::default().read_metadata(file, limit).await
}

/// Read `path` and validate it against `limit`.
pub async fn read_image_metadata_from_path(
    path: impl AsRef<Path>,
    limit: Option<&Limit>,
) -> Option<ImageMetadata> {
    ImageProcessor::default()
        .read_metadata_from_path(path, limit)
        .await
}
