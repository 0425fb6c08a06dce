//! Dimension-preserving resize with bounded retry.

use crate::detect::ImageFormat;
use crate::dimensions::{calc_resize_dimensions, ResizeOption};
use crate::file::ImageFile;
use crate::metadata::ImageMetadata;
use crate::processor::ImageProcessor;
use crate::Result;
use chrono::Utc;
use picpik_core::retry::retry_async;
use serde::Serialize;

/// A resized file together with its freshly read metadata
#[derive(Debug, Clone, Serialize)]
pub struct ResizedImage {
    /// The encoded derivative
    #[serde(skip)]
    pub file: ImageFile,
    /// Metadata read back from the derivative
    pub metadata: ImageMetadata,
}

impl ImageProcessor {
    /// Resize the image behind `metadata`, keeping its name and, where the
    /// codec allows, its encoding.
    ///
    /// Attempts follow the processor's retry policy. `None` once every
    /// attempt has failed, or without any attempt when the codec refuses the
    /// target surface outright.
    pub async fn resize(&self, metadata: &ImageMetadata, option: &ResizeOption) -> Option<ImageFile> {
        let (width, height) =
            calc_resize_dimensions(metadata.width(), metadata.height(), option).rounded();
        if let Err(e) = self.codec().check_surface(width, height) {
            self.reporter().resize_refused(metadata.name(), &e);
            return None;
        }

        let max_attempts = self.retry().max_attempts.max(1);
        let this = self;
        let outcome = retry_async(
            self.retry(),
            move |attempt| {
                tracing::debug!(file = metadata.name(), attempt, "Resizing image");
                this.resize_once(metadata, option)
            },
            move |attempt, error| {
                this.reporter()
                    .resize_attempt_failed(metadata.name(), attempt, max_attempts, error);
            },
        )
        .await;

        match outcome {
            Ok(result) => {
                tracing::debug!(file = metadata.name(), attempts = result.attempts, "Resized image");
                Some(result.value)
            }
            Err(e) => {
                self.reporter()
                    .resize_exhausted(metadata.name(), e.attempts, &e.last_error);
                None
            }
        }
    }

    /// One attempt: decode, compute, resample, encode.
    async fn resize_once(&self, metadata: &ImageMetadata, option: &ResizeOption) -> Result<ImageFile> {
        let codec = self.codec();
        let src = metadata.src().clone();
        let (source_width, source_height) = (metadata.width(), metadata.height());
        let option = *option;
        let format = ImageFormat::from_extension(metadata.extension())
            .filter(|format| codec.can_encode(*format))
            .unwrap_or(ImageFormat::Png);

        let bytes = self
            .run_blocking(move || {
                let raster = codec.decode(&src.decode()?)?;
                let (width, height) =
                    calc_resize_dimensions(source_width, source_height, &option).rounded();
                let surface = codec.resample(&raster, width, height)?;
                codec.encode(&surface, format)
            })
            .await?;

        Ok(ImageFile::new(metadata.name(), bytes)
            .with_mime_type(format.mime_type())
            .with_last_modified(Utc::now()))
    }

    /// Resize, then read the derivative's metadata without limits.
    pub async fn resize_and_read(
        &self,
        metadata: &ImageMetadata,
        option: &ResizeOption,
    ) -> Option<ResizedImage> {
        let file = self.resize(metadata, option).await?;
        let metadata = self.read_metadata(&file, None).await?;
        Some(ResizedImage { file, metadata })
    }
}

/// Resize the image behind `metadata` with the default processor.
pub async fn resize_image(metadata: &ImageMetadata, option: &ResizeOption) -> Option<ImageFile> {
    ImageProcessor::default().resize(metadata, option).await
}
