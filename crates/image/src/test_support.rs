//! Shared fixtures and doubles for the unit tests.

use crate::codec::{ImageCodec, RasterCodec};
use crate::detect::ImageFormat;
use crate::file::ImageFile;
use crate::metadata::ImageMetadata;
use crate::report::Reporter;
use crate::validate::ValidateError;
use crate::{ImageError, Result};
use image::{DynamicImage, Rgba, RgbaImage};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

// =========================================================================
// Fixtures
// =========================================================================

/// Encode a `width` x `height` gradient in `format`.
pub fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let raster = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    });
    ImageCodec::default()
        .encode(&DynamicImage::ImageRgba8(raster), format)
        .unwrap()
}

/// Metadata with arbitrary dimensions and a `size`-byte source.
///
/// The source bytes are zeros, so `src` does not decode.
pub fn metadata(name: &str, width: u32, height: u32, size: usize) -> ImageMetadata {
    let file = ImageFile::new(name, vec![0; size]);
    let src = file.to_data_url();
    ImageMetadata::from_decoded(&file, src, width, height)
}

// =========================================================================
// Doubles
// =========================================================================

/// Records every diagnostic it receives.
#[derive(Default)]
pub struct RecordingReporter {
    validations: Mutex<Vec<ValidateError>>,
    attempt_failures: Mutex<Vec<u32>>,
    exhausted: Mutex<Vec<u32>>,
    refused: Mutex<Vec<(u32, u32)>>,
}

impl RecordingReporter {
    pub fn validations(&self) -> Vec<ValidateError> {
        self.validations.lock().unwrap().clone()
    }

    /// Attempt numbers of failed resize attempts
    pub fn attempt_failures(&self) -> Vec<u32> {
        self.attempt_failures.lock().unwrap().clone()
    }

    /// Attempt counts of exhausted resizes
    pub fn exhausted(&self) -> Vec<u32> {
        self.exhausted.lock().unwrap().clone()
    }

    /// Surfaces refused before any attempt
    pub fn refused(&self) -> Vec<(u32, u32)> {
        self.refused.lock().unwrap().clone()
    }
}

impl Reporter for RecordingReporter {
    fn validation_failed(&self, error: &ValidateError) {
        self.validations.lock().unwrap().push(*error);
    }

    fn resize_attempt_failed(&self, _name: &str, attempt: u32, _max_attempts: u32, _error: &ImageError) {
        self.attempt_failures.lock().unwrap().push(attempt);
    }

    fn resize_exhausted(&self, _name: &str, attempts: u32, _error: &ImageError) {
        self.exhausted.lock().unwrap().push(attempts);
    }

    fn resize_refused(&self, _name: &str, error: &ImageError) {
        if let ImageError::Surface { width, height, .. } = error {
            self.refused.lock().unwrap().push((*width, *height));
        }
    }
}

/// Delegates to a real codec but fails the first `failures` encodes.
pub struct FlakyCodec {
    inner: ImageCodec,
    failures: u32,
    encode_calls: AtomicU32,
}

impl FlakyCodec {
    pub fn new(inner: ImageCodec, failures: u32) -> Self {
        Self {
            inner,
            failures,
            encode_calls: AtomicU32::new(0),
        }
    }

    pub fn encode_calls(&self) -> u32 {
        self.encode_calls.load(Ordering::SeqCst)
    }
}

impl RasterCodec for FlakyCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage> {
        self.inner.decode(bytes)
    }

    fn resample(&self, image: &DynamicImage, width: u32, height: u32) -> Result<DynamicImage> {
        self.inner.resample(image, width, height)
    }

    fn encode(&self, image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
        let call = self.encode_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.failures {
            return Err(ImageError::Encode {
                format: format.mime_type(),
                reason: format!("injected failure {call}"),
            });
        }
        self.inner.encode(image, format)
    }

    fn can_encode(&self, format: ImageFormat) -> bool {
        self.inner.can_encode(format)
    }

    fn check_surface(&self, width: u32, height: u32) -> Result<()> {
        self.inner.check_surface(width, height)
    }
}
