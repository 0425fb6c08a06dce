//! Raster decode, resample and encode.
//!
//! [`RasterCodec`] is the seam between the pipeline and the pixel work.
//! [`ImageCodec`] is the default, built on the `image` crate.

use crate::detect::ImageFormat;
use crate::{ImageError, Result};
use image::imageops::FilterType;
use image::DynamicImage;
use picpik_core::config::{ResampleFilter, ResizeConfig};
use std::io::Cursor;

/// Largest surface edge a codec will allocate, matching the canvas limit
/// of common browsers
pub const MAX_SURFACE_DIMENSION: u32 = 32_767;

/// Decodes, resamples and encodes rasters.
///
/// Called from blocking worker threads; implementations must not panic.
pub trait RasterCodec: Send + Sync {
    /// Decode encoded bytes into a raster.
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage>;

    /// Draw `image` onto a new `width` x `height` surface.
    fn resample(&self, image: &DynamicImage, width: u32, height: u32) -> Result<DynamicImage>;

    /// Encode `image` as `format`.
    fn encode(&self, image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>>;

    /// Whether [`encode`](Self::encode) supports `format`.
    fn can_encode(&self, format: ImageFormat) -> bool;

    /// Refuse surfaces that [`resample`](Self::resample) can never allocate.
    ///
    /// Checked once before any attempt, so a refusal does not spend retries.
    fn check_surface(&self, width: u32, height: u32) -> Result<()> {
        let refuse = |reason: &str| ImageError::Surface {
            width,
            height,
            reason: reason.to_string(),
        };
        if width == 0 || height == 0 {
            return Err(refuse("zero-sized surface"));
        }
        if width > MAX_SURFACE_DIMENSION || height > MAX_SURFACE_DIMENSION {
            return Err(refuse("surface too large"));
        }
        Ok(())
    }
}

/// [`RasterCodec`] backed by the `image` crate.
#[derive(Debug, Clone, Copy)]
pub struct ImageCodec {
    filter: FilterType,
    jpeg_quality: u8,
}

impl Default for ImageCodec {
    fn default() -> Self {
        Self {
            filter: FilterType::Triangle,
            jpeg_quality: 90,
        }
    }
}

impl ImageCodec {
    /// Codec with the configured filter and JPEG quality
    pub fn from_config(config: &ResizeConfig) -> Self {
        Self {
            filter: filter_type(config.filter),
            jpeg_quality: config.jpeg_quality.clamp(1, 100),
        }
    }
}

fn filter_type(filter: ResampleFilter) -> FilterType {
    match filter {
        ResampleFilter::Nearest => FilterType::Nearest,
        ResampleFilter::Bilinear => FilterType::Triangle,
        ResampleFilter::CatmullRom => FilterType::CatmullRom,
        ResampleFilter::Gaussian => FilterType::Gaussian,
        ResampleFilter::Lanczos3 => FilterType::Lanczos3,
    }
}

impl RasterCodec for ImageCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage> {
        image::load_from_memory(bytes).map_err(|e| ImageError::Decode(e.to_string()))
    }

    fn resample(&self, image: &DynamicImage, width: u32, height: u32) -> Result<DynamicImage> {
        self.check_surface(width, height)?;
        Ok(image.resize_exact(width, height, self.filter))
    }

    fn encode(&self, image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
        let output = format
            .output_format(self.jpeg_quality)
            .ok_or_else(|| ImageError::Encode {
                format: format.mime_type(),
                reason: "no encoder for this format".into(),
            })?;

        let mut buffer = Cursor::new(Vec::new());
        let written = match format {
            // JPEG has no alpha channel
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()).write_to(&mut buffer, output),
            _ => image.write_to(&mut buffer, output),
        };
        written.map_err(|e| ImageError::Encode {
            format: format.mime_type(),
            reason: e.to_string(),
        })?;

        Ok(buffer.into_inner())
    }

    fn can_encode(&self, format: ImageFormat) -> bool {
        format.output_format(self.jpeg_quality).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::detect_format;
    use crate::test_support::encoded;

    #[test]
    fn test_decode_dimensions() {
        let codec = ImageCodec::default();
        let image = codec.decode(&encoded(217, 232, ImageFormat::Png)).unwrap();
        assert_eq!((image.width(), image.height()), (217, 232));
    }

    #[test]
    fn test_decode_garbage() {
        let err = ImageCodec::default().decode(b"garbage").unwrap_err();
        assert!(matches!(err, ImageError::Decode(_)));
    }

    #[test]
    fn test_resample_exact() {
        let codec = ImageCodec::default();
        let image = DynamicImage::new_rgba8(217, 232);
        let resized = codec.resample(&image, 150, 150).unwrap();
        assert_eq!((resized.width(), resized.height()), (150, 150));
    }

    #[test]
    fn test_resample_refuses_bad_surface() {
        let codec = ImageCodec::default();
        let image = DynamicImage::new_rgba8(4, 4);
        assert!(matches!(
            codec.resample(&image, 0, 4),
            Err(ImageError::Surface { width: 0, .. })
        ));
        assert!(matches!(
            codec.resample(&image, MAX_SURFACE_DIMENSION + 1, 4),
            Err(ImageError::Surface { .. })
        ));
    }

    #[test]
    fn test_large_upscale_fits_surface() {
        let codec = ImageCodec::default();
        // 217x232 scaled by 80
        assert!(codec.check_surface(17_360, 18_560).is_ok());
        assert!(codec.check_surface(MAX_SURFACE_DIMENSION, 1).is_ok());
        assert!(codec.check_surface(MAX_SURFACE_DIMENSION + 1, 1).is_err());

        let wide = codec
            .resample(&DynamicImage::new_rgba8(100, 1), 20_000, 200)
            .unwrap();
        assert_eq!((wide.width(), wide.height()), (20_000, 200));
    }

    #[test]
    fn test_encode_formats() {
        let codec = ImageCodec::default();
        let image = DynamicImage::new_rgba8(8, 6);
        for format in [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Gif] {
            let bytes = codec.encode(&image, format).unwrap();
            assert_eq!(detect_format(&bytes).unwrap(), format);
        }
    }

    #[test]
    fn test_encode_unsupported() {
        let codec = ImageCodec::default();
        assert!(!codec.can_encode(ImageFormat::Heic));
        assert!(codec.can_encode(ImageFormat::Png));
        let err = codec
            .encode(&DynamicImage::new_rgba8(2, 2), ImageFormat::Tiff)
            .unwrap_err();
        assert!(matches!(err, ImageError::Encode { format: "image/tiff", .. }));
    }

    #[test]
    fn test_from_config() {
        let config = ResizeConfig {
            filter: ResampleFilter::Nearest,
            jpeg_quality: 0,
            ..ResizeConfig::default()
        };
        let codec = ImageCodec::from_config(&config);
        assert_eq!(codec.filter, FilterType::Nearest);
        assert_eq!(codec.jpeg_quality, 1);
    }
}
