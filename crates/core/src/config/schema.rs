//! Configuration schema definitions
//!
//! Everything here deserializes from `.picpik.toml`. Every section and field is
//! optional; missing values fall back to the defaults below.

use serde::{Deserialize, Serialize};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    #[serde(default)]
    pub limits: LimitConfig,

    #[serde(default)]
    pub resize: ResizeConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Maximum accepted values for a selected image.
///
/// A missing field means the value is unconstrained. `size` is in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LimitConfig {
    /// Maximum width in pixels
    #[serde(default)]
    pub width: Option<u64>,

    /// Maximum height in pixels
    #[serde(default)]
    pub height: Option<u64>,

    /// Maximum file size in bytes
    #[serde(default)]
    pub size: Option<u64>,
}

impl LimitConfig {
    /// True when no field is constrained
    pub fn is_empty(&self) -> bool {
        self.width.is_none() && self.height.is_none() && self.size.is_none()
    }

    /// Overlay `other` on top of `self`; fields set in `other` win.
    #[must_use]
    pub fn merged_with(self, other: LimitConfig) -> LimitConfig {
        LimitConfig {
            width: other.width.or(self.width),
            height: other.height.or(self.height),
            size: other.size.or(self.size),
        }
    }
}

/// Resampling filter used when drawing onto the resize surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResampleFilter {
    Nearest,
    #[default]
    Bilinear,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

/// Resize configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResizeConfig {
    /// Resampling filter
    #[serde(default)]
    pub filter: ResampleFilter,

    /// JPEG encode quality (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    /// Attempts made before a resize gives up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            filter: ResampleFilter::default(),
            jpeg_quality: default_jpeg_quality(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_jpeg_quality() -> u8 {
    90
}

fn default_max_attempts() -> u32 {
    3
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level filter, overridden by `RUST_LOG`
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of the compact format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
