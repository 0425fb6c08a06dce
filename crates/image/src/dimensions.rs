//! Target dimension calculation for resize requests.
//!
//! Pure arithmetic with no error path: anything malformed degrades to the
//! source dimensions.

use serde::{Deserialize, Serialize};

/// Which single dimension drives a proportional resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AspectRatio {
    /// Fix the width, derive the height
    Width(u32),
    /// Fix the height, derive the width
    Height(u32),
    /// Multiply both dimensions
    Scale(f64),
}

/// How a resize maps source dimensions onto target dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "ResizeRequest", into = "ResizeRequest")]
pub enum ResizeOption {
    /// Keep the source aspect ratio
    AspectRatio(AspectRatio),
    /// Set each dimension independently; a missing one keeps the source value
    Stretch {
        /// Target width
        width: Option<u32>,
        /// Target height
        height: Option<u32>,
    },
}

impl ResizeOption {
    /// Proportional resize to `width` pixels wide
    pub fn width(width: u32) -> Self {
        Self::AspectRatio(AspectRatio::Width(width))
    }

    /// Proportional resize to `height` pixels tall
    pub fn height(height: u32) -> Self {
        Self::AspectRatio(AspectRatio::Height(height))
    }

    /// Proportional resize by `factor`
    ///
    /// A factor that takes either edge past
    /// [`MAX_SURFACE_DIMENSION`](crate::MAX_SURFACE_DIMENSION) makes
    /// [`ImageProcessor::resize`](crate::ImageProcessor::resize) resolve to `None`.
    pub fn scale(factor: f64) -> Self {
        Self::AspectRatio(AspectRatio::Scale(factor))
    }

    /// Independent resize of either dimension
    pub fn stretch(width: Option<u32>, height: Option<u32>) -> Self {
        Self::Stretch { width, height }
    }
}

/// Resize mode tag in the wire form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResizeMode {
    /// Proportional
    AspectRatio,
    /// Independent
    Stretch,
}

/// Flat wire form of [`ResizeOption`], as found in JSON or on the command line.
///
/// `{"mode":"aspectRatio","width":100}` or
/// `{"mode":"stretch","width":150,"height":150}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResizeRequest {
    /// Resize mode
    pub mode: ResizeMode,
    /// Target width
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Target height
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Scale factor, proportional mode only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
}

impl From<ResizeRequest> for ResizeOption {
    fn from(request: ResizeRequest) -> Self {
        match request.mode {
            ResizeMode::Stretch => ResizeOption::Stretch {
                width: request.width,
                height: request.height,
            },
            ResizeMode::AspectRatio => {
                let set = [
                    request.width.is_some(),
                    request.height.is_some(),
                    request.scale.is_some(),
                ]
                .iter()
                .filter(|set| **set)
                .count();
                if set > 1 {
                    tracing::warn!(
                        ?request,
                        "aspectRatio resize names several dimensions; using width, then height, then scale"
                    );
                }

                match (request.width, request.height, request.scale) {
                    (Some(width), _, _) => ResizeOption::width(width),
                    (None, Some(height), _) => ResizeOption::height(height),
                    (None, None, Some(scale)) => ResizeOption::scale(scale),
                    (None, None, None) => ResizeOption::stretch(None, None),
                }
            }
        }
    }
}

impl From<ResizeOption> for ResizeRequest {
    fn from(option: ResizeOption) -> Self {
        let (mode, width, height, scale) = match option {
            ResizeOption::AspectRatio(AspectRatio::Width(w)) => {
                (ResizeMode::AspectRatio, Some(w), None, None)
            }
            ResizeOption::AspectRatio(AspectRatio::Height(h)) => {
                (ResizeMode::AspectRatio, None, Some(h), None)
            }
            ResizeOption::AspectRatio(AspectRatio::Scale(s)) => {
                (ResizeMode::AspectRatio, None, None, Some(s))
            }
            ResizeOption::Stretch { width, height } => (ResizeMode::Stretch, width, height, None),
        };
        Self {
            mode,
            width,
            height,
            scale,
        }
    }
}

/// Computed target dimensions, before rounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeDimensions {
    /// Target width in pixels
    pub target_width: f64,
    /// Target height in pixels
    pub target_height: f64,
}

impl ResizeDimensions {
    fn source(width: u32, height: u32) -> Self {
        Self {
            target_width: f64::from(width),
            target_height: f64::from(height),
        }
    }

    /// Whole-pixel dimensions for the resize surface, at least 1x1.
    pub fn rounded(&self) -> (u32, u32) {
        (to_pixels(self.target_width), to_pixels(self.target_height))
    }
}

fn to_pixels(value: f64) -> u32 {
    if !value.is_finite() {
        return 1;
    }
    // `as` saturates at u32::MAX
    (value.round() as u32).max(1)
}

/// Compute the target dimensions of a resize.
///
/// Proportional modes preserve `source_width / source_height` up to floating
/// point. In stretch mode a missing or zero dimension keeps its source value.
pub fn calc_resize_dimensions(
    source_width: u32,
    source_height: u32,
    option: &ResizeOption,
) -> ResizeDimensions {
    let source = ResizeDimensions::source(source_width, source_height);
    if source_width == 0 || source_height == 0 {
        return source;
    }

    let (w, h) = (f64::from(source_width), f64::from(source_height));

    match *option {
        ResizeOption::AspectRatio(AspectRatio::Width(width)) if width > 0 => {
            let width = f64::from(width);
            ResizeDimensions {
                target_width: width,
                target_height: h * width / w,
            }
        }
        ResizeOption::AspectRatio(AspectRatio::Height(height)) if height > 0 => {
            let height = f64::from(height);
            ResizeDimensions {
                target_width: w * height / h,
                target_height: height,
            }
        }
        ResizeOption::AspectRatio(AspectRatio::Scale(scale)) if scale.is_finite() && scale > 0.0 => {
            ResizeDimensions {
                target_width: w * scale,
                target_height: h * scale,
            }
        }
        ResizeOption::Stretch { width, height } => ResizeDimensions {
            target_width: width.filter(|v| *v > 0).map_or(w, f64::from),
            target_height: height.filter(|v| *v > 0).map_or(h, f64::from),
        },
        ResizeOption::AspectRatio(_) => source,
    }
}
