//! Self-contained `data:` references.
//!
//! A [`DataUrl`] carries the full encoded bytes of a file, so a raster can be
//! decoded again without touching the original file.

use crate::{ImageError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// MIME type used when the source type is unknown
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// A base64 `data:<mime>;base64,<payload>` URL.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DataUrl {
    mime_type: String,
    payload: String,
}

impl DataUrl {
    /// Encode `bytes` under `mime_type`. An empty MIME type becomes
    /// `application/octet-stream`.
    pub fn encode(mime_type: &str, bytes: &[u8]) -> Self {
        Self::from_parts(mime_type, STANDARD.encode(bytes))
    }

    /// Parse a `data:` URL. Only the base64 form is accepted.
    pub fn parse(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| ImageError::InvalidDataUrl("missing `data:` scheme".into()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| ImageError::InvalidDataUrl("missing `,` separator".into()))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| ImageError::InvalidDataUrl("payload is not base64".into()))?;

        Ok(Self::from_parts(mime_type, payload.to_string()))
    }

    fn from_parts(mime_type: &str, payload: String) -> Self {
        let mime_type = if mime_type.is_empty() {
            FALLBACK_MIME_TYPE
        } else {
            mime_type
        };
        Self {
            mime_type: mime_type.to_string(),
            payload,
        }
    }

    /// MIME type from the URL header
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Decode the payload back into bytes
    pub fn decode(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(self.payload.as_bytes())
            .map_err(|e| ImageError::InvalidDataUrl(e.to_string()))
    }

    /// Length of the full URL string in bytes
    pub fn len(&self) -> usize {
        "data:".len() + self.mime_type.len() + ";base64,".len() + self.payload.len()
    }

    /// True when the payload is empty
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.payload)
    }
}

impl fmt::Debug for DataUrl {
    // Payloads are large; keep logs readable.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataUrl")
            .field("mime_type", &self.mime_type)
            .field("len", &self.len())
            .finish()
    }
}

impl FromStr for DataUrl {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DataUrl {
    type Error = ImageError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<DataUrl> for String {
    fn from(url: DataUrl) -> Self {
        url.to_string()
    }
}
