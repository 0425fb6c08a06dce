//! In-memory file handles.

use crate::data_url::DataUrl;
use crate::detect::{detect_format, ImageFormat};
use crate::metadata::extension_of;
use crate::Result;
use chrono::{DateTime, Utc};
use std::path::Path;

/// A named, fully materialized file.
///
/// This is the unit the reader consumes and the resizer produces. The bytes
/// are owned; `size` is always their exact length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    name: String,
    bytes: Vec<u8>,
    mime_type: String,
    last_modified: DateTime<Utc>,
}

impl ImageFile {
    /// Wrap `bytes` under `name`, stamped now.
    ///
    /// The MIME type is sniffed from the bytes, then guessed from the
    /// extension, and left empty when neither works.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime_type = guess_mime_type(&name, &bytes);
        Self {
            name,
            bytes,
            mime_type,
            last_modified: Utc::now(),
        }
    }

    /// Override the MIME type
    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Override the modification timestamp
    #[must_use]
    pub fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = last_modified;
        self
    }

    /// Read a file from disk.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let modified = tokio::fs::metadata(path).await?.modified().ok();

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let file = Self::new(name, bytes);
        Ok(match modified {
            Some(time) => file.with_last_modified(time.into()),
            None => file,
        })
    }

    /// Write the bytes to `path`.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        tokio::fs::write(path, &self.bytes).await?;
        Ok(())
    }

    /// Materialize the contents as a self-contained data URL
    pub fn to_data_url(&self) -> DataUrl {
        DataUrl::encode(&self.mime_type, &self.bytes)
    }

    /// File name, unaltered
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lowercase extension, empty when the name has none
    pub fn extension(&self) -> String {
        extension_of(&self.name)
    }

    /// Raw bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size in bytes
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// MIME type, possibly empty
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Last modification time
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }
}

fn guess_mime_type(name: &str, bytes: &[u8]) -> String {
    detect_format(bytes)
        .ok()
        .or_else(|| ImageFormat::from_extension(&extension_of(name)))
        .map(|format| format.mime_type().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::encoded;

    #[test]
    fn test_new_sniffs_mime_type() {
        let file = ImageFile::new("photo.bin", encoded(4, 4, ImageFormat::Png));
        assert_eq!(file.mime_type(), "image/png");
        assert_eq!(file.extension(), "bin");
    }

    #[test]
    fn test_new_falls_back_to_extension() {
        let file = ImageFile::new("danbi.JPEG", b"not really a jpeg".to_vec());
        assert_eq!(file.mime_type(), "image/jpeg");
        assert_eq!(file.extension(), "jpeg");
    }

    #[test]
    fn test_unknown_mime_is_empty() {
        let file = ImageFile::new("notes", b"plain text".to_vec());
        assert_eq!(file.mime_type(), "");
        assert_eq!(file.to_data_url().mime_type(), "application/octet-stream");
    }

    #[test]
    fn test_size_is_byte_length() {
        let file = ImageFile::new("a.png", vec![0; 84_000]);
        assert_eq!(file.size(), 84_000);
    }

    #[tokio::test]
    async fn test_open_and_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("danbi.png");
        let original = ImageFile::new("danbi.png", encoded(3, 2, ImageFormat::Png));
        original.save(&path).await.unwrap();

        let reopened = ImageFile::open(&path).await.unwrap();
        assert_eq!(reopened.name(), "danbi.png");
        assert_eq!(reopened.bytes(), original.bytes());
        assert_eq!(reopened.mime_type(), "image/png");
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ImageFile::open(dir.path().join("missing.png")).await.unwrap_err();
        assert!(matches!(err, crate::ImageError::IoError(_)));
    }
}
