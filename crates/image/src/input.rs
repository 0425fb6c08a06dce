//! Input kind checks.

use std::convert::Infallible;
use std::path::Path;
use std::str::FromStr;

/// What an input source points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    /// A regular file
    File,
    /// A directory
    Directory,
    /// Anything else, named
    Other(String),
}

impl InputKind {
    /// Kind of the filesystem entry at `path`, following symlinks.
    pub async fn of_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let metadata = tokio::fs::metadata(path).await?;
        Ok(Self::from(&metadata.file_type()))
    }

    /// True for regular files
    pub fn is_file(&self) -> bool {
        matches!(self, InputKind::File)
    }
}

impl From<&std::fs::FileType> for InputKind {
    fn from(file_type: &std::fs::FileType) -> Self {
        if file_type.is_file() {
            InputKind::File
        } else if file_type.is_dir() {
            InputKind::Directory
        } else if file_type.is_symlink() {
            InputKind::Other("symlink".into())
        } else {
            InputKind::Other("special".into())
        }
    }
}

/// Parses HTML-style input type names; only `file` is a file.
impl FromStr for InputKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "file" => InputKind::File,
            "directory" | "dir" => InputKind::Directory,
            other => InputKind::Other(other.to_string()),
        })
    }
}

/// True when `kind` is a file; otherwise logs and returns false.
pub fn check_file_type(kind: &InputKind) -> bool {
    if kind.is_file() {
        true
    } else {
        tracing::error!(?kind, "The input type is not file");
        false
    }
}
