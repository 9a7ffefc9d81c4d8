//! Error types for markdown conversion.

use std::io;
use std::path::PathBuf;

/// Errors that can occur while converting markdown.
///
/// Only the include extension touches the filesystem, so every variant except
/// [`UnknownEncoding`](MarkdownError::UnknownEncoding) carries the path that
/// failed.
#[derive(Debug, thiserror::Error)]
pub enum MarkdownError {
    /// An included file does not exist.
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// An included file exists but could not be read.
    #[error("failed to read \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The include encoding label is not known to `encoding_rs`.
    #[error("unknown text encoding: {0}")]
    UnknownEncoding(String),

    /// A file includes itself, directly or through other includes.
    #[error("include cycle detected at {}", path.display())]
    IncludeCycle { path: PathBuf },
}

impl MarkdownError {
    /// Maps an I/O failure on `path` to the matching variant.
    pub(crate) fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            MarkdownError::FileNotFound { path }
        } else {
            MarkdownError::Io { path, source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_file_not_found() {
        let err = MarkdownError::from_io(
            "missing.md",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, MarkdownError::FileNotFound { .. }));
        assert!(err.to_string().contains("missing.md"));
    }

    #[test]
    fn test_other_io_errors_keep_source() {
        let err = MarkdownError::from_io(
            "locked.md",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, MarkdownError::Io { .. }));
        assert!(std::error::Error::source(&err).is_some());
    }
}
