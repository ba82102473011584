//! Error types for index construction, persistence and querying.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the matching engine.
///
/// "No match" is never an error: queries that score nothing return `None`
/// or an empty list.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MatchError {
    /// Snapshot file could not be opened, created, read or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot bytes are not valid gzip or not the expected JSON shape.
    #[error("failed to decode snapshot: {0}")]
    Decode(String),

    /// Payload (or index) could not be serialized.
    #[error("failed to encode snapshot: {0}")]
    Encode(String),

    /// Snapshot decoded but violates an index invariant.
    #[error("corrupt snapshot: {0}")]
    Corrupt(String),

    /// The same key appeared twice in the candidate set.
    #[error("duplicate candidate key: {0:?}")]
    DuplicateKey(String),

    /// Substring sizes must be a non-empty list of positive lengths.
    #[error("invalid substring sizes: {0}")]
    InvalidSubstringSize(String),

    /// The scoring worker pool could not be started.
    #[error("failed to start worker pool: {0}")]
    ThreadPool(String),

    /// A query reached a shared index before any index was installed.
    #[error("index has not been initialized")]
    Uninitialized,
}

impl MatchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Attach `path` to an I/O error raised while streaming to or from it
    pub(crate) fn at_path(self, path: &std::path::Path) -> Self {
        match self {
            Self::Io { source, .. } => Self::io(path, source),
            other => other,
        }
    }

    /// Whether the error came from the filesystem rather than the content.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

/// Result type alias for matching operations.
pub type Result<T> = std::result::Result<T, MatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_mentions_path() {
        let err = MatchError::io(
            "/nope/index.gz",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.is_io());
        assert!(err.to_string().contains("/nope/index.gz"));
    }

    #[test]
    fn test_uninitialized_is_distinct_from_io() {
        assert!(!MatchError::Uninitialized.is_io());
        assert_eq!(
            MatchError::Uninitialized.to_string(),
            "index has not been initialized"
        );
    }
}
