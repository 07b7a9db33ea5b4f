//! Error types for the marshalling filesystem.

use std::io;

/// Boxed error returned by injected marshal and generate functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Filesystem error type with contextual variants.
///
/// Every variant carries the operation and the path (or pattern) involved,
/// enough for a caller to rebuild a readable message.
/// Uses `#[non_exhaustive]` for forward compatibility.
///
/// # Examples
///
/// ```rust
/// use marshalfs::FsError;
///
/// let err = FsError::NotFound { path: "missing.json".into(), operation: "open" };
/// assert_eq!(err.to_string(), "open: not found: missing.json");
/// assert!(err.is_not_found());
/// ```
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    // Resolution Errors
    /// No entry, no generator and no descendant matched the path.
    #[error("{operation}: not found: {path}")]
    NotFound {
        /// The path that was not found.
        path: String,
        /// The operation that failed.
        operation: &'static str,
    },

    /// The path is malformed (absolute, empty segment, `.`/`..`, trailing slash).
    #[error("{operation}: invalid path: {path:?}")]
    InvalidPath {
        /// The rejected path.
        path: String,
        /// The operation that failed.
        operation: &'static str,
    },

    /// Out-of-range offset, or an operation the handle does not support.
    #[error("{operation}: invalid argument: {path}")]
    InvalidArgument {
        /// The path of the handle.
        path: String,
        /// The operation that failed.
        operation: &'static str,
    },

    /// A directory operation was attempted on a regular file.
    #[error("{operation}: not a directory: {path}")]
    NotADirectory {
        /// The path that is not a directory.
        path: String,
        /// The operation that failed.
        operation: &'static str,
    },

    // Injected Function Errors
    /// The marshal function failed to encode the value.
    #[error("{operation} {path}: encoding failed: {source}")]
    Encoding {
        /// The operation that failed.
        operation: &'static str,
        /// The file being materialized.
        path: String,
        /// The underlying encoder error.
        #[source]
        source: BoxError,
    },

    /// The generator function failed for a reason other than "no such item".
    #[error("{operation} {path}: generator failed: {source}")]
    Generator {
        /// The operation that failed.
        operation: &'static str,
        /// The path the generator was asked for.
        path: String,
        /// The underlying generator error.
        #[source]
        source: BoxError,
    },

    // Table Errors
    /// A file path is also used as an ancestor directory of another path.
    #[error("path conflict: {path} is a file but {descendant} lies beneath it")]
    PathConflict {
        /// The path used both as a file and as a directory.
        path: String,
        /// A table path beneath it.
        descendant: String,
    },

    /// A generator pattern could not be compiled.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Why the pattern was rejected.
        reason: String,
    },

    // Data Errors
    /// File content is not what the caller asked for (e.g., not UTF-8).
    #[error("invalid data: {path} ({details})")]
    InvalidData {
        /// The path with invalid data.
        path: String,
        /// Details about the invalid data.
        details: String,
    },

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),
}

impl FsError {
    /// Returns `true` for the "does not exist" class of errors.
    ///
    /// Malformed paths count as non-existent: they can never name an entry.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::NotFound { .. } | FsError::InvalidPath { .. })
    }

    pub(crate) fn not_found(operation: &'static str, path: &str) -> Self {
        FsError::NotFound {
            path: path.to_string(),
            operation,
        }
    }

    pub(crate) fn invalid_path(operation: &'static str, path: &str) -> Self {
        FsError::InvalidPath {
            path: path.to_string(),
            operation,
        }
    }

    pub(crate) fn invalid_argument(operation: &'static str, path: &str) -> Self {
        FsError::InvalidArgument {
            path: path.to_string(),
            operation,
        }
    }
}

impl From<FsError> for io::Error {
    fn from(error: FsError) -> Self {
        let kind = match &error {
            FsError::NotFound { .. } | FsError::InvalidPath { .. } => io::ErrorKind::NotFound,
            FsError::InvalidArgument { .. } | FsError::InvalidPattern { .. } => {
                io::ErrorKind::InvalidInput
            }
            FsError::NotADirectory { .. } => io::ErrorKind::NotADirectory,
            FsError::InvalidData { .. } | FsError::Deserialization(_) => {
                io::ErrorKind::InvalidData
            }
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = FsError::not_found("open", "a/b");
        assert_eq!(err.to_string(), "open: not found: a/b");
    }

    #[test]
    fn invalid_path_is_not_found_class() {
        let err = FsError::invalid_path("open", "/abs");
        assert!(err.is_not_found());
        assert!(err.to_string().contains("\"/abs\""));
    }

    #[test]
    fn invalid_argument_is_not_not_found() {
        let err = FsError::invalid_argument("seek", "f");
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "seek: invalid argument: f");
    }

    #[test]
    fn path_conflict_display() {
        let err = FsError::PathConflict {
            path: "a/b".into(),
            descendant: "a/b/c".into(),
        };
        assert!(err.to_string().contains("a/b/c"));
    }

    #[test]
    fn encoding_error_keeps_source() {
        let err = FsError::Encoding {
            operation: "open",
            path: "x.json".into(),
            source: "boom".into(),
        };
        assert_eq!(err.to_string(), "open x.json: encoding failed: boom");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn io_error_kind_mapping() {
        let io_err: io::Error = FsError::not_found("open", "a").into();
        assert_eq!(io_err.kind(), io::ErrorKind::NotFound);

        let io_err: io::Error = FsError::invalid_argument("seek", "a").into();
        assert_eq!(io_err.kind(), io::ErrorKind::InvalidInput);

        let io_err: io::Error = FsError::Generator {
            operation: "open",
            path: "a".into(),
            source: "down".into(),
        }
        .into();
        assert_eq!(io_err.kind(), io::ErrorKind::Other);
    }
}
