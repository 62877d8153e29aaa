//! Error types and error code constants for classindex.
//!
//! This module provides a unified error type (`IndexError`) for every
//! fallible operation of an indexing session, plus the stable numeric codes
//! the CLI uses for its exit status and JSON error envelope.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad flags, malformed resource paths)
//! - `3`: Resolution errors (manifest unreadable, root declaration unknown)
//! - `4`: I/O errors (resource write failed, sidecar write failed)
//! - `10`: Internal errors (bugs, unexpected state)
//!
//! Reading a pre-existing index file never produces an `IndexError`: missing,
//! unsupported and failed reads are all folded into empty prior contents by
//! the writer. Only writes are fatal.

use std::fmt;
use std::io;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output and CLI exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed request).
    InvalidArguments = 2,
    /// Resolution errors (manifest not found, unknown root declaration).
    ResolutionError = 3,
    /// I/O errors while persisting index or documentation resources.
    IoError = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for an indexing session.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// A resource path escapes the build-output root or is otherwise unusable.
    #[error("invalid resource path '{path}': {reason}")]
    InvalidResourcePath { path: String, reason: String },

    /// A declaration manifest could not be read or parsed.
    #[error("manifest error at {path}: {message}")]
    Manifest { path: String, message: String },

    /// A round names a root declaration the manifest does not define.
    #[error("unresolved root declaration: {name}")]
    UnresolvedRoot { name: String },

    /// Configuration file could not be loaded.
    #[error("config error at {path}: {message}")]
    Config { path: String, message: String },

    /// I/O failure while writing a resource.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

/// Result type for indexing operations.
pub type IndexResult<T> = Result<T, IndexError>;

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&IndexError> for OutputErrorCode {
    fn from(err: &IndexError) -> Self {
        match err {
            IndexError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            IndexError::InvalidResourcePath { .. } => OutputErrorCode::InvalidArguments,
            IndexError::Config { .. } => OutputErrorCode::InvalidArguments,
            IndexError::Manifest { .. } => OutputErrorCode::ResolutionError,
            IndexError::UnresolvedRoot { .. } => OutputErrorCode::ResolutionError,
            IndexError::Io { .. } => OutputErrorCode::IoError,
            IndexError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<IndexError> for OutputErrorCode {
    fn from(err: IndexError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl IndexError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        IndexError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Wrap an I/O error with the resource path it occurred on.
    pub fn io(path: impl Into<String>, source: io::Error) -> Self {
        IndexError::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a manifest error.
    pub fn manifest(path: impl Into<String>, message: impl Into<String>) -> Self {
        IndexError::Manifest {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        IndexError::InternalError {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod error_code_mapping {
        use super::*;

        #[test]
        fn invalid_arguments_maps_to_invalid_arguments() {
            let err = IndexError::invalid_args("unknown index kind");
            assert_eq!(
                OutputErrorCode::from(&err),
                OutputErrorCode::InvalidArguments
            );
            assert_eq!(err.error_code().code(), 2);
        }

        #[test]
        fn unresolved_root_maps_to_resolution_error() {
            let err = IndexError::UnresolvedRoot {
                name: "com.example.Missing".to_string(),
            };
            assert_eq!(err.error_code(), OutputErrorCode::ResolutionError);
            assert_eq!(err.error_code().code(), 3);
        }

        #[test]
        fn manifest_maps_to_resolution_error() {
            let err = IndexError::manifest("decls.json", "expected value");
            assert_eq!(err.error_code(), OutputErrorCode::ResolutionError);
        }

        #[test]
        fn io_maps_to_io_error() {
            let err = IndexError::io(
                "META-INF/annotated/com.example.Tag",
                io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
            );
            assert_eq!(err.error_code(), OutputErrorCode::IoError);
            assert_eq!(err.error_code().code(), 4);
        }

        #[test]
        fn internal_error_maps_to_internal_error() {
            let err = IndexError::internal("unexpected state");
            assert_eq!(OutputErrorCode::from(&err), OutputErrorCode::InternalError);
            assert_eq!(err.error_code().code(), 10);
        }
    }

    mod error_display {
        use super::*;

        #[test]
        fn io_display_includes_path() {
            let err = IndexError::io(
                "META-INF/subclasses/com.example.Base",
                io::Error::other("disk full"),
            );
            assert_eq!(
                err.to_string(),
                "I/O error at META-INF/subclasses/com.example.Base: disk full"
            );
        }

        #[test]
        fn invalid_resource_path_display() {
            let err = IndexError::InvalidResourcePath {
                path: "../escape".to_string(),
                reason: "parent directory component".to_string(),
            };
            assert_eq!(
                err.to_string(),
                "invalid resource path '../escape': parent directory component"
            );
        }
    }

    #[test]
    fn display_shows_code() {
        assert_eq!(format!("{}", OutputErrorCode::InvalidArguments), "2");
        assert_eq!(format!("{}", OutputErrorCode::IoError), "4");
        assert_eq!(format!("{}", OutputErrorCode::InternalError), "10");
    }
}
