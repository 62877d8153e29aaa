//! JSON output types for CLI responses.
//!
//! ## Design Principles
//!
//! 1. **Status first:** every response has `status` as its first field
//! 2. **Deterministic:** same input, same output (index lists are sorted by kind, then key)
//! 3. **Versioned:** `schema_version` enables forward compatibility

use std::io::{self, Write};

use serde::Serialize;

use crate::engine::{FinalizeReport, SessionStats};
use crate::error::{IndexError, OutputErrorCode};
use crate::registry::IndexKind;
use crate::writer::WrittenIndex;

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

/// Error details in an error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Resource or file the error refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ErrorInfo {
    pub fn from_error(err: &IndexError) -> Self {
        let path = match err {
            IndexError::Io { path, .. }
            | IndexError::InvalidResourcePath { path, .. }
            | IndexError::Manifest { path, .. }
            | IndexError::Config { path, .. } => Some(path.clone()),
            IndexError::InvalidArguments { .. }
            | IndexError::UnresolvedRoot { .. }
            | IndexError::InternalError { .. } => None,
        };
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
            path,
        }
    }
}

/// Error response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn from_error(err: &IndexError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

/// Response for the `index` command.
#[derive(Debug, Clone, Serialize)]
pub struct IndexResponse {
    pub status: String,
    pub schema_version: String,
    /// ISO 8601 UTC timestamp of the run.
    pub generated_at: String,
    pub output_dir: String,
    /// True when no explicit registration was configured.
    pub annotation_driven: bool,
    pub stats: SessionStats,
    pub indexes: Vec<WrittenIndex>,
}

impl IndexResponse {
    pub fn new(
        output_dir: impl Into<String>,
        annotation_driven: bool,
        stats: SessionStats,
        report: FinalizeReport,
    ) -> Self {
        IndexResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            generated_at: format_timestamp(chrono::Utc::now()),
            output_dir: output_dir.into(),
            annotation_driven,
            stats,
            indexes: report.indexes,
        }
    }
}

/// Response for the `paths` command.
#[derive(Debug, Clone, Serialize)]
pub struct PathResponse {
    pub status: String,
    pub schema_version: String,
    pub kind: IndexKind,
    pub key: String,
    pub path: String,
}

impl PathResponse {
    pub fn new(kind: IndexKind, key: impl Into<String>, path: impl Into<String>) -> Self {
        PathResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            kind,
            key: key.into(),
            path: path.into(),
        }
    }
}

/// Format a timestamp for JSON output (ISO 8601, second precision).
pub fn format_timestamp(time: chrono::DateTime<chrono::Utc>) -> String {
    time.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Emit a response as pretty JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}
