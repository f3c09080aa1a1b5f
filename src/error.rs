//! Error types for rowsync

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, extracting, or aligning telemetry
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("cannot access {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed document {}: {message}", .path.display())]
    DocumentParse { path: PathBuf, message: String },

    #[error("{}: expected <{expected}> element not found", .path.display())]
    Schema { path: PathBuf, expected: &'static str },

    #[error("{}: missing required field {field}", .path.display())]
    MissingField { path: PathBuf, field: &'static str },

    #[error("{}: field {field} has unparseable value {value:?}", .path.display())]
    FieldParse {
        path: PathBuf,
        field: &'static str,
        value: String,
    },

    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("insufficient data for alignment: {0}")]
    InsufficientData(String),

    #[error("failed to write report: {0}")]
    Report(#[from] csv::Error),
}
