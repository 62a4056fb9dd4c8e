use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Error type covering the failure points of a sync run, from resolving the
/// date window to publishing the extracted stats.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Raised when the caller supplies missing or inconsistent input. Always
    /// surfaced before any drive, cache, or spreadsheet activity.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Raised when a date does not follow the `YYYY-MM-DD` layout.
    #[error("invalid date '{input}', expected YYYY-MM-DD: {source}")]
    Parse {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Raised when no backup or spreadsheet matches the requested name.
    #[error("{0}")]
    NotFound(String),

    /// Raised when the spreadsheet search returns more than one candidate.
    #[error("multiple spreadsheets found with same name: {name} ({count} matches). Aborting")]
    Ambiguous { name: String, count: usize },

    /// Wrapper for IO failures without a more specific location, such as
    /// writing progress output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the run report cannot be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO failure tied to a concrete file or directory.
    #[error("I/O error on '{}': {source}", .path.display())]
    IoAt {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Raised when the backup database cannot be opened or queried.
    #[error("failed to extract habit stats from '{artifact}': {source}")]
    Extraction {
        artifact: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Raised when creating or updating the destination sheet fails.
    #[error("failed to publish to spreadsheet '{spreadsheet}': {message}")]
    Publish {
        spreadsheet: String,
        message: String,
    },

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl SyncError {
    pub(crate) fn io_at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::IoAt {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn publish(spreadsheet: &str, message: impl ToString) -> Self {
        SyncError::Publish {
            spreadsheet: spreadsheet.to_string(),
            message: message.to_string(),
        }
    }
}
