//! Unified error types for pdc.
//!
//! Every user-triggered action converts these into a status/message pair at
//! its boundary; nothing here is meant to reach a global handler.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types for the pdc crates.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty HTML, blank title).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Content extraction failed.
    #[error("EXTRACT_FAILED: {0}")]
    ExtractFailed(String),

    /// The persisted blob could not be encoded or decoded.
    #[error("STORAGE_ERROR: {0}")]
    Storage(String),

    /// Database operation failed.
    #[error("STORAGE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("STORAGE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// A guarded write lost the race twice in a row.
    #[error("STORAGE_CONFLICT: {0}")]
    Conflict(String),

    /// Nothing to export.
    #[error("NO_DATA: no data to export")]
    NoData,

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Fetch timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// HTTP error response.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// Remote sync rejected the credentials (401/403).
    #[error("SYNC_AUTH_ERROR: {0}")]
    SyncAuth(String),

    /// Remote sync target does not exist (404).
    #[error("SYNC_NOT_FOUND: {0}")]
    SyncNotFound(String),

    /// Any other remote sync failure.
    #[error("SYNC_FAILED: {0}")]
    SyncFailed(String),
}

impl Error {
    /// Short message suitable for a status line.
    pub fn user_message(&self) -> String {
        match self {
            Error::InvalidInput(msg)
            | Error::ExtractFailed(msg)
            | Error::Storage(msg)
            | Error::MigrationFailed(msg)
            | Error::Conflict(msg)
            | Error::InvalidUrl(msg)
            | Error::FetchTimeout(msg)
            | Error::FetchTooLarge(msg)
            | Error::HttpError(msg)
            | Error::SyncAuth(msg)
            | Error::SyncNotFound(msg)
            | Error::SyncFailed(msg) => msg.clone(),
            Error::Database(e) => e.to_string(),
            Error::NoData => "No data to export".to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidInput(_) => -32602,
            Error::ExtractFailed(_) => -32000,
            Error::NoData => -32001,
            Error::Storage(_) | Error::Database(_) | Error::MigrationFailed(_) => -32002,
            Error::Conflict(_) => -32003,
            Error::InvalidUrl(_) => -32004,
            Error::FetchTimeout(_) => -32005,
            Error::FetchTooLarge(_) => -32006,
            Error::HttpError(_) => -32007,
            Error::SyncAuth(_) => -32008,
            Error::SyncNotFound(_) => -32009,
            Error::SyncFailed(_) => -32010,
        };

        McpError { code: ErrorCode(code), message: err.user_message().into(), data: None }
    }
}
