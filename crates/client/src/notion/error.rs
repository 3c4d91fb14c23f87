//! Notion client error types.

use std::sync::Arc;

use pdc_core::Error;

/// Errors from the Notion API client.
#[derive(Debug, Clone, thiserror::Error)]
pub enum NotionError {
    /// API key or database id not configured.
    #[error("Notion credentials not configured")]
    MissingCredentials,

    /// 401/403 from the API.
    #[error("invalid API key")]
    Unauthorized,

    /// 404 from the API.
    #[error("database not found")]
    DatabaseNotFound,

    /// Any other non-2xx response.
    #[error("Notion API error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl NotionError {
    /// Message shown on the status line.
    pub fn user_message(&self) -> String {
        match self {
            NotionError::MissingCredentials => "Notion credentials not configured".to_string(),
            NotionError::Unauthorized => "Invalid API key".to_string(),
            NotionError::DatabaseNotFound => "Database not found - check Database ID".to_string(),
            NotionError::HttpError { status } => format!("Notion API error: {status}"),
            NotionError::Timeout => "Notion request timed out".to_string(),
            NotionError::Network(_) => "Network error - check your internet connection".to_string(),
            NotionError::Parse(_) => "Unexpected response from Notion".to_string(),
        }
    }
}

impl From<reqwest::Error> for NotionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { NotionError::Timeout } else { NotionError::Network(Arc::new(err)) }
    }
}

impl From<NotionError> for Error {
    fn from(err: NotionError) -> Self {
        let message = err.user_message();
        match err {
            NotionError::MissingCredentials | NotionError::Unauthorized => Error::SyncAuth(message),
            NotionError::DatabaseNotFound => Error::SyncNotFound(message),
            _ => Error::SyncFailed(message),
        }
    }
}
