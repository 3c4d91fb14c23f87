//! Inbound message protocol.
//!
//! Requests are JSON objects tagged by `action`, e.g.
//! `{"action": "storeContent", "data": {...}}`. Every request produces a
//! response; failures become `{"success": false, "error": "..."}` instead
//! of propagating.

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::record::ContentRecord;

/// A request from a capture surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    /// Extract a record from a document without storing it.
    #[serde(rename_all = "camelCase")]
    ExtractContent {
        #[serde(default)]
        custom_title: Option<String>,
        html: String,
        url: String,
    },
    /// Store a record.
    StoreContent { data: ContentRecord },
    /// Rename the record with the given fingerprint.
    RenameContent { hash: String, title: String },
    /// Delete the record at a 0-based, newest-first index.
    DeleteContent { index: usize },
    /// List all records.
    ListContent,
}

/// Reply to a [`Request`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Extracted(ContentRecord),
    Stored {
        success: bool,
        duplicate: bool,
    },
    Updated {
        success: bool,
        found: bool,
    },
    #[serde(rename_all = "camelCase")]
    Listed {
        records: Vec<ContentRecord>,
        size: usize,
        bytes_used: usize,
    },
    Failed {
        success: bool,
        error: String,
    },
}

impl Response {
    /// Error marker for a failed action.
    pub fn failed(err: &Error) -> Self {
        Response::Failed { success: false, error: err.user_message() }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Response::Failed { .. })
    }
}

/// Severity of a user-facing status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Success,
    Info,
    Error,
}

/// A status/message pair shown to the user after an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub kind: StatusKind,
    pub message: String,
}

impl Status {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: StatusKind::Success, message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { kind: StatusKind::Info, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: StatusKind::Error, message: message.into() }
    }
}

impl From<&Error> for Status {
    fn from(err: &Error) -> Self {
        Status::error(err.user_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extract_request() {
        let req: Request = serde_json::from_str(
            r#"{"action": "extractContent", "customTitle": "Mine", "html": "<p>x</p>", "url": "https://a.b"}"#,
        )
        .unwrap();
        match req {
            Request::ExtractContent { custom_title, url, .. } => {
                assert_eq!(custom_title.as_deref(), Some("Mine"));
                assert_eq!(url, "https://a.b");
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn test_parse_extract_request_without_title() {
        let req: Request =
            serde_json::from_str(r#"{"action": "extractContent", "html": "", "url": "u"}"#).unwrap();
        assert!(matches!(req, Request::ExtractContent { custom_title: None, .. }));
    }

    #[test]
    fn test_parse_store_request() {
        let req: Request = serde_json::from_str(
            r#"{"action": "storeContent", "data": {
                "title": "T", "url": "u", "content": "c", "metadata": {}, "timestamp": 1, "hash": "abcdefabcdef"
            }}"#,
        )
        .unwrap();
        assert!(matches!(req, Request::StoreContent { data } if data.fingerprint == "abcdefabcdef"));
    }

    #[test]
    fn test_parse_unit_request() {
        let req: Request = serde_json::from_str(r#"{"action": "listContent"}"#).unwrap();
        assert!(matches!(req, Request::ListContent));
    }

    #[test]
    fn test_stored_response_shape() {
        let json = serde_json::to_value(Response::Stored { success: true, duplicate: true }).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "duplicate": true}));
    }

    #[test]
    fn test_failed_response_shape() {
        let json = serde_json::to_value(Response::failed(&Error::InvalidInput("html cannot be empty".into()))).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "error": "html cannot be empty"}));
    }

    #[test]
    fn test_listed_response_camel_case() {
        let json = serde_json::to_value(Response::Listed { records: vec![], size: 0, bytes_used: 2 }).unwrap();
        assert_eq!(json["bytesUsed"], 2);
    }
}
