//! Core types and shared functionality for pdc.
//!
//! This crate provides:
//! - The content record model and fingerprinting
//! - The deduplicated, capacity-bounded record store and its backends
//! - Unified error types
//! - Configuration structures
//! - The inbound message protocol

pub mod config;
pub mod error;
pub mod protocol;
pub mod record;
pub mod store;

pub use config::AppConfig;
pub use error::Error;
pub use protocol::{Request, Response, Status, StatusKind};
pub use record::{CLIPBOARD_URL, ContentRecord, MAX_CONTENT_CHARS, Metadata, MetadataKey};
pub use store::{InsertOutcome, RenameOutcome, SqliteBackend, Store};
