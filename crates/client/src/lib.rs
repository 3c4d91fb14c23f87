//! Client code for pdc.
//!
//! This crate provides page extraction, clipboard capture, page fetch,
//! export rendering, Notion sync and message dispatch shared by the server
//! and CLI.

pub mod capture;
pub mod dispatch;
pub mod export;
pub mod extract;
pub mod fetch;
pub mod notion;

pub use capture::clipboard_record;
pub use dispatch::{dispatch, dispatch_json};
pub use export::{Export, ExportFormat, ExportOptions, export};
pub use extract::{ExtractConfig, Extractor, HeuristicExtractor, extract_page};
pub use fetch::{FetchClient, FetchConfig, FetchResponse};
pub use notion::{NotionClient, NotionConfig, NotionError};
