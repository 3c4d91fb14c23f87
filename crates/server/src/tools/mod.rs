//! MCP tool implementations.
//!
//! This module contains all tools exposed by the pdc server. Each tool is a
//! plain `*_impl` function over a [`ToolContext`] so it can be tested
//! without a transport.

pub mod capture;
pub mod export;
pub mod records;
pub mod sync;

use std::sync::Arc;

use pdc_client::HeuristicExtractor;
use pdc_core::{AppConfig, Error, Store};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

/// Shared state handed to every tool.
#[derive(Clone)]
pub struct ToolContext {
    pub store: Store,
    pub config: Arc<AppConfig>,
    pub extractor: Arc<HeuristicExtractor>,
}

impl ToolContext {
    pub fn new(store: Store, config: AppConfig) -> Self {
        Self { store, config: Arc::new(config), extractor: Arc::new(HeuristicExtractor::default()) }
    }

    /// Context over an in-memory store with default configuration.
    #[cfg(test)]
    pub fn in_memory() -> Self {
        let config = AppConfig::default();
        Self::new(Store::in_memory(config.capacity), config)
    }
}

/// Serialize a tool output as pretty JSON text content.
pub fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
pub(crate) fn result_json<T: serde::de::DeserializeOwned>(result: &CallToolResult) -> T {
    let content_val = serde_json::to_value(&result.content[0]).unwrap();
    let text = content_val
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
