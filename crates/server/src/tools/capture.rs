//! Capture tools: extract, store, capture a page by URL or pasted text.

use pdc_client::{Extractor, FetchClient, FetchConfig, clipboard_record};
use pdc_core::{ContentRecord, Error, InsertOutcome};
use rmcp::ErrorData as McpError;
use rmcp::model::CallToolResult;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{ToolContext, json_result};

/// Input parameters for extract_content tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractContentParams {
    /// The raw HTML of the page.
    pub html: String,

    /// URL the HTML was loaded from.
    pub url: String,

    /// Title to use instead of the one found in the page.
    #[serde(default)]
    pub title: Option<String>,
}

/// Input parameters for store_content tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StoreContentParams {
    /// Record previously returned by extract_content or capture tools.
    pub record: ContentRecord,
}

/// Input parameters for capture_page tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CapturePageParams {
    /// The URL to fetch and capture.
    pub url: String,

    /// Title to use instead of the one found in the page.
    #[serde(default)]
    pub title: Option<String>,
}

/// Input parameters for capture_text tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CaptureTextParams {
    /// Pasted text to store.
    pub text: String,

    /// Title for the note (default: "Note - <date>").
    #[serde(default)]
    pub title: Option<String>,
}

/// Result of storing a record.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StoreOutput {
    pub success: bool,
    /// True when a record with the same hash was already stored.
    pub duplicate: bool,
    /// Oldest records dropped to stay within capacity.
    pub evicted: usize,
    pub hash: String,
    pub title: String,
}

impl StoreOutput {
    fn new(record: &ContentRecord, outcome: InsertOutcome) -> Self {
        let evicted = match outcome {
            InsertOutcome::Inserted { evicted } => evicted,
            InsertOutcome::Duplicate => 0,
        };
        Self {
            success: true,
            duplicate: outcome.is_duplicate(),
            evicted,
            hash: record.fingerprint.clone(),
            title: record.title.clone(),
        }
    }
}

/// Implementation of the extract_content tool.
pub async fn extract_impl(ctx: &ToolContext, params: ExtractContentParams) -> Result<CallToolResult, McpError> {
    let record = ctx.extractor.extract(&params.html, &params.url, params.title.as_deref())?;
    json_result(&record)
}

/// Implementation of the store_content tool.
pub async fn store_impl(ctx: &ToolContext, params: StoreContentParams) -> Result<CallToolResult, McpError> {
    let record = params.record;
    let outcome = ctx.store.insert(record.clone()).await?;
    json_result(&StoreOutput::new(&record, outcome))
}

/// Implementation of the capture_page tool.
pub async fn capture_page_impl(ctx: &ToolContext, params: CapturePageParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let fetch_client = FetchClient::new(FetchConfig::from(ctx.config.as_ref()))?;
    let response = fetch_client.fetch(&params.url).await?;
    let record = ctx
        .extractor
        .extract(&response.text(), response.final_url.as_str(), params.title.as_deref())?;

    let outcome = ctx.store.insert(record.clone()).await?;
    json_result(&StoreOutput::new(&record, outcome))
}

/// Implementation of the capture_text tool.
pub async fn capture_text_impl(ctx: &ToolContext, params: CaptureTextParams) -> Result<CallToolResult, McpError> {
    let record = clipboard_record(&params.text, params.title.as_deref())?;
    let outcome = ctx.store.insert(record.clone()).await?;
    json_result(&StoreOutput::new(&record, outcome))
}
