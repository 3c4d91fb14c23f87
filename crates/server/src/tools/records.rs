//! Record management tools: list, get, rename, delete and stats.

use pdc_core::{ContentRecord, Error, RenameOutcome};
use rmcp::ErrorData as McpError;
use rmcp::model::CallToolResult;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{ToolContext, json_result};

/// Input parameters for list_records tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListRecordsParams {
    /// Maximum number of records to return, newest first.
    #[serde(default)]
    pub limit: Option<usize>,

    /// Omit record content from the listing.
    #[serde(default)]
    pub summary: bool,
}

/// One row of a listing.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecordEntry {
    /// Position used by delete_record (0 = newest).
    pub index: usize,
    pub hash: String,
    pub title: String,
    pub url: String,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListRecordsOutput {
    pub records: Vec<RecordEntry>,
    pub size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetRecordParams {
    /// Hash of the record.
    pub hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RenameRecordParams {
    /// Hash of the record to rename.
    pub hash: String,
    /// New title (trimmed, max 200 characters).
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DeleteRecordParams {
    /// Position in the newest-first listing.
    pub index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UpdateOutput {
    pub success: bool,
    pub found: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsOutput {
    pub size: usize,
    pub capacity: usize,
    pub bytes_used: usize,
}

/// Implementation of the list_records tool.
pub async fn list_impl(ctx: &ToolContext, params: ListRecordsParams) -> Result<CallToolResult, McpError> {
    let records = ctx.store.list().await?;
    let size = records.len();
    let limit = params.limit.unwrap_or(size);

    let entries = records
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(index, r)| RecordEntry {
            index,
            hash: r.fingerprint,
            title: r.title,
            url: r.url,
            timestamp: r.timestamp,
            content: (!params.summary).then_some(r.content),
        })
        .collect();

    json_result(&ListRecordsOutput { records: entries, size })
}

/// Implementation of the get_record tool.
pub async fn get_impl(ctx: &ToolContext, params: GetRecordParams) -> Result<CallToolResult, McpError> {
    let record: ContentRecord = ctx
        .store
        .get(&params.hash)
        .await?
        .ok_or_else(|| Error::InvalidInput(format!("no record with hash {}", params.hash)))?;
    json_result(&record)
}

/// Implementation of the rename_record tool.
pub async fn rename_impl(ctx: &ToolContext, params: RenameRecordParams) -> Result<CallToolResult, McpError> {
    let outcome = ctx.store.rename(&params.hash, &params.title).await?;
    json_result(&UpdateOutput { success: true, found: outcome == RenameOutcome::Renamed })
}

/// Implementation of the delete_record tool.
pub async fn delete_impl(ctx: &ToolContext, params: DeleteRecordParams) -> Result<CallToolResult, McpError> {
    let removed = ctx.store.delete(params.index).await?;
    json_result(&UpdateOutput { success: true, found: removed.is_some() })
}

/// Implementation of the store_stats tool.
pub async fn stats_impl(ctx: &ToolContext) -> Result<CallToolResult, McpError> {
    let output = StatsOutput {
        size: ctx.store.size().await?,
        capacity: ctx.store.capacity(),
        bytes_used: ctx.store.bytes_used().await?,
    };
    json_result(&output)
}
