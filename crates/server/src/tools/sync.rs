//! Notion sync tools.

use pdc_client::NotionClient;
use pdc_core::Error;
use rmcp::ErrorData as McpError;
use rmcp::model::CallToolResult;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{ToolContext, json_result};

/// Input parameters for sync_record tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SyncRecordParams {
    /// Hash of the record to send to Notion.
    pub hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SyncRecordOutput {
    pub success: bool,
    pub page_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VerifyNotionOutput {
    pub success: bool,
    pub message: String,
}

/// Implementation of the sync_record tool.
pub async fn sync_impl(ctx: &ToolContext, params: SyncRecordParams) -> Result<CallToolResult, McpError> {
    let record = ctx
        .store
        .get(&params.hash)
        .await?
        .ok_or_else(|| Error::InvalidInput(format!("no record with hash {}", params.hash)))?;

    let client = NotionClient::from_app_config(&ctx.config).map_err(Error::from)?;
    let page = client.create_page(&record).await.map_err(Error::from)?;

    json_result(&SyncRecordOutput { success: true, page_id: page.id, page_url: page.url })
}

/// Implementation of the verify_notion tool.
pub async fn verify_impl(ctx: &ToolContext) -> Result<CallToolResult, McpError> {
    let client = NotionClient::from_app_config(&ctx.config).map_err(Error::from)?;
    client.verify().await.map_err(Error::from)?;
    json_result(&VerifyNotionOutput { success: true, message: "Connection successful".into() })
}
