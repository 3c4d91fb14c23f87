//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use crate::tools::ToolContext;
use crate::tools::capture::{
    CapturePageParams, CaptureTextParams, ExtractContentParams, StoreContentParams, capture_page_impl,
    capture_text_impl, extract_impl, store_impl,
};
use crate::tools::export::{ExportRecordsParams, export_impl};
use crate::tools::records::{
    DeleteRecordParams, GetRecordParams, ListRecordsParams, RenameRecordParams, delete_impl, get_impl, list_impl,
    rename_impl, stats_impl,
};
use crate::tools::sync::{SyncRecordParams, sync_impl, verify_impl};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for pdc.
#[derive(Clone)]
pub struct PdcServer {
    ctx: ToolContext,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl PdcServer {
    /// Create a new server handler.
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx, tool_router: Self::tool_router() }
    }

    #[tool(description = "Extract a content record (title, text, metadata, hash) from page HTML without storing it.")]
    async fn extract_content(&self, params: Parameters<ExtractContentParams>) -> Result<CallToolResult, McpError> {
        extract_impl(&self.ctx, params.0).await
    }

    #[tool(description = "Store a content record. Records whose hash is already stored are reported as duplicates.")]
    async fn store_content(&self, params: Parameters<StoreContentParams>) -> Result<CallToolResult, McpError> {
        store_impl(&self.ctx, params.0).await
    }

    #[tool(description = "Fetch a URL, extract its main content and store it.")]
    async fn capture_page(&self, params: Parameters<CapturePageParams>) -> Result<CallToolResult, McpError> {
        capture_page_impl(&self.ctx, params.0).await
    }

    #[tool(description = "Store pasted text as a note.")]
    async fn capture_text(&self, params: Parameters<CaptureTextParams>) -> Result<CallToolResult, McpError> {
        capture_text_impl(&self.ctx, params.0).await
    }

    #[tool(description = "List stored records, newest first.")]
    async fn list_records(&self, params: Parameters<ListRecordsParams>) -> Result<CallToolResult, McpError> {
        list_impl(&self.ctx, params.0).await
    }

    #[tool(description = "Get one stored record by hash.")]
    async fn get_record(&self, params: Parameters<GetRecordParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.ctx, params.0).await
    }

    #[tool(description = "Rename the record with the given hash.")]
    async fn rename_record(&self, params: Parameters<RenameRecordParams>) -> Result<CallToolResult, McpError> {
        rename_impl(&self.ctx, params.0).await
    }

    #[tool(description = "Delete the record at the given newest-first index.")]
    async fn delete_record(&self, params: Parameters<DeleteRecordParams>) -> Result<CallToolResult, McpError> {
        delete_impl(&self.ctx, params.0).await
    }

    #[tool(description = "Report record count, capacity and stored bytes.")]
    async fn store_stats(&self) -> Result<CallToolResult, McpError> {
        stats_impl(&self.ctx).await
    }

    #[tool(description = "Export all records as markdown, text, json or a per-record bundle directory.")]
    async fn export_records(&self, params: Parameters<ExportRecordsParams>) -> Result<CallToolResult, McpError> {
        export_impl(&self.ctx, params.0).await
    }

    #[tool(description = "Send a stored record to the configured Notion database.")]
    async fn sync_record(&self, params: Parameters<SyncRecordParams>) -> Result<CallToolResult, McpError> {
        sync_impl(&self.ctx, params.0).await
    }

    #[tool(description = "Check that the configured Notion credentials can reach the database.")]
    async fn verify_notion(&self) -> Result<CallToolResult, McpError> {
        verify_impl(&self.ctx).await
    }
}

impl ServerHandler for PdcServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "pdc".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
