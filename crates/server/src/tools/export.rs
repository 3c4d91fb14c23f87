//! export_records tool implementation.
//!
//! Document formats are returned inline unless a path is given; bundles
//! always need a target directory.

use std::path::PathBuf;

use pdc_client::export::{Export, ExportFormat, ExportOptions, export};
use pdc_core::Error;
use rmcp::ErrorData as McpError;
use rmcp::model::CallToolResult;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{ToolContext, json_result};

/// Input parameters for export_records tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExportRecordsParams {
    /// Output format: "markdown", "text", "json" or "bundle".
    #[serde(default = "default_format")]
    pub format: String,

    /// Wrap JSON output with exportedAt/version/count.
    #[serde(default)]
    pub envelope: bool,

    /// File (or directory, for bundles) to write to.
    #[serde(default)]
    pub path: Option<String>,
}

fn default_format() -> String {
    "markdown".into()
}

/// Output structure for export_records tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExportRecordsOutput {
    pub format: String,
    pub count: usize,
    /// Rendered document when no path was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    /// Files written when a path was given.
    #[serde(default)]
    pub written: Vec<String>,
}

/// Implementation of the export_records tool.
pub async fn export_impl(ctx: &ToolContext, params: ExportRecordsParams) -> Result<CallToolResult, McpError> {
    let format: ExportFormat = params.format.parse()?;
    let records = ctx.store.list().await?;
    let rendered = export(&records, format, ExportOptions { envelope: params.envelope })?;

    let mut output =
        ExportRecordsOutput { format: format.to_string(), count: records.len(), document: None, written: Vec::new() };

    match (params.path, rendered) {
        (Some(path), rendered) => {
            let written = rendered.write_to(&PathBuf::from(path)).await?;
            output.written = written.iter().map(|p| p.display().to_string()).collect();
        }
        (None, Export::Document(body)) => output.document = Some(body),
        (None, Export::Bundle(_)) => {
            return Err(Error::InvalidInput("bundle export requires a path".into()).into());
        }
    }

    tracing::info!(format = %output.format, count = output.count, "exported records");
    json_result(&output)
}
