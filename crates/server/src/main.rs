//! pdc MCP server entry point.
//!
//! Boots the MCP server on stdio transport over the configured SQLite store.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use pdc_core::{AppConfig, SqliteBackend, Store};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;

    tracing::info!(
        db_path = %config.db_path.display(),
        capacity = config.capacity,
        "Starting pdc server on stdio transport"
    );

    let backend = SqliteBackend::open(&config.db_path).await?;
    let store = Store::new(Arc::new(backend), config.capacity);
    if store.initialize().await? {
        tracing::info!("initialized empty store");
    }
    let migrated = store.migrate().await?;
    if migrated > 0 {
        tracing::info!(migrated, "migrated legacy records");
    }

    let handler = handler::PdcServer::new(tools::ToolContext::new(store, config));
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
