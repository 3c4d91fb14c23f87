//! pdc command-line entry point.
//!
//! Status lines and logs go to stderr; listings and exports go to stdout.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use pdc_client::HeuristicExtractor;
use pdc_core::{AppConfig, SqliteBackend, Status, StatusKind, Store};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod naming;

use cli::Cli;
use commands::App;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    let mut config = AppConfig::load()?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    let backend = SqliteBackend::open(&config.db_path).await?;
    let store = Store::new(Arc::new(backend), config.capacity);
    store.initialize().await?;
    let migrated = store.migrate().await?;
    if migrated > 0 {
        tracing::info!(migrated, "migrated legacy records");
    }

    let app = App { store, config, extractor: HeuristicExtractor::default() };
    let status = match commands::run(&app, cli.command).await {
        Ok(status) => status,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            Status::from(&err)
        }
    };

    print_status(&status);
    if status.kind == StatusKind::Error {
        std::process::exit(1);
    }
    Ok(())
}

fn print_status(status: &Status) {
    let marker = match status.kind {
        StatusKind::Success => "✓",
        StatusKind::Info => "i",
        StatusKind::Error => "✗",
    };
    eprintln!("{marker} {}", status.message);
}
