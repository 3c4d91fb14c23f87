//! Command implementations.
//!
//! Each command returns a [`Status`] for the status line; errors are turned
//! into an error status by the caller.

use std::path::{Path, PathBuf};
use std::time::Duration;

use pdc_client::export::{Export, ExportFormat, ExportOptions, export};
use pdc_client::{
    Extractor, FetchClient, FetchConfig, HeuristicExtractor, NotionClient, clipboard_record, dispatch_json,
};
use pdc_core::{AppConfig, ContentRecord, Error, InsertOutcome, RenameOutcome, Status, Store};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::sync::mpsc;

use crate::cli::Commands;
use crate::naming::{Naming, NamingEvent};

pub(crate) struct App {
    pub store: Store,
    pub config: AppConfig,
    pub extractor: HeuristicExtractor,
}

pub(crate) async fn run(app: &App, command: Commands) -> Result<Status, Error> {
    match command {
        Commands::Capture { source, title, url, name_within } => {
            let record = capture_source(app, &source, title.as_deref(), url.as_deref()).await?;
            store_record(app, record, name_within).await
        }
        Commands::Paste { title } => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .map_err(|e| Error::InvalidInput(format!("failed to read stdin: {e}")))?;
            let record = clipboard_record(&text, title.as_deref())?;
            store_record(app, record, None).await
        }
        Commands::List { limit, json } => list(app, limit, json).await,
        Commands::Rename { hash, title } => match app.store.rename(&hash, &title).await? {
            RenameOutcome::Renamed => Ok(Status::success("Title updated")),
            RenameOutcome::NotFound => Ok(Status::error(format!("No record with hash {hash}"))),
        },
        Commands::Delete { index } => match app.store.delete(index).await? {
            Some(record) => Ok(Status::success(format!("Deleted \"{}\"", record.title))),
            None => Ok(Status::error(format!("No record at index {index}"))),
        },
        Commands::Export { format, out, envelope } => export_records(app, &format, out, envelope).await,
        Commands::Sync { hash, test } => sync(app, hash, test).await,
        Commands::Stats => {
            let size = app.store.size().await?;
            let bytes = app.store.bytes_used().await?;
            println!("Records:  {size} / {}", app.store.capacity());
            println!("Storage:  {}", format_bytes(bytes));
            println!("Database: {}", app.config.db_path.display());
            Ok(Status::info(format!("{size} records")))
        }
        Commands::Message => {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            let mut handled = 0usize;
            while let Some(line) = lines
                .next_line()
                .await
                .map_err(|e| Error::InvalidInput(format!("failed to read stdin: {e}")))?
            {
                if line.trim().is_empty() {
                    continue;
                }
                println!("{}", dispatch_json(&app.store, &app.extractor, &line).await);
                handled += 1;
            }
            Ok(Status::info(format!("Handled {handled} messages")))
        }
    }
}

async fn capture_source(
    app: &App, source: &str, title: Option<&str>, url: Option<&str>,
) -> Result<ContentRecord, Error> {
    let path = Path::new(source);
    if path.is_file() {
        let html = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::InvalidInput(format!("failed to read {}: {e}", path.display())))?;
        let url = match url {
            Some(url) => url.to_string(),
            None => file_url(path),
        };
        return app.extractor.extract(&html, &url, title);
    }

    let client = FetchClient::new(FetchConfig::from(&app.config))?;
    let response = client.fetch(source).await?;
    app.extractor
        .extract(&response.text(), url.unwrap_or(response.final_url.as_str()), title)
}

fn file_url(path: &Path) -> String {
    let absolute = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    format!("file://{}", absolute.display())
}

async fn store_record(app: &App, record: ContentRecord, name_within: Option<u32>) -> Result<Status, Error> {
    let hash = record.fingerprint.clone();
    let title = record.title.clone();

    match app.store.insert(record).await? {
        InsertOutcome::Duplicate => Ok(Status::info("Content already saved")),
        InsertOutcome::Inserted { evicted } => {
            if evicted > 0 {
                eprintln!("Dropped {evicted} oldest record(s) to stay within capacity");
            }
            if let Some(seconds) = name_within
                && let Some((hash, name)) = prompt_for_name(&hash, seconds).await
            {
                app.store.rename(&hash, &name).await?;
                return Ok(Status::success(format!("Saved \"{name}\" ({hash})")));
            }
            Ok(Status::success(format!("Saved \"{title}\" ({hash})")))
        }
    }
}

/// Run the naming countdown against stdin.
///
/// Returns the `(hash, title)` to apply when a title was entered in time.
async fn prompt_for_name(hash: &str, seconds: u32) -> Option<(String, String)> {
    let (tx, mut rx) = mpsc::channel::<String>(1);
    std::thread::spawn(move || {
        let mut line = String::new();
        if std::io::stdin().read_line(&mut line).is_ok() {
            let _ = tx.blocking_send(line);
        }
    });

    let mut state = Naming::Idle.handle(NamingEvent::Start { hash: hash.to_string(), seconds });
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.tick().await;

    while let Some(remaining) = state.remaining() {
        eprint!("\rName this capture ({remaining:>2}s, Enter to keep): ");
        state = tokio::select! {
            _ = ticker.tick() => state.handle(NamingEvent::Tick),
            line = rx.recv() => state.handle(NamingEvent::Input(line.unwrap_or_default())),
        };
    }
    eprintln!();

    if matches!(state, Naming::Expired { .. }) {
        tracing::debug!("naming countdown expired");
    }
    state.rename().map(|(hash, title)| (hash.to_string(), title.to_string()))
}

async fn list(app: &App, limit: Option<usize>, json: bool) -> Result<Status, Error> {
    let records = app.store.list().await?;
    let shown: Vec<&ContentRecord> = records.iter().take(limit.unwrap_or(records.len())).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
    } else {
        for (index, record) in shown.iter().enumerate() {
            let date = record
                .captured_at()
                .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            println!("{index:>4}  {}  {date:<16}  {}", record.fingerprint, record.title);
        }
    }

    Ok(Status::info(format!("{} of {} records", shown.len(), records.len())))
}

async fn export_records(app: &App, format: &str, out: Option<PathBuf>, envelope: bool) -> Result<Status, Error> {
    let format: ExportFormat = format.parse()?;
    let records = app.store.list().await?;
    let rendered = export(&records, format, ExportOptions { envelope })?;

    match (out, rendered) {
        (Some(path), rendered) => {
            let written = rendered.write_to(&path).await?;
            Ok(Status::success(format!(
                "Exported {} records to {} ({} files)",
                records.len(),
                path.display(),
                written.len()
            )))
        }
        (None, Export::Document(body)) => {
            print!("{body}");
            Ok(Status::success(format!("Exported {} records as {format}", records.len())))
        }
        (None, Export::Bundle(_)) => Err(Error::InvalidInput("bundle export requires --out <DIR>".into())),
    }
}

async fn sync(app: &App, hash: Option<String>, test: bool) -> Result<Status, Error> {
    let client = NotionClient::from_app_config(&app.config)?;

    if test {
        client.verify().await?;
        return Ok(Status::success("Connection successful"));
    }

    let hash = hash.ok_or_else(|| Error::InvalidInput("a record hash is required".into()))?;
    let record = app
        .store
        .get(&hash)
        .await?
        .ok_or_else(|| Error::InvalidInput(format!("No record with hash {hash}")))?;

    let page = client.create_page(&record).await?;
    Ok(Status::success(format!("Saved to Notion ({})", page.id)))
}

fn format_bytes(bytes: usize) -> String {
    match bytes {
        b if b < 1024 => format!("{b} B"),
        b if b < 1024 * 1024 => format!("{:.1} KB", b as f64 / 1024.0),
        b => format!("{:.1} MB", b as f64 / (1024.0 * 1024.0)),
    }
}
