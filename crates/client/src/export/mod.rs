//! Export pipeline.
//!
//! Renders the stored records as a single markdown, plain-text or JSON
//! document, or as a bundle directory holding one `.md` and one `.txt`
//! file per record. An empty record list is reported as [`Error::NoData`]
//! and nothing is produced.

pub mod filename;

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use pdc_core::{ContentRecord, Error};

pub use filename::sanitize_filename;

/// Version stamped into the JSON envelope.
pub const EXPORT_VERSION: &str = "1.0";

/// Width of the plain-text record separator.
pub const TEXT_RULE_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Markdown,
    Text,
    Json,
    Bundle,
}

impl ExportFormat {
    /// File extension for single-document formats.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            ExportFormat::Markdown => Some("md"),
            ExportFormat::Text => Some("txt"),
            ExportFormat::Json => Some("json"),
            ExportFormat::Bundle => None,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md" | "markdown" => Ok(ExportFormat::Markdown),
            "txt" | "text" => Ok(ExportFormat::Text),
            "json" => Ok(ExportFormat::Json),
            "bundle" => Ok(ExportFormat::Bundle),
            "zip" => Err(Error::InvalidInput(
                "zip archives are not written; use bundle for one .md and one .txt file per record".into(),
            )),
            other => Err(Error::InvalidInput(format!("unknown export format: {other}"))),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ExportFormat::Markdown => "markdown",
            ExportFormat::Text => "text",
            ExportFormat::Json => "json",
            ExportFormat::Bundle => "bundle",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    /// Wrap JSON output in `{exportedAt, version, count, records}`.
    pub envelope: bool,
}

/// One file of a bundle export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleFile {
    pub name: String,
    pub contents: String,
}

/// Rendered export output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Export {
    Document(String),
    Bundle(Vec<BundleFile>),
}

impl Export {
    /// Write the export to disk.
    ///
    /// A document is written to `dest` as a file; a bundle treats `dest` as a
    /// directory, creating it if needed. Returns the paths written.
    pub async fn write_to(&self, dest: &Path) -> Result<Vec<PathBuf>, Error> {
        match self {
            Export::Document(body) => {
                write_file(dest, body).await?;
                Ok(vec![dest.to_path_buf()])
            }
            Export::Bundle(files) => {
                tokio::fs::create_dir_all(dest)
                    .await
                    .map_err(|e| Error::Storage(format!("failed to create {}: {}", dest.display(), e)))?;

                let mut written = Vec::with_capacity(files.len());
                for file in files {
                    let path = dest.join(&file.name);
                    write_file(&path, &file.contents).await?;
                    written.push(path);
                }
                Ok(written)
            }
        }
    }
}

async fn write_file(path: &Path, contents: &str) -> Result<(), Error> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| Error::Storage(format!("failed to write {}: {}", path.display(), e)))
}

/// Render `records` in the requested format.
///
/// # Errors
///
/// Returns [`Error::NoData`] when `records` is empty.
pub fn export(records: &[ContentRecord], format: ExportFormat, options: ExportOptions) -> Result<Export, Error> {
    if records.is_empty() {
        return Err(Error::NoData);
    }

    let export = match format {
        ExportFormat::Markdown => Export::Document(render_markdown(records)),
        ExportFormat::Text => Export::Document(render_text(records)),
        ExportFormat::Json => Export::Document(render_json(records, options.envelope)?),
        ExportFormat::Bundle => Export::Bundle(render_bundle(records)),
    };

    tracing::debug!(%format, count = records.len(), "rendered export");
    Ok(export)
}

fn display_date(record: &ContentRecord) -> String {
    record
        .captured_at()
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn markdown_section(out: &mut String, record: &ContentRecord) {
    let _ = write!(
        out,
        "## {}\n\n**URL:** {}\n**Date:** {}\n\n{}\n\n---\n\n",
        record.title,
        record.url,
        display_date(record),
        record.content
    );
}

fn text_section(out: &mut String, record: &ContentRecord) {
    let _ = write!(
        out,
        "Title: {}\nURL: {}\nDate: {}\n\n{}\n{}\n\n",
        record.title,
        record.url,
        display_date(record),
        record.content,
        "-".repeat(TEXT_RULE_WIDTH)
    );
}

pub fn render_markdown(records: &[ContentRecord]) -> String {
    let mut out = String::from("# Personal Data Collector Export\n\n");
    for record in records {
        markdown_section(&mut out, record);
    }
    out
}

pub fn render_text(records: &[ContentRecord]) -> String {
    let mut out = String::new();
    for record in records {
        text_section(&mut out, record);
    }
    out
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a> {
    exported_at: String,
    version: &'static str,
    count: usize,
    records: &'a [ContentRecord],
}

pub fn render_json(records: &[ContentRecord], envelope: bool) -> Result<String, Error> {
    let json = if envelope {
        serde_json::to_string_pretty(&Envelope {
            exported_at: Utc::now().to_rfc3339(),
            version: EXPORT_VERSION,
            count: records.len(),
            records,
        })?
    } else {
        serde_json::to_string_pretty(records)?
    };
    Ok(json)
}

/// One markdown and one text file per record.
///
/// Names are prefixed with the 1-based position so equal titles cannot
/// collide.
pub fn render_bundle(records: &[ContentRecord]) -> Vec<BundleFile> {
    let mut files = Vec::with_capacity(records.len() * 2);
    for (i, record) in records.iter().enumerate() {
        let stem = format!("{:03}-{}", i + 1, sanitize_filename(&record.title));

        let mut md = String::new();
        markdown_section(&mut md, record);
        files.push(BundleFile { name: format!("{stem}.md"), contents: md });

        let mut txt = String::new();
        text_section(&mut txt, record);
        files.push(BundleFile { name: format!("{stem}.txt"), contents: txt });
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdc_core::Metadata;

    fn records() -> Vec<ContentRecord> {
        vec![
            ContentRecord::new("First Note", "https://example.com/a", "Alpha body", Metadata::new()),
            ContentRecord::new("Second: Note?", "clipboard", "Beta body", Metadata::new()),
        ]
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("md".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert_eq!("TXT".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("bundle".parse::<ExportFormat>().unwrap(), ExportFormat::Bundle);
        assert!(matches!("pdf".parse::<ExportFormat>(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_zip_format_rejected() {
        let err = "zip".parse::<ExportFormat>().unwrap_err();
        assert!(matches!(err, Error::InvalidInput(msg) if msg.contains("bundle")));
    }

    #[test]
    fn test_empty_store_is_no_data() {
        for format in [ExportFormat::Markdown, ExportFormat::Text, ExportFormat::Json, ExportFormat::Bundle] {
            let result = export(&[], format, ExportOptions::default());
            assert!(matches!(result, Err(Error::NoData)));
        }
        assert_eq!(Error::NoData.user_message(), "No data to export");
    }

    #[test]
    fn test_markdown_sections() {
        let md = render_markdown(&records());
        assert!(md.contains("## First Note\n\n**URL:** https://example.com/a\n**Date:** "));
        assert!(md.contains("Alpha body\n\n---\n\n## Second: Note?"));
        assert_eq!(md.matches("\n---\n").count(), 2);
    }

    #[test]
    fn test_text_rule() {
        let txt = render_text(&records());
        let rule = "-".repeat(TEXT_RULE_WIDTH);
        assert!(txt.starts_with("Title: First Note\nURL: https://example.com/a\nDate: "));
        assert!(txt.contains(&format!("Alpha body\n{rule}\n")));
        assert_eq!(txt.matches(&rule).count(), 2);
    }

    #[test]
    fn test_json_plain_array() {
        let json = render_json(&records(), false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
        assert_eq!(value[0]["title"], "First Note");
        assert!(value[0]["hash"].is_string());
        assert!(json.contains("\n  "));
    }

    #[test]
    fn test_json_envelope() {
        let json = render_json(&records(), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], EXPORT_VERSION);
        assert_eq!(value["count"], 2);
        assert!(value["exportedAt"].is_string());
        assert_eq!(value["records"][1]["url"], "clipboard");
    }

    #[test]
    fn test_bundle_names() {
        let files = render_bundle(&records());
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["001-first_note.md", "001-first_note.txt", "002-second_note.md", "002-second_note.txt"]);
        assert!(files[0].contents.starts_with("## First Note"));
        assert!(files[1].contents.starts_with("Title: First Note"));
    }

    #[tokio::test]
    async fn test_write_bundle_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("bundle");
        let export = export(&records(), ExportFormat::Bundle, ExportOptions::default()).unwrap();

        let written = export.write_to(&out).await.unwrap();
        assert_eq!(written.len(), 4);
        let body = tokio::fs::read_to_string(out.join("002-second_note.txt")).await.unwrap();
        assert!(body.contains("Beta body"));
    }

    #[tokio::test]
    async fn test_write_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.md");
        let export = export(&records(), ExportFormat::Markdown, ExportOptions::default()).unwrap();

        export.write_to(&path).await.unwrap();
        let body = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(body.starts_with("# Personal Data Collector Export"));
    }
}
