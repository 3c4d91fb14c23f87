//! Page content extraction.
//!
//! Turns a document into a [`ContentRecord`] candidate using prioritized
//! selector fallback chains. Nothing is persisted here.
//!
//! ### Title
//! Custom title, then the first non-empty of `h1`, `.title`, `.post-title`,
//! `.article-title`, `og:title`, `<title>`, then the document title, then a
//! generated `Note - <date> <time>`.
//!
//! ### Content
//! The first container with at least `min_words` words; otherwise the
//! paragraphs longer than `min_text_chars`; otherwise up to
//! `max_text_nodes` long text nodes outside navigation chrome. The result
//! is cleaned and capped.
//!
//! ### Stable Abstraction
//! Tools depend on the [`Extractor`] trait; the heuristics themselves run
//! against [`DocumentView`] so they can be exercised on synthetic trees.

pub mod clean;
pub mod dom;
pub mod metadata;

pub use clean::{clean_content, word_count};
pub use dom::{DocumentView, ElementSnapshot, HtmlDocument};
pub use metadata::extract_metadata;

use pdc_core::record::{default_title, validate_title};
use pdc_core::{ContentRecord, Error, MAX_CONTENT_CHARS};

/// Title candidates, highest priority first.
pub const TITLE_SELECTORS: &[&str] =
    &["h1", ".title", ".post-title", ".article-title", r#"meta[property="og:title"]"#, "title"];

/// Article container candidates, highest priority first.
pub const CONTENT_SELECTORS: &[&str] = &[
    "article",
    r#"[role="main"]"#,
    ".content",
    ".post-content",
    ".entry-content",
    ".article-content",
    ".post-body",
    ".story-body",
    "main",
];

/// Subtrees ignored by the last-resort text walk.
pub const SKIP_TAGS: &[&str] = &["script", "style", "nav", "header", "footer", "aside"];

/// Tuning for the content heuristics.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Words a container needs to count as significant (default: 50)
    pub min_words: usize,

    /// Characters a paragraph or text node needs to be kept (default: 30)
    pub min_text_chars: usize,

    /// Text nodes kept by the last-resort walk (default: 20)
    pub max_text_nodes: usize,

    /// Cap on cleaned content length in characters (default: 100000)
    pub max_content_chars: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self { min_words: 50, min_text_chars: 30, max_text_nodes: 20, max_content_chars: MAX_CONTENT_CHARS }
    }
}

/// Stable extractor trait for page capture.
pub trait Extractor: Send + Sync {
    /// Extract a record from HTML served at `url`.
    fn extract(&self, html: &str, url: &str, custom_title: Option<&str>) -> Result<ContentRecord, Error>;
}

/// Selector-chain extractor.
#[derive(Debug, Clone, Default)]
pub struct HeuristicExtractor {
    config: ExtractConfig,
}

impl HeuristicExtractor {
    pub fn new(config: ExtractConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Build a record from any [`DocumentView`].
    pub fn extract_document(&self, doc: &impl DocumentView, url: &str, custom_title: Option<&str>) -> ContentRecord {
        let title = resolve_title(doc, custom_title);
        let content = self.resolve_content(doc);
        let metadata = extract_metadata(doc, url);
        ContentRecord::new(&title, url, content, metadata)
    }

    /// Pick and clean the body text.
    pub fn resolve_content(&self, doc: &impl DocumentView) -> String {
        let min_words = self.config.min_words;
        let min_chars = self.config.min_text_chars;

        let raw = doc
            .first_accepted(CONTENT_SELECTORS, |el| (word_count(&el.text) >= min_words).then(|| el.text.clone()))
            .or_else(|| {
                let paragraphs: Vec<String> = doc
                    .query_all("p")
                    .into_iter()
                    .map(|p| p.text.trim().to_string())
                    .filter(|text| text.chars().count() > min_chars)
                    .collect();
                (!paragraphs.is_empty()).then(|| paragraphs.join("\n\n"))
            })
            .unwrap_or_else(|| {
                tracing::debug!("no container or paragraphs qualified, walking text nodes");
                doc.walk_text(SKIP_TAGS)
                    .into_iter()
                    .filter(|text| text.chars().count() > min_chars)
                    .take(self.config.max_text_nodes)
                    .collect::<Vec<_>>()
                    .join("\n\n")
            });

        clean_content(&raw, self.config.max_content_chars)
    }
}

impl Extractor for HeuristicExtractor {
    fn extract(&self, html: &str, url: &str, custom_title: Option<&str>) -> Result<ContentRecord, Error> {
        if html.trim().is_empty() {
            return Err(Error::InvalidInput("html cannot be empty".into()));
        }

        let doc = HtmlDocument::parse(html);
        let record = self.extract_document(&doc, url, custom_title);
        if record.content.is_empty() {
            return Err(Error::ExtractFailed("No readable content found on this page".into()));
        }

        tracing::debug!(
            url,
            hash = %record.fingerprint,
            chars = record.content.chars().count(),
            metadata = record.metadata.len(),
            "extracted page"
        );

        Ok(record)
    }
}

/// Resolve a record title through the fallback chain.
pub fn resolve_title(doc: &impl DocumentView, custom_title: Option<&str>) -> String {
    custom_title
        .and_then(|t| validate_title(t).ok())
        .or_else(|| {
            doc.first_accepted(TITLE_SELECTORS, |el| {
                let raw = el.attr("content").filter(|c| !c.trim().is_empty()).unwrap_or(el.text.as_str());
                validate_title(&clean::collapse_whitespace(raw)).ok()
            })
        })
        .or_else(|| doc.title().and_then(|t| validate_title(&t).ok()))
        .unwrap_or_else(default_title)
}

/// Extract a record using the default extractor.
pub fn extract_page(html: &str, url: &str, custom_title: Option<&str>) -> Result<ContentRecord, Error> {
    HeuristicExtractor::default().extract(html, url, custom_title)
}
