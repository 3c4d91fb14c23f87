//! Text cleanup applied to extracted content.

use std::sync::LazyLock;

use pdc_core::record::truncate_chars;
use regex::Regex;

static EMBEDDED_MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Normalize extracted text.
///
/// Strips leftover `<script>`/`<style>` markup, collapses every whitespace
/// run (newlines included) to a single space, trims, and caps the result at
/// `max_chars`.
pub fn clean_content(text: &str, max_chars: usize) -> String {
    let text = EMBEDDED_MARKUP.replace_all(text, "");
    let text = WHITESPACE.replace_all(&text, " ");
    truncate_chars(text.trim(), max_chars).to_string()
}

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Collapse all whitespace to single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}
