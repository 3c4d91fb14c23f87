//! Filesystem-safe names derived from record titles.

use std::sync::LazyLock;

use regex::Regex;

/// Longest slug produced by [`sanitize_filename`].
pub const MAX_FILENAME_CHARS: usize = 50;

static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1f]"#).unwrap());
static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s_]+").unwrap());

/// Turn a title into a lowercase slug safe to use as a file name.
///
/// Falls back to `untitled` when nothing usable remains.
pub fn sanitize_filename(title: &str) -> String {
    let replaced = DISALLOWED.replace_all(title, "_");
    let collapsed = SEPARATORS.replace_all(&replaced, "_").to_lowercase();
    let trimmed = collapsed.trim_matches(|c| c == '_' || c == '.');

    let capped: String = trimmed.chars().take(MAX_FILENAME_CHARS).collect();
    let capped = capped.trim_end_matches(['_', '.']);

    if capped.is_empty() { "untitled".to_string() } else { capped.to_string() }
}
