//! Content records: the unit persisted by the store.

use std::collections::BTreeMap;

use chrono::{Local, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::Error;
use crate::store::fingerprint::fingerprint;

/// Maximum characters kept in a record's content.
pub const MAX_CONTENT_CHARS: usize = 100_000;

/// Maximum characters kept in a record's title.
pub const MAX_TITLE_CHARS: usize = 200;

/// Sentinel `url` for records that did not come from a page.
pub const CLIPBOARD_URL: &str = "clipboard";

/// Known metadata keys. Anything else found on a page is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MetadataKey {
    Title,
    Description,
    Author,
    SiteName,
    Type,
    CanonicalUrl,
    PublishedTime,
}

impl MetadataKey {
    /// Keys that may be read directly from `<meta>` tags.
    pub const META_TAG_KEYS: [MetadataKey; 5] = [
        MetadataKey::Title,
        MetadataKey::Description,
        MetadataKey::Author,
        MetadataKey::SiteName,
        MetadataKey::Type,
    ];

    pub const ALL: [MetadataKey; 7] = [
        MetadataKey::Title,
        MetadataKey::Description,
        MetadataKey::Author,
        MetadataKey::SiteName,
        MetadataKey::Type,
        MetadataKey::CanonicalUrl,
        MetadataKey::PublishedTime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataKey::Title => "title",
            MetadataKey::Description => "description",
            MetadataKey::Author => "author",
            MetadataKey::SiteName => "site_name",
            MetadataKey::Type => "type",
            MetadataKey::CanonicalUrl => "canonical_url",
            MetadataKey::PublishedTime => "published_time",
        }
    }

    /// Look up a persisted key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }

    /// Look up a `<meta>` tag key (already stripped of `og:`/`twitter:`).
    pub fn from_meta_name(name: &str) -> Option<Self> {
        Self::META_TAG_KEYS.into_iter().find(|key| key.as_str() == name)
    }
}

/// Page metadata keyed by the fixed allow-list.
pub type Metadata = BTreeMap<MetadataKey, String>;

/// Read metadata written by any version: unknown keys and non-string values
/// (older captures stored `null` for a missing published time) are dropped.
fn lenient_metadata<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Metadata, D::Error> {
    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .flatten()
        .filter_map(|(key, value)| match value {
            Value::String(text) => MetadataKey::from_key(&key).map(|key| (key, text)),
            _ => None,
        })
        .collect())
}

/// A captured piece of content.
///
/// Field names match the persisted blob shape: the fingerprint is stored
/// under `hash`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ContentRecord {
    pub title: String,
    pub url: String,
    pub content: String,
    #[serde(default, deserialize_with = "lenient_metadata")]
    #[schemars(with = "Metadata")]
    pub metadata: Metadata,
    /// Capture instant in milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(rename = "hash")]
    pub fingerprint: String,
}

impl ContentRecord {
    /// Build a record stamped with the current time.
    ///
    /// The fingerprint is derived from `content` and `url`; `title` is
    /// validated and capped, falling back to [`default_title`] when blank.
    pub fn new(title: &str, url: impl Into<String>, content: impl Into<String>, metadata: Metadata) -> Self {
        let url = url.into();
        let content = content.into();
        let title = validate_title(title).unwrap_or_else(|_| default_title());
        let fingerprint = fingerprint(&content, &url);

        Self { title, url, content, metadata, timestamp: Utc::now().timestamp_millis(), fingerprint }
    }

    /// Check a record received from outside before it is stored.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` when the title is blank or too long, the
    /// content is blank or longer than [`MAX_CONTENT_CHARS`], or `hash` is not
    /// the fingerprint of `content` and `url`.
    pub fn validate(&self) -> Result<(), Error> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidInput("title cannot be empty".into()));
        }
        if self.title.chars().count() > MAX_TITLE_CHARS {
            return Err(Error::InvalidInput(format!("title exceeds {MAX_TITLE_CHARS} characters")));
        }
        if self.content.trim().is_empty() {
            return Err(Error::InvalidInput("content cannot be empty".into()));
        }
        let chars = self.content.chars().count();
        if chars > MAX_CONTENT_CHARS {
            return Err(Error::InvalidInput(format!("content is {chars} characters, limit is {MAX_CONTENT_CHARS}")));
        }
        if self.fingerprint != fingerprint(&self.content, &self.url) {
            return Err(Error::InvalidInput("hash does not match content and url".into()));
        }
        Ok(())
    }

    /// Whether this record came from the clipboard rather than a page.
    pub fn is_clipboard(&self) -> bool {
        self.url == CLIPBOARD_URL
    }

    /// Capture time in the local timezone, for display.
    pub fn captured_at(&self) -> Option<chrono::DateTime<Local>> {
        chrono::DateTime::from_timestamp_millis(self.timestamp).map(|dt| dt.with_timezone(&Local))
    }
}

/// Generated title used when nothing better is available.
pub fn default_title() -> String {
    format!("Note - {}", Local::now().format("%Y-%m-%d %H:%M"))
}

/// Trim a title, reject it when blank and cap its length.
pub fn validate_title(title: &str) -> Result<String, Error> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("title cannot be empty".into()));
    }
    Ok(truncate_chars(trimmed, MAX_TITLE_CHARS).trim_end().to_string())
}

/// Truncate to at most `max` characters without splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_title_trims() {
        assert_eq!(validate_title("  Hello  ").unwrap(), "Hello");
    }

    #[test]
    fn test_validate_title_rejects_blank() {
        assert!(matches!(validate_title("   "), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_validate_title_caps_length() {
        let long = "x".repeat(MAX_TITLE_CHARS + 50);
        assert_eq!(validate_title(&long).unwrap().chars().count(), MAX_TITLE_CHARS);
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_default_title_format() {
        let title = default_title();
        let re = title.strip_prefix("Note - ").unwrap();
        assert_eq!(re.len(), "2025-01-20 09:30".len());
        assert_eq!(&re[4..5], "-");
        assert_eq!(&re[10..11], " ");
        assert_eq!(&re[13..14], ":");
    }

    #[test]
    fn test_new_record_blank_title_falls_back() {
        let record = ContentRecord::new("", CLIPBOARD_URL, "some text", Metadata::new());
        assert!(record.title.starts_with("Note - "));
        assert!(record.is_clipboard());
        assert_eq!(record.fingerprint.len(), 12);
    }

    #[test]
    fn test_record_serializes_hash_field() {
        let mut metadata = Metadata::new();
        metadata.insert(MetadataKey::SiteName, "Example".into());
        let record = ContentRecord::new("Title", "https://example.com", "body", metadata);
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["hash"], record.fingerprint.as_str());
        assert_eq!(value["metadata"]["site_name"], "Example");
        assert!(value.get("fingerprint").is_none());
    }

    #[test]
    fn test_validate_accepts_new_record() {
        let record = ContentRecord::new("Title", "https://example.com", "body", Metadata::new());
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_title() {
        let mut record = ContentRecord::new("Title", "https://example.com", "body", Metadata::new());
        record.title = "  ".into();
        assert!(matches!(record.validate(), Err(Error::InvalidInput(msg)) if msg == "title cannot be empty"));
    }

    #[test]
    fn test_validate_rejects_empty_and_oversized_content() {
        let empty = ContentRecord::new("Title", "u", " ", Metadata::new());
        assert!(matches!(empty.validate(), Err(Error::InvalidInput(_))));

        let at_cap = ContentRecord::new("Title", "u", "x".repeat(MAX_CONTENT_CHARS), Metadata::new());
        assert!(at_cap.validate().is_ok());

        let over = ContentRecord::new("Title", "u", "x".repeat(150_000), Metadata::new());
        assert!(matches!(over.validate(), Err(Error::InvalidInput(msg)) if msg.contains("150000")));
    }

    #[test]
    fn test_validate_rejects_mismatched_hash() {
        let mut record = ContentRecord::new("Title", "https://example.com", "body", Metadata::new());
        record.fingerprint = "not-a-hash".into();
        assert!(matches!(record.validate(), Err(Error::InvalidInput(msg)) if msg.contains("hash")));

        record.fingerprint = fingerprint("body", "https://other.example");
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_metadata_drops_null_and_unknown_entries() {
        let record: ContentRecord = serde_json::from_str(
            r#"{"title": "T", "url": "u", "content": "c", "timestamp": 1, "hash": "abcdefabcdef",
                "metadata": {"published_time": null, "author": "Ann", "keywords": "x", "type": 3}}"#,
        )
        .unwrap();
        assert_eq!(record.metadata.len(), 1);
        assert_eq!(record.metadata[&MetadataKey::Author], "Ann");
    }

    #[test]
    fn test_metadata_null_mapping_is_empty() {
        let record: ContentRecord = serde_json::from_str(
            r#"{"title": "T", "url": "u", "content": "c", "timestamp": 1, "hash": "abcdefabcdef", "metadata": null}"#,
        )
        .unwrap();
        assert!(record.metadata.is_empty());
    }

    #[test]
    fn test_metadata_key_from_key() {
        assert_eq!(MetadataKey::from_key("published_time"), Some(MetadataKey::PublishedTime));
        assert_eq!(MetadataKey::from_key("keywords"), None);
    }

    #[test]
    fn test_metadata_key_from_meta_name() {
        assert_eq!(MetadataKey::from_meta_name("site_name"), Some(MetadataKey::SiteName));
        assert_eq!(MetadataKey::from_meta_name("canonical_url"), None);
        assert_eq!(MetadataKey::from_meta_name("keywords"), None);
    }
}
