//! Capture entry points that do not involve a page.

use pdc_core::{CLIPBOARD_URL, ContentRecord, Error, MAX_CONTENT_CHARS, Metadata};

use crate::extract::clean_content;

/// Build a record from pasted text.
///
/// # Errors
///
/// Returns `Error::InvalidInput` when the text is blank.
pub fn clipboard_record(text: &str, custom_title: Option<&str>) -> Result<ContentRecord, Error> {
    let content = clean_content(text, MAX_CONTENT_CHARS);
    if content.is_empty() {
        return Err(Error::InvalidInput("Clipboard is empty".into()));
    }
    Ok(ContentRecord::new(custom_title.unwrap_or_default(), CLIPBOARD_URL, content, Metadata::new()))
}
