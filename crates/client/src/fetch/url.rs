//! URL canonicalization for page captures.
//!
//! The canonical form is what ends up in a record's `url`, and the url is
//! part of the fingerprint, so equivalent spellings must agree.

use std::borrow::Cow;

use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Canonicalize a URL typed or pasted by the user.
///
/// Trims whitespace, assumes `https://` when no scheme is given, accepts
/// only http(s) with a host, and drops the fragment. Host case is
/// normalized by the parser; the query string is kept as-is.
pub fn canonicalize(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let with_scheme =
        if trimmed.contains("://") { Cow::Borrowed(trimmed) } else { Cow::Owned(format!("https://{trimmed}")) };

    let mut url = Url::parse(&with_scheme).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlError::UnsupportedScheme(url.scheme().to_string()));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlError::InvalidUrl(format!("missing host in {trimmed}")));
    }

    url.set_fragment(None);
    Ok(url)
}
