//! Metadata harvesting from `<meta>`, `<link rel="canonical">` and `<time>`.

use pdc_core::{Metadata, MetadataKey};
use url::Url;

use super::dom::DocumentView;

/// Collect the allow-listed metadata of a document.
///
/// `og:` and `twitter:` prefixes are stripped from meta keys; when a key
/// appears more than once the last tag wins. The canonical link is resolved
/// against `page_url` when both parse.
pub fn extract_metadata(doc: &impl DocumentView, page_url: &str) -> Metadata {
    let mut metadata = Metadata::new();

    for tag in doc.query_all("meta[property], meta[name]") {
        let Some(name) = tag.attr("property").or_else(|| tag.attr("name")) else {
            continue;
        };
        let Some(content) = tag.attr("content").filter(|c| !c.is_empty()) else {
            continue;
        };
        let name = name.strip_prefix("og:").unwrap_or(name);
        let name = name.strip_prefix("twitter:").unwrap_or(name);
        if let Some(key) = MetadataKey::from_meta_name(name) {
            metadata.insert(key, content.to_string());
        }
    }

    if let Some(href) = doc
        .query_first(r#"link[rel="canonical"]"#)
        .and_then(|link| link.attr("href").map(str::to_string))
    {
        metadata.insert(MetadataKey::CanonicalUrl, resolve(&href, page_url));
    }

    if let Some(published) = doc
        .query_first(r#"time[datetime], [property="article:published_time"]"#)
        .and_then(|el| el.attr("datetime").or_else(|| el.attr("content")).map(str::to_string))
        .filter(|v| !v.is_empty())
    {
        metadata.insert(MetadataKey::PublishedTime, published);
    }

    metadata
}

fn resolve(href: &str, base: &str) -> String {
    match Url::parse(base).and_then(|base| base.join(href)) {
        Ok(url) => url.to_string(),
        Err(_) => href.to_string(),
    }
}
