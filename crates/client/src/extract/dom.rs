//! Document access used by the extraction heuristics.
//!
//! The heuristics only need a handful of queries, so they are written
//! against [`DocumentView`]. [`HtmlDocument`] implements it over a parsed
//! HTML string with scraper; tests can supply synthetic trees instead.

use std::collections::BTreeMap;

use scraper::{ElementRef, Html, Selector};

/// Elements whose text is never visible.
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Elements rendered on their own line.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "details", "div", "dl", "dt", "figcaption", "figure",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p", "pre",
    "section", "summary", "table", "tr", "ul",
];

/// An element copied out of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementSnapshot {
    pub attributes: BTreeMap<String, String>,
    /// Visible text, with line breaks around block-level descendants.
    pub text: String,
}

impl ElementSnapshot {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Read-only queries over a loaded document.
pub trait DocumentView {
    /// First element matching a CSS selector, in document order.
    fn query_first(&self, selector: &str) -> Option<ElementSnapshot>;

    /// All elements matching a CSS selector, in document order.
    fn query_all(&self, selector: &str) -> Vec<ElementSnapshot>;

    /// Trimmed, non-empty text nodes under `<body>`, skipping any node with
    /// an ancestor in `skip_tags`.
    fn walk_text(&self, skip_tags: &[&str]) -> Vec<String>;

    /// The document's `<title>` text.
    fn title(&self) -> Option<String>;

    /// Walk `selectors` in priority order and return the first result of
    /// `accept` on each selector's first match.
    fn first_accepted<T>(&self, selectors: &[&str], mut accept: impl FnMut(&ElementSnapshot) -> Option<T>) -> Option<T>
    where
        Self: Sized,
    {
        selectors
            .iter()
            .filter_map(|selector| self.query_first(selector))
            .find_map(|element| accept(&element))
    }
}

/// A parsed HTML document.
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    pub fn parse(source: &str) -> Self {
        Self { html: Html::parse_document(source) }
    }

    fn selector(selector: &str) -> Option<Selector> {
        match Selector::parse(selector) {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::warn!(selector, error = %e, "invalid selector");
                None
            }
        }
    }

    fn body(&self) -> ElementRef<'_> {
        Self::selector("body")
            .and_then(|s| self.html.select(&s).next())
            .unwrap_or_else(|| self.html.root_element())
    }
}

impl DocumentView for HtmlDocument {
    fn query_first(&self, selector: &str) -> Option<ElementSnapshot> {
        let selector = Self::selector(selector)?;
        self.html.select(&selector).next().map(snapshot)
    }

    fn query_all(&self, selector: &str) -> Vec<ElementSnapshot> {
        match Self::selector(selector) {
            Some(selector) => self.html.select(&selector).map(snapshot).collect(),
            None => Vec::new(),
        }
    }

    fn walk_text(&self, skip_tags: &[&str]) -> Vec<String> {
        let mut out = Vec::new();
        collect_text_nodes(self.body(), skip_tags, &mut out);
        out
    }

    fn title(&self) -> Option<String> {
        let text = self.query_first("title")?.text;
        let title = text.split_whitespace().collect::<Vec<_>>().join(" ");
        (!title.is_empty()).then_some(title)
    }
}

fn snapshot(element: ElementRef<'_>) -> ElementSnapshot {
    let attributes = element
        .value()
        .attrs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let mut text = String::new();
    collect_visible_text(element, &mut text);

    ElementSnapshot { attributes, text }
}

/// Approximates `innerText`: hidden elements contribute nothing, block
/// elements and `<br>` contribute line breaks.
fn collect_visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            let name = child.value().name();
            if HIDDEN_TAGS.contains(&name) {
                continue;
            }
            if name == "br" {
                out.push('\n');
                continue;
            }
            let block = BLOCK_TAGS.contains(&name);
            if block {
                out.push('\n');
            }
            collect_visible_text(child, out);
            if block {
                out.push('\n');
            }
        }
    }
}

fn collect_text_nodes(element: ElementRef<'_>, skip_tags: &[&str], out: &mut Vec<String>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                out.push(trimmed.to_string());
            }
        } else if let Some(child) = ElementRef::wrap(child) {
            let name = child.value().name();
            if !skip_tags.contains(&name) && !HIDDEN_TAGS.contains(&name) {
                collect_text_nodes(child, skip_tags, out);
            }
        }
    }
}
