//! Page-creation payloads.
//!
//! Only the `Content` property is filled; rich text is capped at
//! [`RICH_TEXT_LIMIT`] characters, so longer content is also appended to the
//! page body as paragraph blocks of at most that size.

use serde::Serialize;

/// Maximum characters in one rich-text object.
pub const RICH_TEXT_LIMIT: usize = 2000;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CreatePageRequest {
    pub parent: Parent,
    pub properties: Properties,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Parent {
    pub database_id: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Properties {
    #[serde(rename = "Content")]
    pub content: RichTextProperty,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RichTextProperty {
    pub rich_text: Vec<RichText>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RichText {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: TextContent,
}

impl RichText {
    fn plain(content: impl Into<String>) -> Self {
        Self { kind: "text", text: TextContent { content: content.into() } }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TextContent {
    pub content: String,
}

/// A paragraph block.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Block {
    pub object: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub paragraph: RichTextProperty,
}

impl CreatePageRequest {
    pub fn new(database_id: &str, content: &str) -> Self {
        let head: String = content.chars().take(RICH_TEXT_LIMIT).collect();
        let children = if content.chars().count() > RICH_TEXT_LIMIT { paragraph_blocks(content) } else { Vec::new() };

        Self {
            parent: Parent { database_id: database_id.to_string() },
            properties: Properties { content: RichTextProperty { rich_text: vec![RichText::plain(head)] } },
            children,
        }
    }
}

/// Split `content` into paragraph blocks of at most [`RICH_TEXT_LIMIT`] characters.
pub fn paragraph_blocks(content: &str) -> Vec<Block> {
    let chars: Vec<char> = content.chars().collect();
    chars
        .chunks(RICH_TEXT_LIMIT)
        .map(|chunk| Block {
            object: "block",
            kind: "paragraph",
            paragraph: RichTextProperty { rich_text: vec![RichText::plain(chunk.iter().collect::<String>())] },
        })
        .collect()
}
