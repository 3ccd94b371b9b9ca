//! Block IR types.
//!
//! The parser hands the viewer an ordered list of [`IndexedBlock`]s. Blocks are
//! a recursive tree (lists and blockquotes contain blocks); inline content is
//! a tree of [`Inline`] nodes.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::types::Alignment;

/// Inline content within a block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Inline {
    Text(String),
    Code(String),
    Bold(Vec<Inline>),
    Italic(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Link { url: String, children: Vec<Inline> },
    /// Inline LaTeX source, without delimiters.
    Math(String),
    /// Hard line break inside a paragraph.
    LineBreak,
}

/// A run of formatted inline content.
pub type InlineText = Vec<Inline>;

/// Task list marker on a list item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Checkbox {
    Unchecked,
    Checked,
}

/// A list item: any number of child blocks plus an optional task marker.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Item {
    pub blocks: Vec<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkbox: Option<Checkbox>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableColumn {
    pub header: InlineText,
    #[serde(default)]
    pub alignment: Alignment,
}

/// A node in the block IR.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Heading { level: u8, content: InlineText },
    Paragraph { content: InlineText },
    CodeBlock { language: Option<String>, code: String },
    DiagramBlock { code: String },
    MathBlock { code: String },
    Blockquote { blocks: Vec<Block> },
    OrderedList { items: Vec<Item> },
    UnorderedList { items: Vec<Item> },
    ThematicBreak,
    Table { columns: Vec<TableColumn>, rows: Vec<Vec<InlineText>> },
    HtmlBlock { raw: String },
    Image { source: String, alt: String },
}

impl Block {
    /// Stable name of the variant, used in logs and identity hashing.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Block::Heading { .. } => "heading",
            Block::Paragraph { .. } => "paragraph",
            Block::CodeBlock { .. } => "code_block",
            Block::DiagramBlock { .. } => "diagram_block",
            Block::MathBlock { .. } => "math_block",
            Block::Blockquote { .. } => "blockquote",
            Block::OrderedList { .. } => "ordered_list",
            Block::UnorderedList { .. } => "unordered_list",
            Block::ThematicBreak => "thematic_break",
            Block::Table { .. } => "table",
            Block::HtmlBlock { .. } => "html_block",
            Block::Image { .. } => "image",
        }
    }

    /// Whether the block carries no content beyond its kind.
    pub fn is_content_free(&self) -> bool {
        matches!(self, Block::ThematicBreak)
    }

    /// Flatten the block to plain text. Nested blocks are joined with
    /// newlines, table cells with tabs.
    pub fn plain_text(&self) -> String {
        match self {
            Block::Heading { content, .. } | Block::Paragraph { content } => {
                inline_plain_text(content)
            }
            Block::CodeBlock { code, .. }
            | Block::DiagramBlock { code }
            | Block::MathBlock { code } => code.trim_end_matches('\n').to_string(),
            Block::Blockquote { blocks } => join_plain_text(blocks),
            Block::OrderedList { items } | Block::UnorderedList { items } => items
                .iter()
                .map(|item| join_plain_text(&item.blocks))
                .collect::<Vec<_>>()
                .join("\n"),
            Block::ThematicBreak => String::new(),
            Block::Table { columns, rows } => {
                let mut lines = Vec::with_capacity(rows.len() + 1);
                lines.push(
                    columns
                        .iter()
                        .map(|c| inline_plain_text(&c.header))
                        .collect::<Vec<_>>()
                        .join("\t"),
                );
                for row in rows {
                    lines.push(
                        row.iter()
                            .map(|cell| inline_plain_text(cell))
                            .collect::<Vec<_>>()
                            .join("\t"),
                    );
                }
                lines.join("\n")
            }
            Block::HtmlBlock { raw } => raw.trim_end_matches('\n').to_string(),
            Block::Image { alt, .. } => alt.clone(),
        }
    }
}

fn join_plain_text(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(Block::plain_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render inline content as plain text (for copy, cell content, fallbacks).
pub fn inline_plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    push_plain_text(inlines, &mut out);
    out
}

fn push_plain_text(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text(t) | Inline::Code(t) | Inline::Math(t) => out.push_str(t),
            Inline::Bold(children)
            | Inline::Italic(children)
            | Inline::Strikethrough(children)
            | Inline::Link { children, .. } => push_plain_text(children, out),
            Inline::LineBreak => out.push('\n'),
        }
    }
}

/// Deterministic identity of a block at a given document position.
///
/// Derived from the position and the block's canonical JSON form, so two
/// independent builds of the same `(position, block)` pair always agree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub u64);

impl BlockId {
    pub fn derive(position: usize, block: &Block) -> Self {
        let mut hasher = Sha256::new();
        hasher.update((position as u64).to_le_bytes());
        if block.is_content_free() {
            hasher.update(block.kind_name().as_bytes());
        } else {
            match serde_json::to_vec(block) {
                Ok(bytes) => hasher.update(&bytes),
                Err(e) => {
                    log::warn!("Failed to serialize {} block for hashing: {}", block.kind_name(), e);
                    hasher.update(block.kind_name().as_bytes());
                }
            }
        }
        Self::from_digest(&hasher.finalize())
    }

    /// Identity of the `ordinal`-th nested region inside this block.
    pub fn child(self, ordinal: u32) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(self.0.to_le_bytes());
        hasher.update(ordinal.to_le_bytes());
        Self::from_digest(&hasher.finalize())
    }

    fn from_digest(digest: &[u8]) -> Self {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        BlockId(u64::from_be_bytes(bytes))
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// A top-level block together with its position in the document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexedBlock {
    pub position: usize,
    pub block: Block,
}

impl IndexedBlock {
    pub fn new(position: usize, block: Block) -> Self {
        Self { position, block }
    }

    /// Number a block list in document order.
    pub fn enumerate(blocks: impl IntoIterator<Item = Block>) -> Vec<IndexedBlock> {
        blocks
            .into_iter()
            .enumerate()
            .map(|(position, block)| IndexedBlock { position, block })
            .collect()
    }

    pub fn id(&self) -> BlockId {
        BlockId::derive(self.position, &self.block)
    }
}
