//! The flat styled buffer produced by assembly.
//!
//! Text lives in a single `String`; every attribute is a separate
//! [`IntervalMap`] channel keyed by character offset (Unicode scalar values,
//! not bytes). Heavy attribute values (paragraph styles, link targets,
//! images, table indices) are stored once in side tables and referenced from
//! the channels by small `Copy` ids.

use folio_core::{Alignment, BlockId, Rgba};
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use crate::attachments::AttachmentHandle;
use crate::fonts::FontSpec;
use crate::interval::IntervalMap;
use crate::math::MathImage;
use crate::table::TableCellMap;

/// Ends every block-level paragraph.
pub const BLOCK_TERMINATOR: char = '\n';
/// Line break that stays inside the current paragraph.
pub const LINE_SEPARATOR: char = '\u{2028}';
/// Anchor character for attachments and inline images.
pub const OBJECT_REPLACEMENT: char = '\u{FFFC}';

/// Opaque identifier stamped across every character of one block instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockTag(pub u64);

impl From<BlockId> for BlockTag {
    fn from(id: BlockId) -> Self {
        BlockTag(id.0)
    }
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block-{:016x}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParagraphStyleId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LinkId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TableId(pub u32);

/// Block-level layout attributes, in points.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ParagraphStyle {
    pub space_before: f32,
    /// Indent of every line but the first.
    pub head_indent: f32,
    pub first_line_head_indent: f32,
    pub alignment: Alignment,
    /// Minimum line height; placeholders use it to reserve vertical space.
    pub min_line_height: Option<f32>,
    pub tab_stops: Vec<f32>,
}

impl ParagraphStyle {
    /// Both indents set to `indent`.
    pub fn indented(indent: f32) -> Self {
        Self {
            head_indent: indent,
            first_line_head_indent: indent,
            ..Self::default()
        }
    }

    pub fn with_space_before(mut self, space: f32) -> Self {
        self.space_before = space;
        self
    }
}

/// Character-level attributes applied together when text is appended.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub font: FontSpec,
    pub foreground: Rgba,
    pub background: Option<Rgba>,
    pub underline: bool,
    pub strikethrough: bool,
    pub link: Option<LinkId>,
}

impl TextStyle {
    pub fn new(font: FontSpec, foreground: Rgba) -> Self {
        Self {
            font,
            foreground,
            background: None,
            underline: false,
            strikethrough: false,
            link: None,
        }
    }

    pub fn with_background(mut self, background: Rgba) -> Self {
        self.background = Some(background);
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct StyledBuffer {
    text: String,
    len: usize,

    font: IntervalMap<FontSpec>,
    foreground: IntervalMap<Rgba>,
    background: IntervalMap<Rgba>,
    underline: IntervalMap<()>,
    strikethrough: IntervalMap<()>,
    link: IntervalMap<LinkId>,
    paragraph: IntervalMap<ParagraphStyleId>,
    block_tag: IntervalMap<BlockTag>,
    attachment: IntervalMap<AttachmentHandle>,
    inline_image: IntervalMap<ImageId>,
    table: IntervalMap<TableId>,

    paragraph_styles: Vec<ParagraphStyle>,
    links: Vec<String>,
    images: Vec<MathImage>,
    tables: Vec<Arc<TableCellMap>>,
    terminators: Vec<usize>,
}

impl StyledBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Characters in `range`, by character offset.
    pub fn slice(&self, range: Range<usize>) -> String {
        self.text
            .chars()
            .skip(range.start)
            .take(range.end.saturating_sub(range.start))
            .collect()
    }

    /// Append `text` with `style`, returning the covered range.
    pub fn push_str(&mut self, text: &str, style: &TextStyle) -> Range<usize> {
        let start = self.len;
        let count = text.chars().count();
        if count == 0 {
            return start..start;
        }
        self.text.push_str(text);
        self.len += count;
        let range = start..self.len;
        self.stamp(range.clone(), style);
        range
    }

    pub fn push_char(&mut self, c: char, style: &TextStyle) -> usize {
        let offset = self.len;
        self.text.push(c);
        self.len += 1;
        self.stamp(offset..self.len, style);
        offset
    }

    fn stamp(&mut self, range: Range<usize>, style: &TextStyle) {
        self.font.insert(range.clone(), style.font);
        self.foreground.insert(range.clone(), style.foreground);
        if let Some(bg) = style.background {
            self.background.insert(range.clone(), bg);
        }
        if style.underline {
            self.underline.insert(range.clone(), ());
        }
        if style.strikethrough {
            self.strikethrough.insert(range.clone(), ());
        }
        if let Some(link) = style.link {
            self.link.insert(range, link);
        }
    }

    /// Terminate the current block unless it is already terminated.
    ///
    /// Returns the terminator's offset when one was appended. An empty buffer
    /// or one ending in a block terminator is left untouched, so a block that
    /// produced no content never leaves a blank line behind.
    pub fn ensure_terminator(&mut self, style: &TextStyle) -> Option<usize> {
        if self.len == 0 || self.terminators.last() == Some(&(self.len - 1)) {
            return None;
        }
        let offset = self.push_char(BLOCK_TERMINATOR, style);
        self.terminators.push(offset);
        Some(offset)
    }

    /// Offsets of every block-level terminator, ascending.
    pub fn terminators(&self) -> &[usize] {
        &self.terminators
    }

    pub fn intern_paragraph_style(&mut self, style: ParagraphStyle) -> ParagraphStyleId {
        if let Some(idx) = self.paragraph_styles.iter().position(|s| *s == style) {
            return ParagraphStyleId(idx as u32);
        }
        self.paragraph_styles.push(style);
        ParagraphStyleId(self.paragraph_styles.len() as u32 - 1)
    }

    pub fn set_paragraph_style(&mut self, range: Range<usize>, style: ParagraphStyle) {
        let id = self.intern_paragraph_style(style);
        self.paragraph.insert(range, id);
    }

    pub fn paragraph_style(&self, id: ParagraphStyleId) -> Option<&ParagraphStyle> {
        self.paragraph_styles.get(id.0 as usize)
    }

    /// Paragraph style in effect at `offset`.
    pub fn paragraph_style_at(&self, offset: usize) -> Option<&ParagraphStyle> {
        self.paragraph
            .get(offset)
            .and_then(|id| self.paragraph_style(*id))
    }

    /// Zero the space before the first paragraph so the container inset alone
    /// decides the gap above the first line.
    pub fn reset_leading_space(&mut self) {
        let Some((range, id)) = self.paragraph.entry_at(0) else {
            return;
        };
        let Some(style) = self.paragraph_style(*id) else {
            return;
        };
        if style.space_before == 0.0 {
            return;
        }
        let style = style.clone().with_space_before(0.0);
        let first_end = self
            .terminators
            .first()
            .map(|t| t + 1)
            .unwrap_or(self.len)
            .min(range.end);
        self.set_paragraph_style(0..first_end, style);
    }

    pub fn add_link(&mut self, url: &str) -> LinkId {
        if let Some(idx) = self.links.iter().position(|l| l == url) {
            return LinkId(idx as u32);
        }
        self.links.push(url.to_string());
        LinkId(self.links.len() as u32 - 1)
    }

    pub fn link_url(&self, id: LinkId) -> Option<&str> {
        self.links.get(id.0 as usize).map(String::as_str)
    }

    /// Append an attachment anchor character.
    pub fn push_attachment_anchor(&mut self, handle: AttachmentHandle, style: &TextStyle) -> usize {
        let offset = self.push_char(OBJECT_REPLACEMENT, style);
        self.attachment.insert(offset..offset + 1, handle);
        offset
    }

    /// Append an inline image (typeset math) anchor character.
    pub fn push_inline_image(&mut self, image: MathImage, style: &TextStyle) -> usize {
        let id = ImageId(self.images.len() as u32);
        self.images.push(image);
        let offset = self.push_char(OBJECT_REPLACEMENT, style);
        self.inline_image.insert(offset..offset + 1, id);
        offset
    }

    pub fn image(&self, id: ImageId) -> Option<&MathImage> {
        self.images.get(id.0 as usize)
    }

    pub fn add_table(&mut self, map: Arc<TableCellMap>) -> TableId {
        self.tables.push(map);
        TableId(self.tables.len() as u32 - 1)
    }

    pub fn set_table(&mut self, range: Range<usize>, id: TableId) {
        self.table.insert(range, id);
    }

    /// The table index covering `offset`, with the table's buffer range.
    pub fn table_at(&self, offset: usize) -> Option<(Range<usize>, &Arc<TableCellMap>)> {
        let (range, id) = self.table.entry_at(offset)?;
        Some((range, self.tables.get(id.0 as usize)?))
    }

    pub fn set_block_tag(&mut self, range: Range<usize>, tag: BlockTag) {
        self.block_tag.insert(range, tag);
    }

    pub fn set_font(&mut self, range: Range<usize>, font: FontSpec) {
        self.font.insert(range, font);
    }

    // Channel accessors for the painting layer

    pub fn fonts(&self) -> &IntervalMap<FontSpec> {
        &self.font
    }

    pub fn foregrounds(&self) -> &IntervalMap<Rgba> {
        &self.foreground
    }

    pub fn backgrounds(&self) -> &IntervalMap<Rgba> {
        &self.background
    }

    pub fn underlines(&self) -> &IntervalMap<()> {
        &self.underline
    }

    pub fn strikethroughs(&self) -> &IntervalMap<()> {
        &self.strikethrough
    }

    pub fn links(&self) -> &IntervalMap<LinkId> {
        &self.link
    }

    pub fn paragraphs(&self) -> &IntervalMap<ParagraphStyleId> {
        &self.paragraph
    }

    pub fn block_tags(&self) -> &IntervalMap<BlockTag> {
        &self.block_tag
    }

    pub fn attachments(&self) -> &IntervalMap<AttachmentHandle> {
        &self.attachment
    }

    pub fn inline_images(&self) -> &IntervalMap<ImageId> {
        &self.inline_image
    }

    pub fn tables(&self) -> &IntervalMap<TableId> {
        &self.table
    }

    /// Every range stamped with `tag`, in order. Ranges are disjoint and may
    /// be discontiguous when other blocks were stamped in between.
    pub fn ranges_for_tag(&self, tag: BlockTag) -> Vec<Range<usize>> {
        self.block_tag
            .iter()
            .filter(|(_, t)| **t == tag)
            .map(|(r, _)| r.clone())
            .collect()
    }
}
