//! An assembled document as the painting and clipboard layers see it.

use folio_core::{BlockId, IndexedBlock};
use folio_markdown::buffer::{LINE_SEPARATOR, OBJECT_REPLACEMENT};
use folio_markdown::{
    AssembledDocument, BlockTag, DocumentAssembler, FontMetrics, StyledBuffer, SyntectHighlighter,
    TableOverlay,
};
use std::collections::HashSet;
use std::ops::Range;

use crate::pipeline::AttachmentSlots;
use crate::settings::ViewerSettings;

/// Axis-aligned rectangle in view coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Smallest rectangle containing every rect in `rects`.
///
/// A code block wrapped across lines lays out as several fragments; the
/// painter draws one container around their union.
pub fn union_rects(rects: &[Rect]) -> Option<Rect> {
    let (first, rest) = rects.split_first()?;
    let (mut left, mut top, mut right, mut bottom) = (first.x, first.y, first.right(), first.bottom());
    for rect in rest {
        left = left.min(rect.x);
        top = top.min(rect.y);
        right = right.max(rect.right());
        bottom = bottom.max(rect.bottom());
    }
    Some(Rect::new(left, top, right - left, bottom - top))
}

/// Buffer ranges stamped with one code block's tag.
#[derive(Clone, Debug, PartialEq)]
pub struct CodeBlockRegion {
    pub tag: BlockTag,
    /// Disjoint, ascending. More than one when other tags were stamped in
    /// between.
    pub fragments: Vec<Range<usize>>,
}

/// A selection inside one table, in every clipboard flavor.
#[derive(Clone, Debug, PartialEq)]
pub struct TableClipboard {
    pub text: String,
    pub html: String,
    pub rtf: String,
}

pub struct RenderedDocument {
    document: AssembledDocument,
    block_ids: Vec<BlockId>,
    theme_id: &'static str,
}

impl RenderedDocument {
    /// Assemble `blocks` with the viewer's settings, highlighting code with
    /// the bundled syntect highlighter.
    pub fn assemble(
        blocks: &[IndexedBlock],
        settings: &ViewerSettings,
        system_is_dark: bool,
        container_width: f32,
        metrics: &dyn FontMetrics,
    ) -> Self {
        let config = settings.assembly_config(system_is_dark, container_width);
        let highlighter = SyntectHighlighter::for_palette(&config.palette);
        let document = DocumentAssembler::new(&config, metrics)
            .with_highlighter(&highlighter)
            .assemble(blocks);
        Self::new(blocks, document, settings.theme_id(system_is_dark))
    }

    /// Wrap an already assembled document.
    pub fn new(blocks: &[IndexedBlock], document: AssembledDocument, theme_id: &'static str) -> Self {
        Self {
            document,
            block_ids: blocks.iter().map(IndexedBlock::id).collect(),
            theme_id,
        }
    }

    pub fn document(&self) -> &AssembledDocument {
        &self.document
    }

    pub fn buffer(&self) -> &StyledBuffer {
        &self.document.buffer
    }

    pub fn block_ids(&self) -> &[BlockId] {
        &self.block_ids
    }

    pub fn theme_id(&self) -> &'static str {
        self.theme_id
    }

    /// Fresh placeholder slots for this document's attachments.
    pub fn attachment_slots(&self) -> AttachmentSlots {
        AttachmentSlots::new(&self.document.attachments)
    }

    /// Plain text for the clipboard.
    ///
    /// Parts of the selection inside a table are copied cell-wise as
    /// tab-delimited rows; everything else is copied as text with line
    /// separators turned into newlines and anchor characters dropped.
    pub fn copy_selection(&self, range: Range<usize>) -> String {
        let len = self.buffer().len();
        let range = range.start.min(len)..range.end.min(len);
        if range.is_empty() {
            return String::new();
        }

        let mut out = String::new();
        let mut cursor = range.start;
        for overlay in self.overlays_in(&range) {
            if cursor < overlay.range.start {
                out.push_str(&self.plain_text(cursor..overlay.range.start));
            }
            let start = range.start.max(overlay.range.start);
            let end = range.end.min(overlay.range.end);
            let map = &overlay.cell_map;
            let cells = map.cells_in_range(start - overlay.range.start..end - overlay.range.start);
            out.push_str(&map.tab_delimited_text(&cells));
            cursor = end;
        }
        if cursor < range.end {
            out.push_str(&self.plain_text(cursor..range.end));
        }
        out
    }

    /// Rich clipboard flavors when `range` lies inside a single table.
    pub fn table_clipboard(&self, range: Range<usize>) -> Option<TableClipboard> {
        let overlay = self.document.overlay_at(range.start)?;
        if range.end > overlay.range.end {
            return None;
        }
        let base = overlay.range.start;
        let cells = overlay
            .cell_map
            .cells_in_range(range.start - base..range.end - base);
        if cells.is_empty() {
            return None;
        }
        Some(TableClipboard {
            text: overlay.cell_map.tab_delimited_text(&cells),
            html: overlay.cell_map.html(&cells),
            rtf: overlay.cell_map.rtf(&cells),
        })
    }

    fn overlays_in<'a>(&'a self, range: &Range<usize>) -> impl Iterator<Item = &'a TableOverlay> + 'a {
        let range = range.clone();
        self.document
            .table_overlays
            .iter()
            .filter(move |o| o.range.start < range.end && range.start < o.range.end)
    }

    fn plain_text(&self, range: Range<usize>) -> String {
        self.buffer()
            .slice(range)
            .chars()
            .filter(|c| *c != OBJECT_REPLACEMENT)
            .map(|c| if c == LINE_SEPARATOR { '\n' } else { c })
            .collect()
    }

    /// Every code block's tagged fragments, in document order.
    pub fn code_block_regions(&self) -> Vec<CodeBlockRegion> {
        let table_tags: HashSet<BlockTag> = self
            .document
            .table_overlays
            .iter()
            .map(|o| o.tag)
            .collect();

        let mut regions: Vec<CodeBlockRegion> = Vec::new();
        for (range, tag) in self.buffer().block_tags().iter() {
            if table_tags.contains(tag) {
                continue;
            }
            match regions.iter_mut().find(|r| r.tag == *tag) {
                Some(region) => region.fragments.push(range.clone()),
                None => regions.push(CodeBlockRegion {
                    tag: *tag,
                    fragments: vec![range.clone()],
                }),
            }
        }
        regions
    }

    /// Ids of blocks in this render that `previous` did not have.
    pub fn changed_blocks(&self, previous: &RenderedDocument) -> Vec<BlockId> {
        let before: HashSet<BlockId> = previous.block_ids.iter().copied().collect();
        self.block_ids
            .iter()
            .copied()
            .filter(|id| !before.contains(id))
            .collect()
    }

    /// Ids of blocks in `previous` that are gone from this render.
    pub fn removed_blocks(&self, previous: &RenderedDocument) -> Vec<BlockId> {
        let now: HashSet<BlockId> = self.block_ids.iter().copied().collect();
        previous
            .block_ids
            .iter()
            .copied()
            .filter(|id| !now.contains(id))
            .collect()
    }
}
