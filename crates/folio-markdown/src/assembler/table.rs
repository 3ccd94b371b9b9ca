//! Tables.
//!
//! In overlay mode the cell text goes into the buffer as invisible shadow
//! text (visible when printing) and the grid is painted from the overlay
//! entry. Each shadow row is its own paragraph whose minimum line height is
//! the estimated row height, so the text lines up with the painted rows.

use folio_core::{Block, InlineText, Rgba, TableColumn};
use std::sync::Arc;

use super::{BlockContext, DocumentAssembler, Frame, Output, TableOverlay};
use crate::buffer::{ParagraphStyle, TextStyle};
use crate::config::{spacing, TableRendering};
use crate::geometry::CELL_PADDING_H;
use crate::table::{TableCellMap, HEADER_ROW};

impl DocumentAssembler<'_> {
    pub(super) fn append_table(
        &self,
        out: &mut Output,
        ctx: &mut BlockContext,
        block: &Block,
        columns: &[TableColumn],
        rows: &[Vec<InlineText>],
        frame: Frame,
    ) {
        if columns.is_empty() {
            return;
        }

        let font = self.config.body_font();
        let width = (self.config.container_width - frame.indent).max(1.0);
        let (text, cell_map) = TableCellMap::build(columns, rows, self.metrics, &font, width);

        if self.config.table_rendering == TableRendering::Image && !self.config.is_print() {
            self.append_attachment(out, ctx, block, cell_map.total_height(), frame);
            return;
        }

        let palette = &self.config.palette;
        let foreground = if self.config.is_print() {
            Rgba::opaque(palette.foreground)
        } else {
            Rgba::TRANSPARENT
        };
        let style = TextStyle::new(font, foreground);
        let start = out.buffer.len();
        // A single empty column has no text at all; one blank keeps a line
        // for the grid to sit on
        let shadow = if text.is_empty() {
            log::debug!("Table at block {} has no cell text", ctx.index);
            " "
        } else {
            text.as_str()
        };
        let text_range = out.buffer.push_str(shadow, &style);

        let Some(terminator) = out.buffer.ensure_terminator(&style) else {
            return;
        };

        // Each column after the first starts at a tab stop, inset like the
        // painted cells
        let inset = frame.indent + CELL_PADDING_H;
        let tab_stops: Vec<f32> = cell_map
            .column_widths
            .iter()
            .scan(inset, |edge, width| {
                *edge += width;
                Some(*edge)
            })
            .take(cell_map.column_count.saturating_sub(1))
            .collect();

        let spans = cell_map.row_spans();
        let last = spans.len().saturating_sub(1);
        for (i, (row, span)) in spans.into_iter().enumerate() {
            let text_span = start + span.start..start + span.end;
            if row == HEADER_ROW {
                out.buffer.set_font(text_span.clone(), font.bold());
            }
            // The last row's paragraph runs through the terminator
            let paragraph_span = if i == last {
                text_span.start..terminator + 1
            } else {
                text_span
            };
            let paragraph = ParagraphStyle {
                space_before: if i == 0 {
                    self.config.scaled(spacing::PARAGRAPH_SPACE_BEFORE)
                } else {
                    0.0
                },
                head_indent: inset,
                first_line_head_indent: inset,
                min_line_height: cell_map.row_heights.get(i).copied(),
                tab_stops: tab_stops.clone(),
                ..ParagraphStyle::default()
            };
            out.buffer.set_paragraph_style(paragraph_span, paragraph);
        }

        let cell_map = Arc::new(cell_map);
        let table_id = out.buffer.add_table(Arc::clone(&cell_map));
        out.buffer.set_table(text_range.clone(), table_id);

        let tag = ctx.next_tag();
        out.buffer.set_block_tag(start..terminator + 1, tag);
        out.table_overlays.push(TableOverlay {
            block_index: ctx.index,
            block: block.clone(),
            tag,
            range: text_range,
            cell_map,
        });
    }
}
