//! Lists and blockquotes.

use folio_core::{Block, Checkbox, Item, Rgba};

use super::{BlockContext, DocumentAssembler, Frame, Output};
use crate::buffer::{ParagraphStyle, TextStyle};
use crate::config::spacing;

const BULLETS: [char; 3] = ['•', '◦', '▪'];
const CHECKBOX_UNCHECKED: char = '☐';
const CHECKBOX_CHECKED: char = '☑';

fn item_prefix(item: &Item, ordered: bool, number: usize, depth: usize) -> String {
    match item.checkbox {
        Some(Checkbox::Unchecked) => CHECKBOX_UNCHECKED.to_string(),
        Some(Checkbox::Checked) => CHECKBOX_CHECKED.to_string(),
        None if ordered => format!("{}.", number),
        None => BULLETS[depth.min(BULLETS.len() - 1)].to_string(),
    }
}

impl DocumentAssembler<'_> {
    fn nesting_exhausted(&self, frame: Frame) -> bool {
        frame.nesting >= self.config.max_nesting_depth
    }

    pub(super) fn append_list(
        &self,
        out: &mut Output,
        ctx: &mut BlockContext,
        block: &Block,
        items: &[Item],
        ordered: bool,
        frame: Frame,
    ) {
        if self.nesting_exhausted(frame) {
            self.append_flattened(out, block, frame);
            return;
        }

        let step = self.config.scaled(spacing::LIST_PREFIX_WIDTH + spacing::LIST_PREFIX_PADDING);
        let item_indent =
            frame.list_base + self.config.scaled(spacing::LIST_BASE_INDENT) + frame.list_depth as f32 * step;
        let content_indent = item_indent + step;
        let child = Frame {
            indent: content_indent,
            list_depth: frame.list_depth + 1,
            quote_base: content_indent,
            quote_depth: 0,
            nesting: frame.nesting + 1,
            ..frame
        };

        for (i, item) in items.iter().enumerate() {
            let prefix = item_prefix(item, ordered, i + 1, frame.list_depth);
            let paragraph = ParagraphStyle {
                space_before: self.config.scaled(spacing::LIST_ITEM_SPACE_BEFORE),
                head_indent: content_indent,
                first_line_head_indent: item_indent,
                tab_stops: vec![content_indent],
                ..ParagraphStyle::default()
            };

            let mut children = item.blocks.iter();
            match item.blocks.first() {
                Some(Block::Paragraph { content }) => {
                    children.next();
                    let style = self.inline_style(self.config.body_font(), self.text_color(frame));
                    let start = out.buffer.len();
                    out.buffer.push_str(
                        &format!("{}\t", prefix),
                        &TextStyle::new(style.base_font, style.base_color),
                    );
                    for run in self.converter().convert(content, &style) {
                        run.append_to(&mut out.buffer);
                    }
                    self.finish_paragraph(out, start, style.base_font, style.base_color, paragraph);
                }
                _ => {
                    // The prefix sits alone on its line above block content
                    let font = self.config.body_font();
                    let color = Rgba::opaque(self.text_color(frame));
                    let start = out.buffer.len();
                    out.buffer.push_str(&prefix, &TextStyle::new(font, color));
                    self.finish_paragraph(out, start, font, color, paragraph);
                }
            }

            for block in children {
                self.append_block(out, ctx, block, child);
            }
        }
    }

    /// Quoted paragraphs and headings keep their formatting in the quote
    /// color; nested quotes indent further; anything else is flattened.
    pub(super) fn append_blockquote(
        &self,
        out: &mut Output,
        ctx: &mut BlockContext,
        block: &Block,
        blocks: &[Block],
        frame: Frame,
    ) {
        if self.nesting_exhausted(frame) {
            self.append_flattened(out, block, frame);
            return;
        }

        let indent =
            frame.quote_base + self.config.scaled(spacing::BLOCKQUOTE_INDENT) * (frame.quote_depth + 1) as f32;
        let child = Frame {
            indent,
            list_base: indent,
            list_depth: 0,
            quote_depth: frame.quote_depth + 1,
            nesting: frame.nesting + 1,
            color: Some(self.config.palette.quote),
            ..frame
        };

        for inner in blocks {
            match inner {
                Block::Paragraph { .. } | Block::Heading { .. } | Block::Blockquote { .. } => {
                    self.append_block(out, ctx, inner, child)
                }
                other => self.append_flattened(out, other, child),
            }
        }
    }
}
