//! Headings, paragraphs, raw HTML and placeholder blocks.

use folio_core::{Alignment, Block, Inline, Rgba};

use super::{BlockContext, DocumentAssembler, Frame, Output};
use crate::buffer::{ParagraphStyle, TextStyle, LINE_SEPARATOR};
use crate::config::spacing;
use crate::geometry::estimate_block_height;
use crate::math::MathStyle;

impl DocumentAssembler<'_> {
    pub(super) fn append_heading(&self, out: &mut Output, level: u8, content: &[Inline], frame: Frame) {
        let font = self.config.heading_font(level);
        let color = frame.color.unwrap_or(self.config.palette.heading);
        let style = self.inline_style(font, color);
        let paragraph = ParagraphStyle::indented(frame.indent)
            .with_space_before(self.config.heading_space_before(level));
        self.append_inlines(out, content, &style, paragraph);
    }

    pub(super) fn append_paragraph(
        &self,
        out: &mut Output,
        content: &[Inline],
        paragraph: ParagraphStyle,
        frame: Frame,
    ) {
        let style = self.inline_style(self.config.body_font(), self.text_color(frame));
        self.append_inlines(out, content, &style, paragraph);
    }

    /// Raw markup shown verbatim in monospace over a flat tint.
    pub(super) fn append_html(&self, out: &mut Output, raw: &str, frame: Frame) {
        let text: String = raw
            .trim_end_matches(['\n', '\r'])
            .chars()
            .filter(|c| *c != '\r')
            .map(|c| if c == '\n' { LINE_SEPARATOR } else { c })
            .collect();
        if text.is_empty() {
            return;
        }
        let palette = &self.config.palette;
        let font = self.config.code_font();
        let color = Rgba::opaque(palette.code_foreground);
        let style = TextStyle::new(font, color).with_background(Rgba::opaque(palette.html_background));

        let start = out.buffer.len();
        out.buffer.push_str(&text, &style);
        let paragraph = self.paragraph_style(
            frame.indent + self.config.scaled(spacing::CODE_INSET),
            spacing::PARAGRAPH_SPACE_BEFORE,
        );
        self.finish_paragraph(out, start, font, color, paragraph);
    }

    /// Display math. Screen output reserves a placeholder for the typeset
    /// image; print output has no replacement pass and gets the equation
    /// inline in a centered paragraph.
    pub(super) fn append_math(
        &self,
        out: &mut Output,
        ctx: &BlockContext,
        block: &Block,
        code: &str,
        frame: Frame,
    ) {
        let font = self
            .config
            .body_font()
            .with_size(self.config.body_font().size * spacing::DISPLAY_MATH_SIZE_RATIO);

        if !self.config.is_print() {
            let lines = code.trim().lines().count();
            let height = estimate_block_height(
                lines,
                self.metrics,
                &font,
                self.config.scaled(spacing::DISPLAY_MATH_PADDING),
            );
            self.append_attachment(out, ctx, block, height, frame);
            return;
        }

        let style = self.inline_style(font, self.text_color(frame));
        let run = self.converter().math_run(code.trim(), &style, MathStyle::Display);
        let start = out.buffer.len();
        run.append_to(&mut out.buffer);
        let paragraph = ParagraphStyle {
            alignment: Alignment::Center,
            ..self.paragraph_style(frame.indent, spacing::PARAGRAPH_SPACE_BEFORE)
        };
        self.finish_paragraph(out, start, font, style.base_color, paragraph);
    }

    /// Thematic breaks, images and diagrams, in both display modes.
    pub(super) fn append_placeholder(
        &self,
        out: &mut Output,
        ctx: &BlockContext,
        block: &Block,
        frame: Frame,
    ) {
        let height = match block {
            Block::ThematicBreak => spacing::THEMATIC_BREAK_HEIGHT,
            Block::DiagramBlock { .. } => spacing::DIAGRAM_PLACEHOLDER_HEIGHT,
            _ => spacing::IMAGE_PLACEHOLDER_HEIGHT,
        };
        self.append_attachment(out, ctx, block, self.config.scaled(height), frame);
    }

    /// Reserve an attachment and write its anchor line: one anchor character
    /// and a terminator, with the height held by the paragraph style.
    pub(super) fn append_attachment(
        &self,
        out: &mut Output,
        ctx: &BlockContext,
        block: &Block,
        height: f32,
        frame: Frame,
    ) {
        let font = self.config.body_font();
        let color = Rgba::opaque(self.text_color(frame));
        let start = out.buffer.len();
        let handle = out.attachments.reserve(ctx.index, block, height, start);
        out.buffer
            .push_attachment_anchor(handle, &TextStyle::new(font, color));

        let paragraph = ParagraphStyle {
            min_line_height: Some(height),
            ..self.paragraph_style(frame.indent, spacing::PARAGRAPH_SPACE_BEFORE)
        };
        self.finish_paragraph(out, start, font, color, paragraph);
    }
}
