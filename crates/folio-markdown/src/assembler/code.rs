//! Fenced code blocks.
//!
//! The language label and every body line share one paragraph, separated by
//! line separators, so a code block contributes a single terminator. One tag
//! covers the whole block so the painter can union its line fragments into a
//! single container.

use folio_core::Rgba;

use super::{BlockContext, DocumentAssembler, Frame, Output};
use crate::buffer::{TextStyle, LINE_SEPARATOR};
use crate::config::spacing;
use crate::fonts::FontSpec;

const TAB_WIDTH: usize = 4;

/// Code text as it is written to the buffer: tabs expanded, carriage returns
/// dropped, newlines turned into line separators.
fn buffer_text(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    for c in code.chars() {
        match c {
            '\t' => out.extend(std::iter::repeat_n(' ', TAB_WIDTH)),
            '\r' => {}
            '\n' => out.push(LINE_SEPARATOR),
            c => out.push(c),
        }
    }
    out
}

/// Drop blank lines around the body, keeping leading indentation of the
/// first real line.
fn trim_body(code: &str) -> &str {
    let code = code.trim_end();
    let leading = code
        .char_indices()
        .take_while(|(_, c)| c.is_whitespace())
        .filter(|(_, c)| *c == '\n')
        .last()
        .map(|(i, _)| i + 1)
        .unwrap_or(0);
    &code[leading..]
}

impl DocumentAssembler<'_> {
    pub(super) fn append_code(
        &self,
        out: &mut Output,
        ctx: &mut BlockContext,
        language: Option<&str>,
        code: &str,
        frame: Frame,
    ) {
        let palette = &self.config.palette;
        let font = self.config.code_font();
        let foreground = Rgba::opaque(palette.code_foreground);
        let base = TextStyle::new(font, foreground);
        let start = out.buffer.len();

        let language = language.map(str::trim).filter(|l| !l.is_empty());
        if let Some(language) = language {
            let label_font = font.with_size(font.size * spacing::CODE_LABEL_SIZE_RATIO);
            let label = TextStyle::new(label_font, Rgba::opaque(palette.muted));
            out.buffer.push_str(language, &label);
            out.buffer.push_char(LINE_SEPARATOR, &base);
        }

        let body = trim_body(code);
        let highlighted = language
            .zip(self.highlighter)
            .and_then(|(language, highlighter)| highlighter.highlight(body, language));
        match highlighted {
            Some(spans) => {
                for span in spans {
                    let style = TextStyle::new(
                        FontSpec {
                            bold: span.bold,
                            italic: span.italic,
                            ..font
                        },
                        span.color,
                    );
                    out.buffer.push_str(&buffer_text(&span.text), &style);
                }
            }
            None => {
                out.buffer.push_str(&buffer_text(body), &base);
            }
        }
        // An empty block still gets a line so its container has a height
        if out.buffer.len() == start {
            out.buffer.push_char(' ', &base);
        }

        let paragraph = self.paragraph_style(
            frame.indent + self.config.scaled(spacing::CODE_INSET),
            spacing::PARAGRAPH_SPACE_BEFORE,
        );
        if let Some(range) = self.finish_paragraph(out, start, font, foreground, paragraph) {
            let tag = ctx.next_tag();
            out.buffer.set_block_tag(range, tag);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_is_trimmed_but_keeps_indentation() {
        assert_eq!(trim_body("\n\n    indented\nnext\n\n"), "    indented\nnext");
        assert_eq!(trim_body("x"), "x");
        assert_eq!(trim_body("\n \n"), "");
    }

    #[test]
    fn buffer_text_expands_tabs_and_separates_lines() {
        assert_eq!(buffer_text("a\tb\r\nc"), "a    b\u{2028}c");
    }
}
