//! Clipboard exports of a cell selection.
//!
//! Every exporter emits whole rows: a row with at least one selected cell is
//! written with all of its columns, unselected cells left empty, and rows
//! without a selected cell are skipped.

use folio_core::Alignment;
use std::collections::BTreeSet;
use std::fmt::Write;

use super::cell_map::{CellPosition, TableCellMap};

/// RTF measures lengths in twentieths of a point.
const TWIPS_PER_POINT: f32 = 20.0;

impl TableCellMap {
    /// Rows that contain at least one selected cell, in text order.
    fn selected_rows(&self, selection: &BTreeSet<CellPosition>) -> Vec<i32> {
        self.rows()
            .filter(|row| selection.iter().any(|p| p.row == *row))
            .collect()
    }

    fn selected_content(&self, selection: &BTreeSet<CellPosition>, row: i32, column: usize) -> &str {
        let position = CellPosition::new(row, column);
        if selection.contains(&position) {
            self.content(position).unwrap_or("")
        } else {
            ""
        }
    }

    /// Tab-separated rows joined by newlines. Empty selection gives "".
    pub fn tab_delimited_text(&self, selection: &BTreeSet<CellPosition>) -> String {
        self.selected_rows(selection)
            .into_iter()
            .map(|row| {
                (0..self.column_count)
                    .map(|col| self.selected_content(selection, row, col))
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// An RTF table. Column boundaries come from `column_widths`; the header
    /// row is bold.
    pub fn rtf(&self, selection: &BTreeSet<CellPosition>) -> String {
        let rows = self.selected_rows(selection);
        if rows.is_empty() {
            return String::new();
        }

        let mut out = String::from("{\\rtf1\\ansi\\deff0\n");
        for row in rows {
            out.push_str("\\trowd\\trgaph108");
            let mut boundary = 0.0f32;
            for col in 0..self.column_count {
                boundary += self.column_widths.get(col).copied().unwrap_or(0.0);
                let _ = write!(out, "\\cellx{}", (boundary * TWIPS_PER_POINT).round() as i64);
            }
            out.push('\n');
            for col in 0..self.column_count {
                out.push_str("\\pard\\intbl");
                out.push_str(match self.alignments.get(col) {
                    Some(Alignment::Center) => "\\qc",
                    Some(Alignment::Right) => "\\qr",
                    _ => "\\ql",
                });
                out.push(' ');
                let content = rtf_escape(self.selected_content(selection, row, col));
                if row == super::HEADER_ROW {
                    let _ = write!(out, "{{\\b {}}}", content);
                } else {
                    out.push_str(&content);
                }
                out.push_str("\\cell\n");
            }
            out.push_str("\\row\n");
        }
        out.push('}');
        out
    }

    /// An HTML `<table>`; header cells use `<th>`.
    pub fn html(&self, selection: &BTreeSet<CellPosition>) -> String {
        let rows = self.selected_rows(selection);
        if rows.is_empty() {
            return String::new();
        }

        let mut out = String::from("<table>\n");
        for row in rows {
            out.push_str("<tr>");
            let tag = if row == super::HEADER_ROW { "th" } else { "td" };
            for col in 0..self.column_count {
                let align = match self.alignments.get(col) {
                    Some(Alignment::Center) => " style=\"text-align:center\"",
                    Some(Alignment::Right) => " style=\"text-align:right\"",
                    _ => "",
                };
                let _ = write!(
                    out,
                    "<{tag}{align}>{}</{tag}>",
                    html_escape(self.selected_content(selection, row, col))
                );
            }
            out.push_str("</tr>\n");
        }
        out.push_str("</table>");
        out
    }
}

fn rtf_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_ascii() => out.push(c),
            c => {
                // \uN takes a signed 16-bit value; astral characters become a
                // surrogate pair.
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(out, "\\u{}?", *unit as i16);
                }
            }
        }
    }
    out
}

fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}
