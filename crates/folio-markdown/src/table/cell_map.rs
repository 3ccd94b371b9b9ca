//! Offset -> cell index over a table's tab/newline-delimited shadow text.

use folio_core::{inline_plain_text, Alignment, InlineText, TableColumn};
use std::collections::BTreeSet;
use std::ops::Range;

use crate::fonts::{FontMetrics, FontSpec};
use crate::geometry::{compute_column_widths, estimate_row_height};

/// Row number of the header row.
pub const HEADER_ROW: i32 = -1;

/// Cell coordinates. `row` is [`HEADER_ROW`] for the header, `0..` for data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellPosition {
    pub row: i32,
    pub column: usize,
}

impl CellPosition {
    pub fn new(row: i32, column: usize) -> Self {
        Self { row, column }
    }

    pub fn is_header(&self) -> bool {
        self.row == HEADER_ROW
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CellEntry {
    pub position: CellPosition,
    /// Range relative to the start of the table's text.
    pub range: Range<usize>,
    pub content: String,
}

/// Index of one table's cells.
///
/// `cells` is in text order (header first, then rows, left to right), which
/// is also ascending `range.start` order. Ranges are disjoint; separators
/// between them belong to no cell.
#[derive(Clone, Debug, PartialEq)]
pub struct TableCellMap {
    pub cells: Vec<CellEntry>,
    pub column_count: usize,
    /// Number of data rows (the header is not counted).
    pub row_count: usize,
    pub column_widths: Vec<f32>,
    /// Width of the painted grid, clamped to the container.
    pub total_width: f32,
    /// The columns are wider than the container and the grid scrolls
    /// horizontally.
    pub needs_scroll: bool,
    /// Estimated heights, header first: `row_count + 1` entries.
    pub row_heights: Vec<f32>,
    pub alignments: Vec<Alignment>,
    /// Length of the shadow text in characters.
    pub text_len: usize,
}

/// Plain cell text with separators replaced so the index stays unambiguous.
fn cell_text(inlines: &InlineText) -> String {
    inline_plain_text(inlines)
        .chars()
        .map(|c| match c {
            '\t' | '\n' | '\r' | '\u{2028}' => ' ',
            c => c,
        })
        .collect()
}

impl TableCellMap {
    /// Build the shadow text and its index.
    ///
    /// Cells are joined with tabs and rows with newlines; the text has no
    /// trailing newline. Rows shorter than the header are padded with empty
    /// cells and longer rows are truncated.
    pub fn build(
        columns: &[TableColumn],
        rows: &[Vec<InlineText>],
        metrics: &dyn FontMetrics,
        font: &FontSpec,
        container_width: f32,
    ) -> (String, TableCellMap) {
        let column_count = columns.len();
        let headers: Vec<String> = columns.iter().map(|c| cell_text(&c.header)).collect();
        let body: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                (0..column_count)
                    .map(|col| row.get(col).map(cell_text).unwrap_or_default())
                    .collect()
            })
            .collect();

        let geometry = compute_column_widths(&headers, &body, container_width, metrics, font);
        let mut row_heights = Vec::with_capacity(body.len() + 1);
        row_heights.push(estimate_row_height(
            &headers,
            &geometry.column_widths,
            metrics,
            &font.bold(),
        ));
        for row in &body {
            row_heights.push(estimate_row_height(row, &geometry.column_widths, metrics, font));
        }

        let mut text = String::new();
        let mut offset = 0usize;
        let mut cells = Vec::with_capacity(column_count * (body.len() + 1));

        let all_rows = std::iter::once((HEADER_ROW, &headers))
            .chain(body.iter().enumerate().map(|(i, row)| (i as i32, row)));
        for (row_idx, row) in all_rows {
            if row_idx != HEADER_ROW {
                text.push('\n');
                offset += 1;
            }
            for (col, content) in row.iter().enumerate() {
                if col > 0 {
                    text.push('\t');
                    offset += 1;
                }
                let len = content.chars().count();
                cells.push(CellEntry {
                    position: CellPosition::new(row_idx, col),
                    range: offset..offset + len,
                    content: content.clone(),
                });
                text.push_str(content);
                offset += len;
            }
        }

        let map = TableCellMap {
            cells,
            column_count,
            row_count: body.len(),
            column_widths: geometry.column_widths,
            total_width: geometry.total_width,
            needs_scroll: geometry.needs_scroll,
            row_heights,
            alignments: columns.iter().map(|c| c.alignment).collect(),
            text_len: offset,
        };
        (text, map)
    }

    /// The cell containing `offset`, or `None` when the offset falls on a
    /// separator or outside the table.
    pub fn cell_at(&self, offset: usize) -> Option<CellPosition> {
        let idx = self.cells.partition_point(|c| c.range.start <= offset);
        let cell = self.cells.get(idx.checked_sub(1)?)?;
        (offset < cell.range.end).then_some(cell.position)
    }

    /// Every cell with at least one character inside `range`.
    ///
    /// Empty cells hold no characters and never intersect a range.
    pub fn cells_in_range(&self, range: Range<usize>) -> BTreeSet<CellPosition> {
        if range.start >= range.end || range.start >= self.text_len {
            return BTreeSet::new();
        }
        let first = self.cells.partition_point(|c| c.range.end <= range.start);
        self.cells[first..]
            .iter()
            .take_while(|c| c.range.start < range.end)
            .filter(|c| !c.range.is_empty())
            .map(|c| c.position)
            .collect()
    }

    /// Text range of the cell at `position`.
    pub fn range_for(&self, position: CellPosition) -> Option<Range<usize>> {
        self.cells
            .iter()
            .find(|c| c.position == position)
            .map(|c| c.range.clone())
    }

    pub fn content(&self, position: CellPosition) -> Option<&str> {
        if position.column >= self.column_count {
            return None;
        }
        let row_slot = usize::try_from(position.row + 1).ok()?;
        let idx = row_slot * self.column_count + position.column;
        match self.cells.get(idx) {
            Some(cell) if cell.position == position => Some(&cell.content),
            _ => self
                .cells
                .iter()
                .find(|c| c.position == position)
                .map(|c| c.content.as_str()),
        }
    }

    /// Row numbers in text order: the header, then every data row.
    pub fn rows(&self) -> impl Iterator<Item = i32> + use<> {
        HEADER_ROW..self.row_count as i32
    }

    /// Every cell position in the table.
    pub fn all_positions(&self) -> BTreeSet<CellPosition> {
        self.cells.iter().map(|c| c.position).collect()
    }

    /// Text span of each row: from its first cell to the separator that ends
    /// it (the last row ends at `text_len`).
    pub fn row_spans(&self) -> Vec<(i32, Range<usize>)> {
        if self.column_count == 0 {
            return Vec::new();
        }
        let starts: Vec<(i32, usize)> = self
            .cells
            .chunks(self.column_count)
            .map(|row| (row[0].position.row, row[0].range.start))
            .collect();
        starts
            .iter()
            .enumerate()
            .map(|(i, &(row, start))| {
                let end = starts.get(i + 1).map(|&(_, s)| s).unwrap_or(self.text_len);
                (row, start..end)
            })
            .collect()
    }

    /// Sum of the estimated row heights.
    pub fn total_height(&self) -> f32 {
        self.row_heights.iter().sum()
    }
}
