//! Table geometry estimates.
//!
//! Column widths and row heights are estimates made before layout, from
//! intrinsic single-line text widths. The overlay painter and the placeholder
//! sizing for tables rendered as images both consume them.

use crate::fonts::{FontMetrics, FontSpec};

/// Horizontal cell padding, applied once per side.
pub const CELL_PADDING_H: f32 = 12.0;
/// Vertical cell padding, applied once per side.
pub const CELL_PADDING_V: f32 = 6.0;
/// No column may take more than this share of the container.
pub const MAX_COLUMN_FRACTION: f32 = 0.6;
/// Wrapped text needs a little more room than `width / available` suggests
/// because lines break at word boundaries.
pub const WRAP_OVERHEAD: f32 = 1.1;

/// Result of [`compute_column_widths`].
#[derive(Clone, Debug, PartialEq)]
pub struct TableGeometry {
    pub column_widths: Vec<f32>,
    /// Sum of the column widths, clamped to the container width.
    pub total_width: f32,
    /// The columns do not fit the container and need horizontal scrolling.
    pub needs_scroll: bool,
}

/// Smallest width a column can have: room for its padding.
pub fn min_column_width() -> f32 {
    CELL_PADDING_H * 2.0
}

/// Compute per-column widths from header and cell text.
///
/// Headers are measured in the bold variant of `font`. Rows shorter than the
/// header count contribute nothing to the missing columns; extra cells are
/// ignored.
pub fn compute_column_widths(
    headers: &[String],
    rows: &[Vec<String>],
    container_width: f32,
    metrics: &dyn FontMetrics,
    font: &FontSpec,
) -> TableGeometry {
    let header_font = font.bold();
    let cap = container_width * MAX_COLUMN_FRACTION;

    let column_widths: Vec<f32> = headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            let intrinsic = rows
                .iter()
                .filter_map(|row| row.get(col))
                .map(|cell| metrics.text_width(cell, font))
                .fold(metrics.text_width(header, &header_font), f32::max);
            (intrinsic + CELL_PADDING_H * 2.0)
                .min(cap)
                .max(min_column_width())
        })
        .collect();

    let sum: f32 = column_widths.iter().sum();
    TableGeometry {
        needs_scroll: sum > container_width,
        total_width: sum.min(container_width),
        column_widths,
    }
}

/// Estimate the height of one table row given the column widths.
///
/// A cell wider than its column's text area is assumed to wrap into
/// `ceil(width / available * WRAP_OVERHEAD)` lines.
pub fn estimate_row_height(
    cells: &[String],
    column_widths: &[f32],
    metrics: &dyn FontMetrics,
    font: &FontSpec,
) -> f32 {
    let max_lines = cells
        .iter()
        .zip(column_widths)
        .map(|(cell, &width)| {
            let intrinsic = metrics.text_width(cell, font);
            let available = (width - CELL_PADDING_H * 2.0).max(1.0);
            if intrinsic > available {
                (intrinsic / available * WRAP_OVERHEAD).ceil() as usize
            } else {
                1
            }
        })
        .max()
        .unwrap_or(1)
        .max(1);

    max_lines as f32 * metrics.line_height(font) + CELL_PADDING_V * 2.0
}

/// Height of a block of `line_count` lines plus vertical padding, used to
/// size placeholders for content rendered elsewhere.
pub fn estimate_block_height(
    line_count: usize,
    metrics: &dyn FontMetrics,
    font: &FontSpec,
    padding: f32,
) -> f32 {
    line_count.max(1) as f32 * metrics.line_height(font) + padding * 2.0
}
