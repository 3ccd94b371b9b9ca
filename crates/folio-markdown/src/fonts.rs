//! Font descriptions and the metrics seam used for geometry estimates.

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFace {
    #[default]
    Proportional,
    Monospace,
}

/// A resolved font: face plus size and traits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontSpec {
    pub face: FontFace,
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
}

impl FontSpec {
    pub fn proportional(size: f32) -> Self {
        Self {
            face: FontFace::Proportional,
            size,
            bold: false,
            italic: false,
        }
    }

    pub fn monospace(size: f32) -> Self {
        Self {
            face: FontFace::Monospace,
            size,
            bold: false,
            italic: false,
        }
    }

    pub fn bold(self) -> Self {
        Self { bold: true, ..self }
    }

    pub fn italic(self) -> Self {
        Self { italic: true, ..self }
    }

    pub fn with_size(self, size: f32) -> Self {
        Self { size, ..self }
    }

    pub fn is_monospace(&self) -> bool {
        self.face == FontFace::Monospace
    }
}

/// Measures text for layout estimates.
///
/// Implemented by the platform font system in the viewer; [`MonospaceMetrics`]
/// is a self-contained approximation.
pub trait FontMetrics {
    /// Width of `text` laid out on a single line.
    fn text_width(&self, text: &str, font: &FontSpec) -> f32;

    /// Distance between consecutive baselines.
    fn line_height(&self, font: &FontSpec) -> f32;
}

/// Approximate metrics: every display cell advances by a fixed fraction of
/// the font size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonospaceMetrics {
    pub advance_ratio: f32,
    pub line_height_ratio: f32,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self {
            advance_ratio: 0.6,
            line_height_ratio: 1.3,
        }
    }
}

impl FontMetrics for MonospaceMetrics {
    fn text_width(&self, text: &str, font: &FontSpec) -> f32 {
        let cells = text
            .lines()
            .map(UnicodeWidthStr::width)
            .max()
            .unwrap_or(0);
        let weight = if font.bold { 1.05 } else { 1.0 };
        cells as f32 * font.size * self.advance_ratio * weight
    }

    fn line_height(&self, font: &FontSpec) -> f32 {
        font.size * self.line_height_ratio
    }
}
