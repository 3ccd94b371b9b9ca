//! Assembly configuration and layout constants.

use folio_core::theme::DARK_PALETTE;
use folio_core::{DisplayMode, Palette, Rgba};
use serde::{Deserialize, Serialize};

use crate::fonts::FontSpec;
use crate::inline::InlineStyle;

/// Unscaled layout constants, in points.
pub mod spacing {
    /// Space before headings, by level (h1..h6).
    pub const HEADING_SPACE_BEFORE: [f32; 6] = [24.0, 20.0, 16.0, 12.0, 12.0, 12.0];
    /// Heading font size relative to the base size, by level (h1..h6).
    pub const HEADING_SIZE_RATIO: [f32; 6] = [2.0, 1.6, 1.3, 1.15, 1.0, 0.9];
    pub const PARAGRAPH_SPACE_BEFORE: f32 = 8.0;
    pub const LIST_ITEM_SPACE_BEFORE: f32 = 2.0;

    pub const LIST_BASE_INDENT: f32 = 4.0;
    pub const LIST_PREFIX_WIDTH: f32 = 20.0;
    pub const LIST_PREFIX_PADDING: f32 = 6.0;
    pub const BLOCKQUOTE_INDENT: f32 = 16.0;
    /// Inset of code text from the code container edge.
    pub const CODE_INSET: f32 = 12.0;
    pub const CODE_LABEL_SIZE_RATIO: f32 = 0.8;

    pub const THEMATIC_BREAK_HEIGHT: f32 = 24.0;
    pub const IMAGE_PLACEHOLDER_HEIGHT: f32 = 200.0;
    pub const DIAGRAM_PLACEHOLDER_HEIGHT: f32 = 240.0;
    pub const DISPLAY_MATH_PADDING: f32 = 8.0;
    pub const DISPLAY_MATH_SIZE_RATIO: f32 = 1.2;
}

/// How tables are put on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableRendering {
    /// Invisible tab-delimited text with a grid painted over it.
    #[default]
    Overlay,
    /// A placeholder filled with a rendered image of the table.
    Image,
}

/// Default cap on list/blockquote nesting before content is flattened.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 32;

#[derive(Clone, Debug, PartialEq)]
pub struct AssemblyConfig {
    pub palette: Palette,
    pub display_mode: DisplayMode,
    /// Multiplies every font size and spacing constant.
    pub scale: f32,
    pub base_font_size: f32,
    /// Width available to content, used for table geometry.
    pub container_width: f32,
    pub table_rendering: TableRendering,
    pub max_nesting_depth: usize,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self::new(DARK_PALETTE)
    }
}

impl AssemblyConfig {
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            display_mode: DisplayMode::Screen,
            scale: 1.0,
            base_font_size: 14.0,
            container_width: 800.0,
            table_rendering: TableRendering::Overlay,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }

    pub fn display_mode(mut self, mode: DisplayMode) -> Self {
        self.display_mode = mode;
        self
    }

    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = scale.max(0.1);
        self
    }

    pub fn base_font_size(mut self, size: f32) -> Self {
        self.base_font_size = size.max(1.0);
        self
    }

    pub fn container_width(mut self, width: f32) -> Self {
        self.container_width = width.max(1.0);
        self
    }

    pub fn table_rendering(mut self, rendering: TableRendering) -> Self {
        self.table_rendering = rendering;
        self
    }

    pub fn max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    pub fn is_print(&self) -> bool {
        self.display_mode.is_print()
    }

    /// Apply the scale factor to a layout constant.
    pub fn scaled(&self, value: f32) -> f32 {
        value * self.scale
    }

    pub fn body_font(&self) -> FontSpec {
        FontSpec::proportional(self.scaled(self.base_font_size))
    }

    pub fn code_font(&self) -> FontSpec {
        FontSpec::monospace(self.scaled(self.base_font_size) * crate::inline::CODE_SIZE_RATIO)
    }

    pub fn heading_font(&self, level: u8) -> FontSpec {
        let ratio = spacing::HEADING_SIZE_RATIO[heading_index(level)];
        FontSpec::proportional(self.scaled(self.base_font_size) * ratio).bold()
    }

    pub fn heading_space_before(&self, level: u8) -> f32 {
        self.scaled(spacing::HEADING_SPACE_BEFORE[heading_index(level)])
    }

    /// Inline style for body text in `color`.
    pub fn inline_style(&self, font: FontSpec, color: u32) -> InlineStyle {
        InlineStyle {
            base_font: font,
            base_color: Rgba::opaque(color),
            link_color: Rgba::opaque(self.palette.link),
            code_background: Some(Rgba::opaque(self.palette.code_background)),
        }
    }
}

fn heading_index(level: u8) -> usize {
    (level.clamp(1, 6) - 1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_levels_are_clamped() {
        let config = AssemblyConfig::default();
        assert_eq!(config.heading_font(0), config.heading_font(1));
        assert_eq!(config.heading_font(9), config.heading_font(6));
        assert!(config.heading_font(1).size > config.heading_font(2).size);
        assert!(config.heading_space_before(1) > config.heading_space_before(3));
    }

    #[test]
    fn scale_multiplies_sizes_and_spacing() {
        let config = AssemblyConfig::default().scale(2.0);
        assert_eq!(config.body_font().size, 28.0);
        assert_eq!(config.heading_space_before(1), 48.0);
    }

    #[test]
    fn table_rendering_serde_names() {
        assert_eq!(serde_json::to_string(&TableRendering::Overlay).unwrap(), "\"overlay\"");
        let parsed: TableRendering = serde_json::from_str("\"image\"").unwrap();
        assert_eq!(parsed, TableRendering::Image);
    }
}
