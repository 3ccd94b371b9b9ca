//! Custom palette configuration support
//!
//! Palettes are written by hand as `#rrggbb` strings; missing fields fall back
//! to the dark palette.

use serde::{Deserialize, Serialize};

use super::colors::{Palette, DARK_PALETTE};

/// Serializable palette with hex string format
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPalette {
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default = "default_border")]
    pub border: String,
    #[serde(default = "default_foreground")]
    pub foreground: String,
    #[serde(default = "default_heading")]
    pub heading: String,
    #[serde(default = "default_muted")]
    pub muted: String,
    #[serde(default = "default_link")]
    pub link: String,
    #[serde(default = "default_quote")]
    pub quote: String,
    #[serde(default = "default_code_background")]
    pub code_background: String,
    #[serde(default = "default_code_foreground")]
    pub code_foreground: String,
    #[serde(default = "default_html_background")]
    pub html_background: String,
    #[serde(default = "default_table_header_background")]
    pub table_header_background: String,
}

fn hex(value: u32) -> String {
    format!("#{:06x}", value)
}

// Default color functions for serde (based on dark palette)
fn default_background() -> String { hex(DARK_PALETTE.background) }
fn default_border() -> String { hex(DARK_PALETTE.border) }
fn default_foreground() -> String { hex(DARK_PALETTE.foreground) }
fn default_heading() -> String { hex(DARK_PALETTE.heading) }
fn default_muted() -> String { hex(DARK_PALETTE.muted) }
fn default_link() -> String { hex(DARK_PALETTE.link) }
fn default_quote() -> String { hex(DARK_PALETTE.quote) }
fn default_code_background() -> String { hex(DARK_PALETTE.code_background) }
fn default_code_foreground() -> String { hex(DARK_PALETTE.code_foreground) }
fn default_html_background() -> String { hex(DARK_PALETTE.html_background) }
fn default_table_header_background() -> String { hex(DARK_PALETTE.table_header_background) }

impl Default for CustomPalette {
    fn default() -> Self {
        Self::from_palette(&DARK_PALETTE)
    }
}

impl CustomPalette {
    /// Parse a hex color string (e.g., "#1e1e1e" or "1e1e1e") to u32.
    /// Unparseable values become black.
    fn parse_hex(s: &str) -> u32 {
        let s = s.trim().trim_start_matches('#');
        match u32::from_str_radix(s, 16) {
            Ok(v) if s.len() == 6 => v,
            _ => {
                log::warn!("Invalid palette color {:?}, using black", s);
                0
            }
        }
    }

    pub fn from_palette(palette: &Palette) -> Self {
        Self {
            background: hex(palette.background),
            border: hex(palette.border),
            foreground: hex(palette.foreground),
            heading: hex(palette.heading),
            muted: hex(palette.muted),
            link: hex(palette.link),
            quote: hex(palette.quote),
            code_background: hex(palette.code_background),
            code_foreground: hex(palette.code_foreground),
            html_background: hex(palette.html_background),
            table_header_background: hex(palette.table_header_background),
        }
    }

    /// Convert to a resolved palette
    pub fn to_palette(&self) -> Palette {
        Palette {
            background: Self::parse_hex(&self.background),
            border: Self::parse_hex(&self.border),
            foreground: Self::parse_hex(&self.foreground),
            heading: Self::parse_hex(&self.heading),
            muted: Self::parse_hex(&self.muted),
            link: Self::parse_hex(&self.link),
            quote: Self::parse_hex(&self.quote),
            code_background: Self::parse_hex(&self.code_background),
            code_foreground: Self::parse_hex(&self.code_foreground),
            html_background: Self::parse_hex(&self.html_background),
            table_header_background: Self::parse_hex(&self.table_header_background),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::LIGHT_PALETTE;

    #[test]
    fn missing_fields_use_dark_defaults() {
        let custom: CustomPalette = serde_json::from_str(r##"{"link": "#ff0000"}"##).unwrap();
        let palette = custom.to_palette();
        assert_eq!(palette.link, 0xff0000);
        assert_eq!(palette.background, DARK_PALETTE.background);
        assert_eq!(palette.code_foreground, DARK_PALETTE.code_foreground);
    }

    #[test]
    fn round_trips_through_hex_strings() {
        let custom = CustomPalette::from_palette(&LIGHT_PALETTE);
        assert_eq!(custom.background, "#ffffff");
        assert_eq!(custom.to_palette(), LIGHT_PALETTE);
    }

    #[test]
    fn invalid_hex_becomes_black() {
        let custom = CustomPalette {
            foreground: "not a color".into(),
            heading: "#abc".into(),
            ..CustomPalette::default()
        };
        let palette = custom.to_palette();
        assert_eq!(palette.foreground, 0);
        assert_eq!(palette.heading, 0);
    }
}
