use serde::{Deserialize, Serialize};

/// A resolved color with alpha, packed as `0xRRGGBBAA`.
///
/// Kept as a plain `Copy` value so attribute channels can store it directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba(pub u32);

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba(0);

    /// Opaque color from a `0xRRGGBB` palette entry.
    pub const fn opaque(hex: u32) -> Self {
        Rgba((hex << 8) | 0xFF)
    }

    /// Same color with the alpha channel replaced (`alpha` in 0.0..=1.0).
    pub fn with_alpha(self, alpha: f32) -> Self {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u32;
        Rgba((self.0 & 0xFFFF_FF00) | a)
    }

    pub fn alpha(self) -> f32 {
        (self.0 & 0xFF) as f32 / 255.0
    }

    pub fn is_transparent(self) -> bool {
        self.0 & 0xFF == 0
    }

    /// The `0xRRGGBB` part.
    pub fn rgb(self) -> u32 {
        self.0 >> 8
    }
}

/// Colors used by the document assembler, as `0xRRGGBB`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    // Surface
    pub background: u32,
    pub border: u32,

    // Text colors
    pub foreground: u32,
    pub heading: u32,
    pub muted: u32,
    pub link: u32,
    pub quote: u32,

    // Code and raw markup
    pub code_background: u32,
    pub code_foreground: u32,
    pub html_background: u32,

    // Tables
    pub table_header_background: u32,
}

/// Dark palette (VSCode-like)
pub const DARK_PALETTE: Palette = Palette {
    background: 0x1e1e1e,
    border: 0x3c3c3c,
    foreground: 0xcccccc,
    heading: 0xe8e8e8,
    muted: 0x808080,
    link: 0x3b8eea,
    quote: 0xa0a0a0,
    code_background: 0x252526,
    code_foreground: 0xd4d4d4,
    html_background: 0x2a2d2e,
    table_header_background: 0x323233,
};

/// Light palette (VSCode Light-like)
pub const LIGHT_PALETTE: Palette = Palette {
    background: 0xffffff,
    border: 0xe5e5e5,
    foreground: 0x333333,
    heading: 0x1f1f1f,
    muted: 0x6e6e6e,
    link: 0x0451a5,
    quote: 0x6a737d,
    code_background: 0xf3f3f3,
    code_foreground: 0x333333,
    html_background: 0xe8e8e8,
    table_header_background: 0xe8e8e8,
};

impl Palette {
    /// Check if this is a dark palette
    pub fn is_dark(&self) -> bool {
        let (r, g, b) = Self::hex_to_rgb(self.background);
        // Relative luminance approximation
        let luminance = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
        luminance < 128.0
    }

    /// Get RGB tuple from a hex color
    pub fn hex_to_rgb(hex: u32) -> (u8, u8, u8) {
        (
            ((hex >> 16) & 0xFF) as u8,
            ((hex >> 8) & 0xFF) as u8,
            (hex & 0xFF) as u8,
        )
    }
}
