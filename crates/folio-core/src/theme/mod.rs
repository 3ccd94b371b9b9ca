mod colors;
mod custom;
mod types;

pub use colors::{Palette, Rgba, DARK_PALETTE, LIGHT_PALETTE};
pub use custom::CustomPalette;
pub use types::ThemeMode;
