use serde::{Deserialize, Serialize};

use super::colors::{Palette, DARK_PALETTE, LIGHT_PALETTE};

/// Theme mode preference
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    Auto,
    /// Custom palette loaded from configuration
    Custom,
}

impl ThemeMode {
    /// Stable identifier, used in render cache keys.
    pub fn id(&self, system_is_dark: bool) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::Auto => {
                if system_is_dark {
                    "dark"
                } else {
                    "light"
                }
            }
            ThemeMode::Custom => "custom",
        }
    }

    /// Resolve to a palette. `Custom` falls back to the dark palette when no
    /// custom palette is supplied.
    pub fn palette(&self, system_is_dark: bool, custom: Option<Palette>) -> Palette {
        match self {
            ThemeMode::Dark => DARK_PALETTE,
            ThemeMode::Light => LIGHT_PALETTE,
            ThemeMode::Custom => custom.unwrap_or(DARK_PALETTE),
            ThemeMode::Auto => {
                if system_is_dark {
                    DARK_PALETTE
                } else {
                    LIGHT_PALETTE
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_follows_system_appearance() {
        assert_eq!(ThemeMode::Auto.palette(true, None), DARK_PALETTE);
        assert_eq!(ThemeMode::Auto.palette(false, None), LIGHT_PALETTE);
        assert_eq!(ThemeMode::Auto.id(false), "light");
    }

    #[test]
    fn custom_without_palette_falls_back_to_dark() {
        assert_eq!(ThemeMode::Custom.palette(false, None), DARK_PALETTE);
        let mut custom = LIGHT_PALETTE;
        custom.link = 0x123456;
        assert_eq!(ThemeMode::Custom.palette(true, Some(custom)).link, 0x123456);
    }
}
