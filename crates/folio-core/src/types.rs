use serde::{Deserialize, Serialize};

/// Where the assembled document is going to end up.
///
/// Screen output keeps table text invisible (an overlay paints the grid) and
/// reserves placeholders for content that is filled in asynchronously. Print
/// output has no replacement pass, so everything that can be text is text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    #[default]
    Screen,
    Print,
}

impl DisplayMode {
    pub fn is_print(&self) -> bool {
        matches!(self, DisplayMode::Print)
    }
}

/// Horizontal alignment of a table column or paragraph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mode_serde_round_trip() {
        for mode in [DisplayMode::Screen, DisplayMode::Print] {
            let json = serde_json::to_string(&mode).unwrap();
            let parsed: DisplayMode = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, mode);
        }
        assert_eq!(serde_json::to_string(&DisplayMode::Print).unwrap(), "\"print\"");
    }

    #[test]
    fn alignment_defaults_to_left() {
        assert_eq!(Alignment::default(), Alignment::Left);
        let parsed: Alignment = serde_json::from_str("\"center\"").unwrap();
        assert_eq!(parsed, Alignment::Center);
    }
}
