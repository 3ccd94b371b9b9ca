//! Persisted viewer settings.

use folio_core::theme::CustomPalette;
use folio_core::{DisplayMode, Palette, ThemeMode};
use folio_markdown::{AssemblyConfig, TableRendering};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current settings schema version
pub const SETTINGS_VERSION: u32 = 1;

pub const FONT_SIZE_RANGE: (f32, f32) = (8.0, 48.0);
pub const SCALE_RANGE: (f32, f32) = (0.5, 4.0);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewerSettings {
    /// Settings schema version for migrations
    #[serde(default = "default_settings_version")]
    pub version: u32,

    #[serde(default)]
    pub theme_mode: ThemeMode,

    /// Base body font size in points
    #[serde(default = "default_font_size")]
    pub font_size: f32,

    /// Zoom factor applied on top of the font size
    #[serde(default = "default_scale")]
    pub scale: f32,

    #[serde(default)]
    pub display_mode: DisplayMode,

    #[serde(default)]
    pub table_rendering: TableRendering,

    /// Entries kept in the rendered diagram cache
    #[serde(default = "default_diagram_cache_capacity")]
    pub diagram_cache_capacity: usize,

    /// Entries kept in the rasterized image cache
    #[serde(default = "default_image_cache_capacity")]
    pub image_cache_capacity: usize,

    /// Palette used when `theme_mode` is `custom`
    #[serde(default)]
    pub custom_palette: Option<CustomPalette>,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            theme_mode: ThemeMode::default(),
            font_size: default_font_size(),
            scale: default_scale(),
            display_mode: DisplayMode::default(),
            table_rendering: TableRendering::default(),
            diagram_cache_capacity: default_diagram_cache_capacity(),
            image_cache_capacity: default_image_cache_capacity(),
            custom_palette: None,
        }
    }
}

fn default_settings_version() -> u32 {
    // Return 0 for settings files without version field (pre-versioning)
    0
}

fn default_font_size() -> f32 {
    14.0
}

fn default_scale() -> f32 {
    1.0
}

fn default_diagram_cache_capacity() -> usize {
    64
}

fn default_image_cache_capacity() -> usize {
    128
}

impl ViewerSettings {
    /// Resolve the palette for the current system appearance.
    pub fn palette(&self, system_is_dark: bool) -> Palette {
        let custom = self.custom_palette.as_ref().map(CustomPalette::to_palette);
        self.theme_mode.palette(system_is_dark, custom)
    }

    /// Stable theme identifier for render cache keys.
    pub fn theme_id(&self, system_is_dark: bool) -> &'static str {
        self.theme_mode.id(system_is_dark)
    }

    pub fn assembly_config(&self, system_is_dark: bool, container_width: f32) -> AssemblyConfig {
        AssemblyConfig::new(self.palette(system_is_dark))
            .display_mode(self.display_mode)
            .scale(self.scale)
            .base_font_size(self.font_size)
            .container_width(container_width)
            .table_rendering(self.table_rendering)
    }

    /// Clamp numeric fields into their supported ranges.
    fn sanitized(mut self) -> Self {
        self.font_size = clamp_or_default(self.font_size, FONT_SIZE_RANGE, default_font_size());
        self.scale = clamp_or_default(self.scale, SCALE_RANGE, default_scale());
        self.diagram_cache_capacity = self.diagram_cache_capacity.max(1);
        self.image_cache_capacity = self.image_cache_capacity.max(1);
        self
    }
}

fn clamp_or_default(value: f32, (min, max): (f32, f32), default: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        default
    }
}

/// Get the config directory path
pub fn get_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("folio")
}

/// Get the settings file path
pub fn get_settings_path() -> PathBuf {
    get_config_dir().join("settings.json")
}

/// Load settings from the default location.
pub fn load_settings() -> ViewerSettings {
    load_settings_from(&get_settings_path())
}

/// Load settings from `path`, recovering what it can from a damaged file.
///
/// Never fails: a missing or unreadable file gives defaults, and a file that
/// doesn't deserialize is recovered field by field.
pub fn load_settings_from(path: &Path) -> ViewerSettings {
    if !path.exists() {
        log::info!("Settings file not found at {}, using defaults", path.display());
        return ViewerSettings::default();
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            log::error!("Failed to read settings file {}: {}", path.display(), e);
            return ViewerSettings::default();
        }
    };

    // Fast path for valid settings
    match serde_json::from_str::<ViewerSettings>(&content) {
        Ok(settings) => return migrate_settings(settings.sanitized(), path),
        Err(e) => {
            log::warn!("Failed to parse settings directly: {}, attempting partial recovery", e);
        }
    }

    match recover_settings_from_json(&content) {
        Ok(settings) => {
            log::info!("Successfully recovered settings with partial data");
            let settings = migrate_settings(settings, path);
            // Save the recovered settings to fix the file
            if let Err(e) = save_settings_to(path, &settings) {
                log::warn!("Failed to save recovered settings: {}", e);
            }
            settings
        }
        Err(e) => {
            log::error!("Failed to recover settings from {}: {}", path.display(), e);
            log::error!("Using default settings. Your old settings file has been preserved.");
            ViewerSettings::default()
        }
    }
}

/// Extract the valid fields of a malformed settings file, defaulting the rest.
fn recover_settings_from_json(content: &str) -> Result<ViewerSettings> {
    use anyhow::Context;

    let value: serde_json::Value =
        serde_json::from_str(content).context("Settings file is not valid JSON")?;

    let obj = value
        .as_object()
        .context("Settings file root is not a JSON object")?;

    let mut settings = ViewerSettings::default();

    if let Some(v) = obj.get("version").and_then(|v| v.as_u64()) {
        settings.version = v as u32;
    }

    if let Some(v) = obj.get("theme_mode") {
        if let Ok(theme) = serde_json::from_value::<ThemeMode>(v.clone()) {
            settings.theme_mode = theme;
        } else {
            log::warn!("Could not parse theme_mode, using default");
        }
    }

    if let Some(v) = obj.get("font_size").and_then(|v| v.as_f64()) {
        settings.font_size = (v as f32).clamp(FONT_SIZE_RANGE.0, FONT_SIZE_RANGE.1);
    }

    if let Some(v) = obj.get("scale").and_then(|v| v.as_f64()) {
        settings.scale = (v as f32).clamp(SCALE_RANGE.0, SCALE_RANGE.1);
    }

    if let Some(v) = obj.get("display_mode") {
        if let Ok(mode) = serde_json::from_value::<DisplayMode>(v.clone()) {
            settings.display_mode = mode;
        } else {
            log::warn!("Could not parse display_mode, using default");
        }
    }

    if let Some(v) = obj.get("table_rendering") {
        if let Ok(rendering) = serde_json::from_value::<TableRendering>(v.clone()) {
            settings.table_rendering = rendering;
        } else {
            log::warn!("Could not parse table_rendering, using default");
        }
    }

    if let Some(v) = obj.get("diagram_cache_capacity").and_then(|v| v.as_u64()) {
        settings.diagram_cache_capacity = (v as usize).max(1);
    }

    if let Some(v) = obj.get("image_cache_capacity").and_then(|v| v.as_u64()) {
        settings.image_cache_capacity = (v as usize).max(1);
    }

    if let Some(v) = obj.get("custom_palette") {
        if let Ok(palette) = serde_json::from_value::<Option<CustomPalette>>(v.clone()) {
            settings.custom_palette = palette;
        } else {
            log::warn!("Could not parse custom_palette, ignoring it");
        }
    }

    Ok(settings)
}

/// Migrate settings from older versions to the current version
fn migrate_settings(mut settings: ViewerSettings, path: &Path) -> ViewerSettings {
    let original_version = settings.version;

    // Migration from version 0 (pre-versioning) to version 1
    if settings.version == 0 {
        log::info!("Migrating settings from pre-versioning (v0) to v1");
        settings.version = 1;
    }

    if settings.version < SETTINGS_VERSION {
        log::warn!(
            "Settings version {} is older than current version {}, some settings may use defaults",
            original_version,
            SETTINGS_VERSION
        );
        settings.version = SETTINGS_VERSION;
    }

    if original_version != settings.version {
        log::info!("Settings migrated from v{} to v{}", original_version, settings.version);
        if let Err(e) = save_settings_to(path, &settings) {
            log::warn!("Failed to save migrated settings: {}", e);
        }
    }

    settings
}

/// Save settings to the default location.
pub fn save_settings(settings: &ViewerSettings) -> Result<()> {
    save_settings_to(&get_settings_path(), settings)
}

pub fn save_settings_to(path: &Path, settings: &ViewerSettings) -> Result<()> {
    use anyhow::Context;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
