//! Designer configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! overridden by a user config file in the session directory.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [canvas]
//! width = 300               # Card canvas, in pixels
//! height = 420
//! header_height = 60        # Colored name band
//! corner_radius = 30
//!
//! [illustration]
//! aspect_ratio = [3, 4]     # width:height of the crop and of the slot bitmap
//! short_edge = 240          # Slot bitmap short edge → 240x320
//! zoom_max = 3.0            # Crop zoom range is [1.0, zoom_max]
//! viewport = [260, 340]     # Crop overlay size the source is fitted into
//! filter = "lanczos3"       # nearest | triangle | catmull_rom | lanczos3
//!
//! [colors]
//! neutral = "#95a5a6"       # Used for unknown or missing card colors
//!
//! [colors.palette]
//! Red = "#e74c3c"
//! Blue = "#3498db"
//! Green = "#2ecc71"
//! Yellow = "#f1c40f"
//! Purple = "#9b59b6"
//!
//! [export]
//! fallback_name = "card"    # File stem when the card has no name
//! compression = "default"   # PNG effort: fast | default | best
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse: override just the values you want. Palette
//! entries merge with the stock palette, so adding a color keeps the others:
//!
//! ```toml
//! [colors.palette]
//! Orange = "#e67e22"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::card::CardColor;
use crate::imaging::{Compression, Filter, calculate_slot_dimensions};
use image::Rgba;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Designer configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DesignerConfig {
    /// Card canvas geometry.
    pub canvas: CanvasConfig,
    /// Crop and illustration slot settings.
    pub illustration: IllustrationConfig,
    /// Card color palette.
    pub colors: ColorConfig,
    /// Export naming and encoding.
    pub export: ExportConfig,
}

impl DesignerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let canvas = &self.canvas;
        if canvas.width == 0 || canvas.height == 0 {
            return Err(ConfigError::Validation(
                "canvas.width and canvas.height must be non-zero".into(),
            ));
        }
        if canvas.header_height >= canvas.height {
            return Err(ConfigError::Validation(
                "canvas.header_height must be smaller than canvas.height".into(),
            ));
        }

        let ill = &self.illustration;
        if ill.aspect_ratio[0] == 0 || ill.aspect_ratio[1] == 0 {
            return Err(ConfigError::Validation(
                "illustration.aspect_ratio values must be non-zero".into(),
            ));
        }
        if ill.short_edge == 0 {
            return Err(ConfigError::Validation(
                "illustration.short_edge must be non-zero".into(),
            ));
        }
        if !ill.zoom_max.is_finite() || ill.zoom_max < 1.0 {
            return Err(ConfigError::Validation(
                "illustration.zoom_max must be at least 1.0".into(),
            ));
        }
        if ill.viewport[0] == 0 || ill.viewport[1] == 0 {
            return Err(ConfigError::Validation(
                "illustration.viewport values must be non-zero".into(),
            ));
        }

        if parse_hex_color(&self.colors.neutral).is_none() {
            return Err(ConfigError::Validation(format!(
                "colors.neutral is not a hex color: {}",
                self.colors.neutral
            )));
        }
        for (name, hex) in &self.colors.palette {
            if parse_hex_color(hex).is_none() {
                return Err(ConfigError::Validation(format!(
                    "colors.palette.{name} is not a hex color: {hex}"
                )));
            }
        }

        if self.export.fallback_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "export.fallback_name must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Card canvas geometry, in pixels (one pixel per layout unit).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    /// Height of the colored band holding the name.
    pub header_height: u32,
    pub corner_radius: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 300,
            height: 420,
            header_height: 60,
            corner_radius: 30,
        }
    }
}

/// Crop and illustration slot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IllustrationConfig {
    /// Aspect ratio as `[width, height]`, e.g. `[3, 4]` for portrait art.
    pub aspect_ratio: [u32; 2],
    /// Short edge of the slot bitmap produced by a confirmed crop.
    pub short_edge: u32,
    /// Upper bound of the crop zoom range.
    pub zoom_max: f64,
    /// Size of the crop overlay the source image is fitted into.
    pub viewport: [u32; 2],
    /// Resampling filter for crops and illustration scaling.
    pub filter: Filter,
}

impl Default for IllustrationConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: [3, 4],
            short_edge: 240,
            zoom_max: 3.0,
            viewport: [260, 340],
            filter: Filter::default(),
        }
    }
}

impl IllustrationConfig {
    /// Crop aspect as width / height.
    pub fn aspect(&self) -> f64 {
        self.aspect_ratio[0] as f64 / self.aspect_ratio[1] as f64
    }

    /// Pixel size of the bitmap a confirmed crop produces.
    pub fn slot_dimensions(&self) -> (u32, u32) {
        calculate_slot_dimensions(
            (self.aspect_ratio[0], self.aspect_ratio[1]),
            self.short_edge,
        )
    }

    pub fn viewport_dimensions(&self) -> (u32, u32) {
        (self.viewport[0], self.viewport[1])
    }
}

/// Color palette keyed by card color name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Fallback for colors missing from the palette.
    pub neutral: String,
    /// Card color name → hex color.
    pub palette: BTreeMap<String, String>,
}

impl Default for ColorConfig {
    fn default() -> Self {
        let palette = [
            ("Red", "#e74c3c"),
            ("Blue", "#3498db"),
            ("Green", "#2ecc71"),
            ("Yellow", "#f1c40f"),
            ("Purple", "#9b59b6"),
        ]
        .into_iter()
        .map(|(name, hex)| (name.to_string(), hex.to_string()))
        .collect();

        Self {
            neutral: "#95a5a6".to_string(),
            palette,
        }
    }
}

/// Used only if `neutral` itself fails to parse (validation prevents this).
const NEUTRAL_FALLBACK: Rgba<u8> = Rgba([0x95, 0xa5, 0xa6, 0xff]);

impl ColorConfig {
    pub fn neutral(&self) -> Rgba<u8> {
        parse_hex_color(&self.neutral).unwrap_or(NEUTRAL_FALLBACK)
    }

    /// Resolve a card color, falling back to the neutral color for names not
    /// in the palette.
    pub fn resolve(&self, color: &CardColor) -> Rgba<u8> {
        self.palette
            .get(color.name())
            .and_then(|hex| parse_hex_color(hex))
            .unwrap_or_else(|| self.neutral())
    }
}

/// Export naming and encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// File stem used when the card name is empty.
    pub fallback_name: String,
    /// PNG compression effort.
    pub compression: Compression,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            fallback_name: "card".to_string(),
            compression: Compression::default(),
        }
    }
}

/// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
pub fn parse_hex_color(hex: &str) -> Option<Rgba<u8>> {
    let digits = hex.trim().strip_prefix('#')?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    match digits.len() {
        3 => {
            let short = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).ok().map(|v| v * 17);
            Some(Rgba([short(0)?, short(1)?, short(2)?, 0xff]))
        }
        6 => Some(Rgba([channel(0)?, channel(2)?, channel(4)?, 0xff])),
        8 => Some(Rgba([channel(0)?, channel(2)?, channel(4)?, channel(6)?])),
        _ => None,
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(DesignerConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<DesignerConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: DesignerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<DesignerConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Card Designer Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file in the session directory (--session, default
# .card-designer). Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Canvas
# ---------------------------------------------------------------------------
[canvas]
# Card size in pixels. Preview and exported PNG share this size.
width = 300
height = 420

# Height of the colored band holding the card name.
header_height = 60

# Radius of the rounded card corners.
corner_radius = 30

# ---------------------------------------------------------------------------
# Illustration cropping
# ---------------------------------------------------------------------------
[illustration]
# Aspect ratio as [width, height] of the crop rectangle and slot bitmap.
aspect_ratio = [3, 4]

# Short edge of the bitmap a confirmed crop produces (3:4 at 240 → 240x320).
short_edge = 240

# Crop zoom is clamped to [1.0, zoom_max].
zoom_max = 3.0

# Size of the crop overlay; pan distances are measured in these units.
viewport = [260, 340]

# Resampling filter: nearest, triangle, catmull_rom, lanczos3.
filter = "lanczos3"

# ---------------------------------------------------------------------------
# Colors
# ---------------------------------------------------------------------------
[colors]
# Used for card colors that have no palette entry.
neutral = "#95a5a6"

# Card color name -> hex. Entries added here extend the stock palette.
[colors.palette]
Blue = "#3498db"
Green = "#2ecc71"
Purple = "#9b59b6"
Red = "#e74c3c"
Yellow = "#f1c40f"

# ---------------------------------------------------------------------------
# Export
# ---------------------------------------------------------------------------
[export]
# File stem used when the card name is empty: card_card.png, card_card.json.
fallback_name = "card"

# PNG compression effort: fast, default, best. Pixels are identical.
compression = "default"
"##
}
