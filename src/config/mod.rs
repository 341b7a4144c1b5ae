//! Configuration file support for shotscribe.
//!
//! This module handles loading and validating user settings from the configuration file
//! located at `~/.config/shotscribe/config.toml`. Settings include drawing defaults,
//! viewport behavior, performance tuning, and where screenshots are saved.
//!
//! If no config file exists, sensible defaults are used automatically. Values remembered
//! between sessions (last thickness, zoom, colors) live in the separate
//! [`preferences`] store.

pub mod enums;
pub mod preferences;
pub mod types;

// Re-export commonly used types at module level
pub use enums::ColorSpec;
pub use preferences::{MemoryPreferences, PreferenceStore, TomlPreferences};
pub use types::{DebugConfig, DrawingConfig, PerformanceConfig, SaveConfig, ViewConfig};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Stroke thicknesses accepted from the config file, typed input and scripts.
pub const THICKNESS_RANGE: RangeInclusive<f64> = 1.0..=50.0;

/// Main configuration structure containing all user settings.
///
/// All fields have sensible defaults and will use those if not specified in the config
/// file.
///
/// # Example TOML
/// ```toml
/// [drawing]
/// default_color = "red"
/// default_thickness = 3.0
/// text_background = [0, 0, 0, 160]
///
/// [view]
/// initial_log2_zoom = 0.0
/// zoom_sensitivity = 50.0
///
/// [performance]
/// drag_queue_capacity = 1000
///
/// [save]
/// directory = "~/Pictures/Shotscribe"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    /// Annotation defaults (color, thickness, font)
    #[serde(default)]
    pub drawing: DrawingConfig,

    /// Viewport zoom and minimap settings
    #[serde(default)]
    pub view: ViewConfig,

    /// Performance tuning options
    #[serde(default)]
    pub performance: PerformanceConfig,

    /// Output location for saved screenshots
    #[serde(default)]
    pub save: SaveConfig,

    /// Diagnostics
    #[serde(default)]
    pub debug: DebugConfig,
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Invalid values are clamped to the nearest valid value and a warning is logged.
    ///
    /// Validated ranges:
    /// - `default_thickness`: 1.0 - 50.0
    /// - `default_font_size`: 6.0 - 200.0
    /// - `initial_log2_zoom`: -8.0 - 8.0
    /// - `zoom_sensitivity`: 1.0 - 1000.0
    /// - `minimap_width`/`minimap_height`: 16 - 2000
    /// - `drag_queue_capacity`: 16 - 100000
    fn validate_and_clamp(&mut self) {
        if !THICKNESS_RANGE.contains(&self.drawing.default_thickness) {
            warn!(
                "Invalid default_thickness {:.1}, clamping to 1.0-50.0 range",
                self.drawing.default_thickness
            );
            self.drawing.default_thickness = clamp_or(
                self.drawing.default_thickness,
                *THICKNESS_RANGE.start(),
                *THICKNESS_RANGE.end(),
                3.0,
            );
        }

        if !(6.0..=200.0).contains(&self.drawing.default_font_size) {
            warn!(
                "Invalid default_font_size {:.1}, clamping to 6.0-200.0 range",
                self.drawing.default_font_size
            );
            self.drawing.default_font_size =
                clamp_or(self.drawing.default_font_size, 6.0, 200.0, 24.0);
        }

        if !(-8.0..=8.0).contains(&self.view.initial_log2_zoom) {
            warn!(
                "Invalid initial_log2_zoom {:.2}, clamping to -8.0-8.0 range",
                self.view.initial_log2_zoom
            );
            self.view.initial_log2_zoom = clamp_or(self.view.initial_log2_zoom, -8.0, 8.0, 0.0);
        }

        if !(1.0..=1000.0).contains(&self.view.zoom_sensitivity) {
            warn!(
                "Invalid zoom_sensitivity {:.1}, clamping to 1.0-1000.0 range",
                self.view.zoom_sensitivity
            );
            self.view.zoom_sensitivity = clamp_or(self.view.zoom_sensitivity, 1.0, 1000.0, 50.0);
        }

        for (name, value) in [
            ("minimap_width", &mut self.view.minimap_width),
            ("minimap_height", &mut self.view.minimap_height),
        ] {
            if !(16..=2000).contains(&*value) {
                warn!("Invalid {} {}, clamping to 16-2000 range", name, value);
                *value = (*value).clamp(16, 2000);
            }
        }

        if !(16..=100_000).contains(&self.performance.drag_queue_capacity) {
            warn!(
                "Invalid drag_queue_capacity {}, clamping to 16-100000 range",
                self.performance.drag_queue_capacity
            );
            self.performance.drag_queue_capacity =
                self.performance.drag_queue_capacity.clamp(16, 100_000);
        }

        if !is_font_weight(&self.drawing.font_weight) {
            warn!(
                "Unknown font_weight {:?}, using bold",
                self.drawing.font_weight
            );
            self.drawing.font_weight = DrawingConfig::default().font_weight;
        }

        let style = self.drawing.font_style.to_ascii_lowercase();
        if !FONT_STYLES.contains(&style.as_str()) {
            warn!("Unknown font_style {:?}, using normal", self.drawing.font_style);
            self.drawing.font_style = DrawingConfig::default().font_style;
        }

        if self.save.filename_template.trim().is_empty() {
            warn!("Empty save.filename_template, using the default");
            self.save.filename_template = SaveConfig::default().filename_template;
        }
    }

    /// `~/.config/shotscribe/config.toml`, or an error when there is no config directory
    /// (e.g. `HOME` unset).
    pub fn get_config_path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("No config directory for this user")?;
        Ok(base.join("shotscribe").join("config.toml"))
    }

    /// Loads the user's config file; a missing file means all defaults.
    pub fn load() -> Result<Self> {
        let path = Self::get_config_path()?;
        if path.exists() {
            return Self::load_from(&path);
        }
        info!("No config at {}, using defaults", path.display());
        Ok(Self::default())
    }

    /// Loads and validates the configuration at `config_path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or contains invalid TOML.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let text = fs::read_to_string(config_path)
            .with_context(|| format!("Cannot read config file {}", config_path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("Invalid config file {}", config_path.display()))?;
        info!("Using config from {}", config_path.display());
        debug!("{:#?}", config);

        Ok(config)
    }

    /// Parses and validates a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(text)?;
        config.validate_and_clamp();
        Ok(config)
    }

    /// JSON schema describing the configuration file.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }
}

const FONT_WEIGHTS: [&str; 6] = ["ultralight", "light", "normal", "bold", "ultrabold", "heavy"];
const FONT_STYLES: [&str; 3] = ["normal", "italic", "oblique"];

/// Named pango weight, or a numeric one between 100 and 900.
fn is_font_weight(weight: &str) -> bool {
    let weight = weight.trim().to_ascii_lowercase();
    FONT_WEIGHTS.contains(&weight.as_str())
        || weight
            .parse::<u32>()
            .is_ok_and(|value| (100..=900).contains(&value))
}

/// Clamps `value`, mapping NaN to `fallback`.
fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}
