//! Configuration type definitions.

use super::enums::ColorSpec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Drawing-related settings.
///
/// Defaults for new annotations when the editor opens. Remembered preferences from the
/// previous session take precedence over these.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DrawingConfig {
    /// Default annotation color - a named color (red, green, blue, yellow, orange, pink,
    /// white, black) or an RGB/RGBA array like `[255, 0, 0]`
    #[serde(default = "default_color")]
    pub default_color: ColorSpec,

    /// Background box color behind text annotations (default: transparent, no box)
    #[serde(default = "default_text_background")]
    pub text_background: ColorSpec,

    /// Default stroke thickness in pixels (valid range: 1.0 - 50.0)
    #[serde(default = "default_thickness")]
    pub default_thickness: f64,

    /// Default font size for text annotations in pixels (valid range: 6.0 - 200.0)
    #[serde(default = "default_font_size")]
    pub default_font_size: f64,

    /// Font family name for text rendering (e.g., "Sans", "Monospace", "JetBrains Mono")
    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// Font weight (e.g., "normal", "bold", "light", 400, 700)
    #[serde(default = "default_font_weight")]
    pub font_weight: String,

    /// Font style (e.g., "normal", "italic", "oblique")
    #[serde(default = "default_font_style")]
    pub font_style: String,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            default_color: default_color(),
            text_background: default_text_background(),
            default_thickness: default_thickness(),
            default_font_size: default_font_size(),
            font_family: default_font_family(),
            font_weight: default_font_weight(),
            font_style: default_font_style(),
        }
    }
}

/// Viewport and minimap settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ViewConfig {
    /// Initial zoom as a power of two; 1.0 doubles the displayed size (range: -8.0 - 8.0)
    #[serde(default)]
    pub initial_log2_zoom: f64,

    /// Scroll units per zoom step of a factor two
    #[serde(default = "default_zoom_sensitivity")]
    pub zoom_sensitivity: f64,

    /// Minimap width in pixels
    #[serde(default = "default_minimap_size")]
    pub minimap_width: i32,

    /// Minimap height in pixels
    #[serde(default = "default_minimap_size")]
    pub minimap_height: i32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            initial_log2_zoom: 0.0,
            zoom_sensitivity: default_zoom_sensitivity(),
            minimap_width: default_minimap_size(),
            minimap_height: default_minimap_size(),
        }
    }
}

/// Performance tuning options.
///
/// Most users won't need to change these from their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PerformanceConfig {
    /// Capacity of each pointer event queue (valid range: 16 - 100000).
    /// While a queue is full only the newest extra event is kept.
    #[serde(default = "default_drag_queue_capacity")]
    pub drag_queue_capacity: usize,

    /// Maximum number of annotations (0 = unlimited)
    #[serde(default)]
    pub max_filters: usize,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            drag_queue_capacity: default_drag_queue_capacity(),
            max_filters: 0,
        }
    }
}

/// Where finished screenshots are written.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SaveConfig {
    /// Output directory; `~` is expanded
    #[serde(default = "default_save_directory")]
    pub directory: String,

    /// File name template using chrono format specifiers, without extension
    #[serde(default = "default_filename_template")]
    pub filename_template: String,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            directory: default_save_directory(),
            filename_template: default_filename_template(),
        }
    }
}

/// Diagnostics.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DebugConfig {
    /// Paint endpoint and axis markers on line-like annotations
    #[serde(default)]
    pub overlay: bool,
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_color() -> ColorSpec {
    ColorSpec::Name("red".to_string())
}

fn default_text_background() -> ColorSpec {
    ColorSpec::Name("transparent".to_string())
}

fn default_thickness() -> f64 {
    3.0
}

fn default_font_size() -> f64 {
    24.0
}

fn default_font_family() -> String {
    "Sans".to_string()
}

fn default_font_weight() -> String {
    "bold".to_string()
}

fn default_font_style() -> String {
    "normal".to_string()
}

fn default_zoom_sensitivity() -> f64 {
    50.0
}

fn default_minimap_size() -> i32 {
    200
}

fn default_drag_queue_capacity() -> usize {
    1000
}

fn default_save_directory() -> String {
    dirs::picture_dir()
        .map(|dir| dir.join("Shotscribe").to_string_lossy().into_owned())
        .unwrap_or_else(|| "~/Pictures/Shotscribe".to_string())
}

fn default_filename_template() -> String {
    "screenshot_%Y-%m-%d_%H%M%S".to_string()
}
