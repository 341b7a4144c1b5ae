//! Configuration enum types.

use crate::draw::{Color, color::RED};
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Color specification - a named color, RGB values or RGBA values.
///
/// # Examples
/// ```toml
/// # Named color
/// default_color = "red"
///
/// # Custom RGB color (0-255 per component)
/// default_color = [255, 128, 0]  # Orange
///
/// # With alpha; [0, 0, 0, 0] is fully transparent
/// text_background = [0, 0, 0, 160]
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Named color: red, green, blue, yellow, orange, pink, white, black, transparent
    Name(String),
    /// RGB color as [red, green, blue] where each component is 0-255
    Rgb([u8; 3]),
    /// RGBA color as [red, green, blue, alpha] where each component is 0-255
    Rgba([u8; 4]),
}

impl ColorSpec {
    /// Converts the color specification to a [`Color`].
    ///
    /// Unknown color names default to red with a warning.
    pub fn to_color(&self) -> Color {
        match self {
            ColorSpec::Name(name) => crate::util::name_to_color(name).unwrap_or_else(|| {
                warn!("Unknown color '{}', using red", name);
                RED
            }),
            ColorSpec::Rgb([r, g, b]) => Color::rgb(*r, *g, *b),
            ColorSpec::Rgba(rgba) => Color::from_array(*rgba),
        }
    }
}

impl From<Color> for ColorSpec {
    fn from(color: Color) -> Self {
        match crate::util::color_to_name(&color) {
            Some(name) => ColorSpec::Name(name.to_string()),
            None if color.is_opaque() => ColorSpec::Rgb([color.r, color.g, color.b]),
            None => ColorSpec::Rgba(color.to_array()),
        }
    }
}
