//! RGBA color type and predefined color constants.

use serde::{Deserialize, Serialize};

/// Represents an RGBA color with 8-bit components.
///
/// Alpha distinguishes opaque (255) from transparent (0) colors. Annotation filters
/// replace the pixel under them with their color as-is; only text coverage blends.
///
/// # Examples
///
/// ```
/// use shotscribe::draw::Color;
/// let red = Color::rgb(255, 0, 0);
/// let translucent_blue = Color::new(0, 0, 255, 128);
/// assert!(red.is_opaque());
/// assert!(!translucent_blue.is_opaque());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    /// Red component
    pub r: u8,
    /// Green component
    pub g: u8,
    /// Blue component
    pub b: u8,
    /// Alpha (0 = fully transparent, 255 = fully opaque)
    pub a: u8,
}

impl Color {
    /// Creates a new color from RGBA components.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Returns the same color with coverage `alpha` (0-255) applied on top of its own alpha.
    pub fn with_coverage(self, alpha: u8) -> Self {
        let a = (self.a as u16 * alpha as u16 + 127) / 255;
        Self { a: a as u8, ..self }
    }

    /// Source-over compositing of `self` on top of `under`.
    pub fn over(self, under: Color) -> Color {
        if self.is_opaque() {
            return self;
        }
        if self.is_transparent() {
            return under;
        }
        let src_a = self.a as u32;
        let dst_a = under.a as u32;
        // All arithmetic scaled by 255 * 255.
        let out_a = src_a * 255 + dst_a * (255 - src_a);
        if out_a == 0 {
            return TRANSPARENT;
        }
        let channel = |s: u8, d: u8| -> u8 {
            let num = s as u32 * src_a * 255 + d as u32 * dst_a * (255 - src_a);
            ((num + out_a / 2) / out_a) as u8
        };
        Color {
            r: channel(self.r, under.r),
            g: channel(self.g, under.g),
            b: channel(self.b, under.b),
            a: ((out_a + 127) / 255) as u8,
        }
    }

    /// Components as `[r, g, b, a]`.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_array([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

// ============================================================================
// Predefined Color Constants
// ============================================================================

/// Predefined red color
pub const RED: Color = Color::rgb(255, 64, 64);

/// Predefined green color
pub const GREEN: Color = Color::rgb(0, 200, 0);

/// Predefined blue color
pub const BLUE: Color = Color::rgb(0, 90, 255);

/// Predefined yellow color
pub const YELLOW: Color = Color::rgb(255, 255, 64);

/// Predefined orange color
pub const ORANGE: Color = Color::rgb(255, 128, 0);

/// Predefined pink/magenta color
pub const PINK: Color = Color::rgb(255, 0, 255);

/// Predefined white color
pub const WHITE: Color = Color::rgb(255, 255, 255);

/// Predefined black color
pub const BLACK: Color = Color::rgb(0, 0, 0);

/// Fully transparent color (default text background)
pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);

// Checkerboard shown wherever there is no image data.
pub const CHECKER_DARK: Color = Color::rgb(58, 58, 58);
pub const CHECKER_LIGHT: Color = Color::rgb(84, 84, 84);

// Diagnostic overlay markers for line-like annotations.
pub const MARKER_YELLOW: Color = Color::rgb(255, 255, 0);
pub const MARKER_GREEN: Color = Color::rgb(80, 255, 80);

/// Minimap outline marking the visible viewport area.
pub const VIEWPORT_INDICATOR: Color = YELLOW;
