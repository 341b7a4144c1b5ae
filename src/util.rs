//! Utility functions for color names and command-line geometry.
//!
//! This module provides:
//! - Name-to-color mapping for config files and annotation scripts
//! - Parsing of `x0,y0,x1,y1` rectangles

use crate::draw::{Color, color::*};
use crate::geometry::Rect;

// ============================================================================
// Color Mapping
// ============================================================================

/// Maps color name strings to Color values.
///
/// # Supported Names (case-insensitive)
/// - "red", "green", "blue", "yellow", "orange", "pink", "white", "black", "transparent"
pub fn name_to_color(name: &str) -> Option<Color> {
    match name.trim().to_lowercase().as_str() {
        "red" => Some(RED),
        "green" => Some(GREEN),
        "blue" => Some(BLUE),
        "yellow" => Some(YELLOW),
        "orange" => Some(ORANGE),
        "pink" => Some(PINK),
        "white" => Some(WHITE),
        "black" => Some(BLACK),
        "transparent" | "none" => Some(TRANSPARENT),
        _ => None,
    }
}

/// Maps a palette color back to its name; custom colors have none.
pub fn color_to_name(color: &Color) -> Option<&'static str> {
    const NAMED: [(Color, &str); 9] = [
        (RED, "red"),
        (GREEN, "green"),
        (BLUE, "blue"),
        (YELLOW, "yellow"),
        (ORANGE, "orange"),
        (PINK, "pink"),
        (WHITE, "white"),
        (BLACK, "black"),
        (TRANSPARENT, "transparent"),
    ];
    NAMED
        .iter()
        .find(|(named, _)| named == color)
        .map(|(_, name)| *name)
}

// ============================================================================
// Geometry Parsing
// ============================================================================

/// Parses `"x0,y0,x1,y1"` into a canonical rectangle.
pub fn parse_rect(text: &str) -> Option<Rect> {
    let values = text
        .split(',')
        .map(|part| part.trim().parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    match values.as_slice() {
        [x0, y0, x1, y1] => Some(Rect::from_coords(*x0, *y0, *x1, *y1).canon()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_and_color_mappings_round_trip() {
        assert_eq!(name_to_color("White"), Some(WHITE));
        assert_eq!(name_to_color(" none "), Some(TRANSPARENT));
        assert!(name_to_color("chartreuse").is_none());
        assert_eq!(color_to_name(&RED), Some("red"));
        assert_eq!(color_to_name(&Color::rgb(1, 2, 3)), None);
    }

    #[test]
    fn parse_rect_accepts_four_integers() {
        assert_eq!(
            parse_rect("10, 20,5,40"),
            Some(Rect::from_coords(5, 20, 10, 40))
        );
        assert_eq!(parse_rect("1,2,3"), None);
        assert_eq!(parse_rect("a,b,c,d"), None);
    }
}
