//! Checkerboard painted wherever a display pixel has no image data behind it.

use crate::draw::color::{CHECKER_DARK, CHECKER_LIGHT, Color};

/// Side of one checkerboard square, in display pixels.
pub const CHECKER_BOX: i32 = 25;

/// Background color at display position `(x, y)`. Independent of zoom and pan.
pub fn checker(x: i32, y: i32) -> Color {
    let column = x.div_euclid(CHECKER_BOX).rem_euclid(2);
    let row = y.div_euclid(CHECKER_BOX).rem_euclid(2);
    if column == row {
        CHECKER_DARK
    } else {
        CHECKER_LIGHT
    }
}
