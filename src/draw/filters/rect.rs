//! Box-shaped annotations: stroked [`Rectangle`] and filled [`ShieldBlock`].

use crate::draw::color::Color;
use crate::geometry::{Point, Rect};

/// Rectangle outline of `thickness` pixels.
///
/// The hollow interior is the outer rectangle inset by the thickness. When a side is too
/// short for two borders the inset collapses to the center line and the shape comes out
/// as a filled bar.
#[derive(Debug, Clone)]
pub struct Rectangle {
    rect: Rect,
    inner: Rect,
    thickness: f64,
    pub color: Color,
}

impl Rectangle {
    pub fn new(from: Point, to: Point, color: Color, thickness: f64) -> Self {
        let mut rectangle = Self {
            rect: Rect::default(),
            inner: Rect::default(),
            thickness,
            color,
        };
        rectangle.set_points(from, to);
        rectangle
    }

    pub fn set_points(&mut self, from: Point, to: Point) {
        self.rect = Rect::new(from, to).canon();
        let thickness = self.thickness.max(0.0);
        let inset = thickness as i32;
        let span = (2.0 * thickness) as i32;
        let (min_x, max_x) = inset_axis(self.rect.min.x, self.rect.max.x, inset, span);
        let (min_y, max_y) = inset_axis(self.rect.min.y, self.rect.max.y, inset, span);
        self.inner = Rect::from_coords(min_x, min_y, max_x, max_y);
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Hollow interior; pixels strictly inside it show through.
    pub fn inner(&self) -> Rect {
        self.inner
    }

    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    pub fn color_at(&self, x: i32, y: i32, under: Color) -> Color {
        if !self.rect.contains_inclusive(x, y) {
            return under;
        }
        let inner = &self.inner;
        let hollow = x > inner.min.x && x < inner.max.x && y > inner.min.y && y < inner.max.y;
        if hollow { under } else { self.color }
    }
}

/// Insets `min..=max` by `inset` on both ends, or collapses it to its center when the
/// axis is not longer than `span` (the width of both borders together).
fn inset_axis(min: i32, max: i32, inset: i32, span: i32) -> (i32, i32) {
    if max.saturating_sub(min) > span {
        (min.saturating_add(inset), max.saturating_sub(inset))
    } else {
        let center = ((min as i64 + max as i64).div_euclid(2)) as i32;
        (center, center)
    }
}

/// Opaque filled block, used to redact parts of a screenshot.
#[derive(Debug, Clone)]
pub struct ShieldBlock {
    rect: Rect,
    pub color: Color,
}

impl ShieldBlock {
    pub fn new(from: Point, to: Point, color: Color) -> Self {
        Self {
            rect: Rect::new(from, to).canon(),
            color,
        }
    }

    pub fn set_points(&mut self, from: Point, to: Point) {
        self.rect = Rect::new(from, to).canon();
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn color_at(&self, x: i32, y: i32, under: Color) -> Color {
        if self.rect.contains_inclusive(x, y) {
            self.color
        } else {
            under
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::{BLACK, BLUE, WHITE};

    #[test]
    fn rectangle_border_and_hollow_interior() {
        let rectangle = Rectangle::new(Point::new(0, 0), Point::new(40, 40), BLUE, 5.0);
        assert_eq!(rectangle.inner(), Rect::from_coords(5, 5, 35, 35));

        for x in 6..35 {
            for y in 6..35 {
                assert_eq!(rectangle.color_at(x, y, WHITE), WHITE, "({x}, {y})");
            }
        }
        for i in 0..=40 {
            assert_eq!(rectangle.color_at(i, 0, WHITE), BLUE);
            assert_eq!(rectangle.color_at(i, 40, WHITE), BLUE);
            assert_eq!(rectangle.color_at(0, i, WHITE), BLUE);
            assert_eq!(rectangle.color_at(40, i, WHITE), BLUE);
        }
        assert_eq!(rectangle.color_at(5, 20, WHITE), BLUE);
        assert_eq!(rectangle.color_at(41, 20, WHITE), WHITE);
        assert_eq!(rectangle.color_at(-1, 20, WHITE), WHITE);
    }

    #[test]
    fn thin_rectangle_collapses_into_filled_bar() {
        let rectangle = Rectangle::new(Point::new(10, 0), Point::new(0, 100), BLUE, 8.0);
        assert_eq!(rectangle.rect(), Rect::from_coords(0, 0, 10, 100));
        assert_eq!(rectangle.inner().min.x, rectangle.inner().max.x);
        for x in 0..=10 {
            assert_eq!(rectangle.color_at(x, 50, WHITE), BLUE);
        }
    }

    #[test]
    fn fractional_thickness_collapses_on_both_borders_width() {
        // 2 * 2.5 = 5 pixels of border: a 5 pixel wide side is fully covered.
        let rectangle = Rectangle::new(Point::new(0, 0), Point::new(5, 40), BLUE, 2.5);
        assert_eq!(rectangle.inner().min.x, rectangle.inner().max.x);
        for x in 0..=5 {
            assert_eq!(rectangle.color_at(x, 20, WHITE), BLUE, "x = {x}");
        }

        let wider = Rectangle::new(Point::new(0, 0), Point::new(6, 40), BLUE, 2.5);
        assert_eq!(wider.inner(), Rect::from_coords(2, 2, 4, 38));
        assert_eq!(wider.color_at(3, 20, WHITE), WHITE);
    }

    #[test]
    fn huge_thickness_fills_the_box() {
        let rectangle = Rectangle::new(Point::new(10, 10), Point::new(15, 15), BLUE, 3e9);
        assert_eq!(rectangle.inner().min, rectangle.inner().max);
        assert_eq!(rectangle.color_at(12, 12, WHITE), BLUE);
        assert_eq!(rectangle.color_at(16, 12, WHITE), WHITE);
    }

    #[test]
    fn shield_block_is_inclusive() {
        let mut shield = ShieldBlock::new(Point::new(20, 20), Point::new(10, 10), BLACK);
        for x in 10..=20 {
            for y in 10..=20 {
                assert_eq!(shield.color_at(x, y, WHITE), BLACK);
            }
        }
        assert_eq!(shield.color_at(21, 15, WHITE), WHITE);
        assert_eq!(shield.color_at(15, 9, WHITE), WHITE);

        shield.set_points(Point::new(0, 0), Point::new(2, 2));
        assert_eq!(shield.color_at(15, 15, WHITE), WHITE);
        assert_eq!(shield.color_at(2, 2, WHITE), BLACK);
    }
}
