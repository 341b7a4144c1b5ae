//! Elliptical ring annotation fitted to a dragged rectangle.

use crate::draw::color::Color;
use crate::geometry::{Point, Rect};

/// Ellipse outline inscribed in the canonical rectangle between two points.
#[derive(Debug, Clone)]
pub struct Circle {
    rect: Rect,
    thickness: f64,
    center: (f64, f64),
    outer: (f64, f64),
    inner: Option<(f64, f64)>,
    pub color: Color,
}

impl Circle {
    pub fn new(from: Point, to: Point, color: Color, thickness: f64) -> Self {
        let mut circle = Self {
            rect: Rect::default(),
            thickness,
            center: (0.0, 0.0),
            outer: (0.5, 0.5),
            inner: None,
            color,
        };
        circle.set_points(from, to);
        circle
    }

    pub fn set_points(&mut self, from: Point, to: Point) {
        self.rect = Rect::new(from, to).canon();
        self.center = (
            (self.rect.min.x + self.rect.max.x) as f64 / 2.0,
            (self.rect.min.y + self.rect.max.y) as f64 / 2.0,
        );
        // A zero-width side still covers its own pixel column.
        let rx = (self.rect.width() as f64 / 2.0).max(0.5);
        let ry = (self.rect.height() as f64 / 2.0).max(0.5);
        self.outer = (rx, ry);
        let (ix, iy) = (rx - self.thickness, ry - self.thickness);
        self.inner = (ix > 0.0 && iy > 0.0).then_some((ix, iy));
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// True when the ring is so thick that the ellipse is drawn filled.
    pub fn is_filled(&self) -> bool {
        self.inner.is_none()
    }

    fn ellipse_distance(&self, x: i32, y: i32, (rx, ry): (f64, f64)) -> f64 {
        let dx = (x as f64 - self.center.0) / rx;
        let dy = (y as f64 - self.center.1) / ry;
        dx * dx + dy * dy
    }

    pub fn color_at(&self, x: i32, y: i32, under: Color) -> Color {
        if !self.rect.contains_inclusive(x, y) {
            return under;
        }
        if self.ellipse_distance(x, y, self.outer) > 1.0 {
            return under;
        }
        match self.inner {
            Some(inner) if self.ellipse_distance(x, y, inner) < 1.0 => under,
            _ => self.color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::{GREEN, WHITE};

    #[test]
    fn ring_has_hollow_center_and_transparent_corners() {
        let circle = Circle::new(Point::new(0, 0), Point::new(100, 100), GREEN, 4.0);
        assert!(!circle.is_filled());
        assert_eq!(circle.color_at(50, 50, WHITE), WHITE);
        assert_eq!(circle.color_at(0, 50, WHITE), GREEN);
        assert_eq!(circle.color_at(50, 99, WHITE), GREEN);
        assert_eq!(circle.color_at(2, 2, WHITE), WHITE);
        assert_eq!(circle.color_at(101, 50, WHITE), WHITE);
    }

    #[test]
    fn thick_ring_fills_the_ellipse() {
        let circle = Circle::new(Point::new(0, 0), Point::new(10, 30), GREEN, 6.0);
        assert!(circle.is_filled());
        assert_eq!(circle.color_at(5, 15, WHITE), GREEN);
    }

    #[test]
    fn degenerate_circle_covers_its_line() {
        let circle = Circle::new(Point::new(5, 0), Point::new(5, 20), GREEN, 2.0);
        assert_eq!(circle.color_at(5, 10, WHITE), GREEN);
        assert_eq!(circle.color_at(6, 10, WHITE), WHITE);
    }
}
