//! Annotation filters.
//!
//! Every annotation is a [`Filter`]: given a pixel and the color already composed under
//! it, it returns either that color (outside the shape) or its own. The compositor only
//! ever sees the enum, never the concrete shapes.

pub mod circle;
pub mod line;
pub mod pen;
pub mod rect;
pub mod text;

pub use circle::Circle;
pub use line::{Arrow, DottedLine, LineGeometry, StraightLine};
pub use pen::{Pen, PenStroke};
pub use rect::{Rectangle, ShieldBlock};
pub use text::Text;

use super::color::Color;
use crate::geometry::{Point, Rect};

/// Closed set of annotation shapes.
#[derive(Debug, Clone)]
pub enum Filter {
    Arrow(Arrow),
    StraightLine(StraightLine),
    DottedLine(DottedLine),
    Rectangle(Rectangle),
    ShieldBlock(ShieldBlock),
    Circle(Circle),
    Pen(Pen),
    Text(Text),
}

impl Filter {
    /// Color shown at `(x, y)` given the color `under` it.
    pub fn color_at(&self, x: i32, y: i32, under: Color) -> Color {
        match self {
            Filter::Arrow(f) => f.color_at(x, y, under),
            Filter::StraightLine(f) => f.color_at(x, y, under),
            Filter::DottedLine(f) => f.color_at(x, y, under),
            Filter::Rectangle(f) => f.color_at(x, y, under),
            Filter::ShieldBlock(f) => f.color_at(x, y, under),
            Filter::Circle(f) => f.color_at(x, y, under),
            Filter::Pen(f) => f.color_at(x, y, under),
            Filter::Text(f) => f.color_at(x, y, under),
        }
    }

    /// Inclusive bounding box of every pixel the filter may change: `max` is the last
    /// row and column painted, for every variant.
    ///
    /// `None` for a pen that has no points yet.
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Filter::Arrow(f) => Some(f.geometry().bounds()),
            Filter::StraightLine(f) => Some(f.geometry().bounds()),
            Filter::DottedLine(f) => Some(f.geometry().bounds()),
            Filter::Rectangle(f) => Some(f.rect()),
            Filter::ShieldBlock(f) => Some(f.rect()),
            Filter::Circle(f) => Some(f.rect()),
            Filter::Pen(f) => f.bounds(),
            Filter::Text(f) => Some(f.bounds()),
        }
    }

    /// Moves the drag endpoints of two-point shapes. Pens and text ignore it.
    pub fn set_points(&mut self, from: Point, to: Point) {
        match self {
            Filter::Arrow(f) => f.set_points(from, to),
            Filter::StraightLine(f) => f.set_points(from, to),
            Filter::DottedLine(f) => f.set_points(from, to),
            Filter::Rectangle(f) => f.set_points(from, to),
            Filter::ShieldBlock(f) => f.set_points(from, to),
            Filter::Circle(f) => f.set_points(from, to),
            Filter::Pen(_) | Filter::Text(_) => {}
        }
    }

    /// Enables the diagnostic overlay on line-like shapes.
    pub fn set_debug_overlay(&mut self, enabled: bool) {
        match self {
            Filter::Arrow(f) => f.set_debug_overlay(enabled),
            Filter::StraightLine(f) => f.set_debug_overlay(enabled),
            Filter::DottedLine(f) => f.set_debug_overlay(enabled),
            _ => {}
        }
    }

    /// Short human-readable name, used in logs and status messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Filter::Arrow(_) => "arrow",
            Filter::StraightLine(_) => "line",
            Filter::DottedLine(_) => "dotted line",
            Filter::Rectangle(_) => "rectangle",
            Filter::ShieldBlock(_) => "shield block",
            Filter::Circle(_) => "circle",
            Filter::Pen(_) => "pen",
            Filter::Text(_) => "text",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::{BLUE, RED, WHITE};

    #[test]
    fn dispatch_reaches_concrete_filter() {
        let filter = Filter::ShieldBlock(ShieldBlock::new(
            Point::new(0, 0),
            Point::new(4, 4),
            BLUE,
        ));
        assert_eq!(filter.color_at(2, 2, WHITE), BLUE);
        assert_eq!(filter.color_at(5, 2, WHITE), WHITE);
        assert_eq!(filter.kind_name(), "shield block");
    }

    #[test]
    fn set_points_updates_two_point_shapes() {
        let mut filter = Filter::StraightLine(StraightLine::new(
            Point::new(0, 0),
            Point::new(10, 0),
            RED,
            2.0,
        ));
        filter.set_points(Point::new(0, 0), Point::new(0, 10));
        assert_eq!(filter.color_at(0, 5, WHITE), RED);
        assert_eq!(filter.bounds(), Some(Rect::from_coords(-2, -2, 2, 12)));
    }

    #[test]
    fn empty_pen_has_no_bounds() {
        let filter = Filter::Pen(Pen::new(RED, 2.0));
        assert_eq!(filter.bounds(), None);
    }
}
