//! Line-family annotations: arrow, straight line and dotted line.
//!
//! All three share [`LineGeometry`]: the segment is rebased into a local frame where
//! `from` is the origin and `to` lies on the positive x axis, so the pixel tests become
//! interval checks on the local coordinates.

use crate::draw::color::{Color, MARKER_GREEN, MARKER_YELLOW};
use crate::geometry::{Mat3, Point, Rect, Vec2, rebase_transform};

/// Arrowhead length, in multiples of the stroke thickness.
pub const ARROW_HEAD_LENGTH_FACTOR: f64 = 10.0;
/// Arrowhead base width, in multiples of the stroke thickness.
pub const ARROW_HEAD_WIDTH_FACTOR: f64 = 6.0;
/// Dash period of dotted lines, in local x units (on, then off).
pub const DASH_PERIOD: f64 = 5.0;

/// Segment geometry with its cached bounding rectangle and rebase transform.
#[derive(Debug, Clone)]
pub struct LineGeometry {
    from: Point,
    to: Point,
    thickness: f64,
    margin: i32,
    bounds: Rect,
    rebase: Mat3,
    length: f64,
}

impl LineGeometry {
    fn new(from: Point, to: Point, thickness: f64, margin: i32) -> Self {
        let mut geometry = Self {
            from,
            to,
            thickness,
            margin,
            bounds: Rect::default(),
            rebase: Mat3::IDENTITY,
            length: 0.0,
        };
        geometry.set_points(from, to);
        geometry
    }

    /// Moves the endpoints and recomputes every derived value.
    ///
    /// A zero-length segment gets `to.x` nudged by one pixel so a direction always exists.
    fn set_points(&mut self, from: Point, to: Point) {
        let to = if to == from {
            Point::new(to.x + 1, to.y)
        } else {
            to
        };
        self.from = from;
        self.to = to;
        self.bounds = Rect::new(from, to).canon().inflate(self.margin);

        let vector = Vec2::between(from, to);
        self.length = vector.length();
        let angle = vector.normalize().map(|d| d.angle()).unwrap_or(0.0);
        self.rebase = rebase_transform(from, angle);
        log::trace!(
            "line geometry: from={:?} to={:?} length={:.0} angle={:.1}",
            from,
            to,
            self.length,
            angle.to_degrees()
        );
    }

    pub fn from(&self) -> Point {
        self.from
    }

    pub fn to(&self) -> Point {
        self.to
    }

    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    /// Inflated bounding rectangle; pixels outside it are never part of the shape.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Local `(along, across)` coordinates of `(x, y)`, or `None` outside the bounds.
    pub fn local(&self, x: i32, y: i32) -> Option<(f64, f64)> {
        if !self.bounds.contains_inclusive(x, y) {
            return None;
        }
        Some(self.rebase.apply(x as f64, y as f64))
    }

    /// Diagnostic markers: image-space axes through both endpoints and the local axes.
    fn overlay(&self, x: i32, y: i32, local: (f64, f64)) -> Option<Color> {
        let near = |a: i32, b: i32, tolerance: i32| (a - b).abs() < tolerance;
        if near(y, self.to.y, 2) || near(x, self.to.x, 2) {
            return Some(MARKER_YELLOW);
        }
        if near(y, self.from.y, 2) || near(x, self.from.x, 2) {
            return Some(MARKER_YELLOW);
        }
        let (lx, ly) = local;
        if ly.abs() < 3.0 || lx.abs() < 1.0 || (lx - self.length).abs() < 1.0 {
            return Some(MARKER_GREEN);
        }
        None
    }
}

fn thickness_margin(thickness: f64) -> i32 {
    thickness.max(0.0).ceil() as i32
}

// ============================================================================
// Straight line
// ============================================================================

/// Solid segment of constant thickness.
#[derive(Debug, Clone)]
pub struct StraightLine {
    geometry: LineGeometry,
    pub color: Color,
    debug_overlay: bool,
}

impl StraightLine {
    pub fn new(from: Point, to: Point, color: Color, thickness: f64) -> Self {
        Self {
            geometry: LineGeometry::new(from, to, thickness, thickness_margin(thickness)),
            color,
            debug_overlay: false,
        }
    }

    pub fn set_points(&mut self, from: Point, to: Point) {
        self.geometry.set_points(from, to);
    }

    pub fn geometry(&self) -> &LineGeometry {
        &self.geometry
    }

    pub fn set_debug_overlay(&mut self, enabled: bool) {
        self.debug_overlay = enabled;
    }

    pub fn color_at(&self, x: i32, y: i32, under: Color) -> Color {
        let Some(local) = self.geometry.local(x, y) else {
            return under;
        };
        if self.debug_overlay {
            if let Some(marker) = self.geometry.overlay(x, y, local) {
                return marker;
            }
        }
        let (lx, ly) = local;
        if lx >= 0.0 && lx < self.geometry.length && ly.abs() < self.geometry.thickness / 2.0 {
            self.color
        } else {
            under
        }
    }
}

// ============================================================================
// Dotted line
// ============================================================================

/// Segment drawn as alternating dashes of [`DASH_PERIOD`] pixels.
#[derive(Debug, Clone)]
pub struct DottedLine {
    geometry: LineGeometry,
    pub color: Color,
    debug_overlay: bool,
}

impl DottedLine {
    pub fn new(from: Point, to: Point, color: Color, thickness: f64) -> Self {
        Self {
            geometry: LineGeometry::new(from, to, thickness, thickness_margin(thickness)),
            color,
            debug_overlay: false,
        }
    }

    pub fn set_points(&mut self, from: Point, to: Point) {
        self.geometry.set_points(from, to);
    }

    pub fn geometry(&self) -> &LineGeometry {
        &self.geometry
    }

    pub fn set_debug_overlay(&mut self, enabled: bool) {
        self.debug_overlay = enabled;
    }

    pub fn color_at(&self, x: i32, y: i32, under: Color) -> Color {
        let Some(local) = self.geometry.local(x, y) else {
            return under;
        };
        if self.debug_overlay {
            if let Some(marker) = self.geometry.overlay(x, y, local) {
                return marker;
            }
        }
        let (lx, ly) = local;
        if lx < 0.0 || lx >= self.geometry.length {
            return under;
        }
        let dash_on = (lx / DASH_PERIOD).floor() as i64 % 2 == 0;
        if dash_on && ly.abs() < self.geometry.thickness / 2.0 {
            self.color
        } else {
            under
        }
    }
}

// ============================================================================
// Arrow
// ============================================================================

/// Shaft plus a triangular head ending exactly at `to`.
#[derive(Debug, Clone)]
pub struct Arrow {
    geometry: LineGeometry,
    pub color: Color,
    debug_overlay: bool,
}

impl Arrow {
    pub fn new(from: Point, to: Point, color: Color, thickness: f64) -> Self {
        let margin = (ARROW_HEAD_WIDTH_FACTOR * thickness.max(0.0)).ceil() as i32;
        Self {
            geometry: LineGeometry::new(from, to, thickness, margin),
            color,
            debug_overlay: false,
        }
    }

    pub fn set_points(&mut self, from: Point, to: Point) {
        self.geometry.set_points(from, to);
    }

    pub fn geometry(&self) -> &LineGeometry {
        &self.geometry
    }

    pub fn set_debug_overlay(&mut self, enabled: bool) {
        self.debug_overlay = enabled;
    }

    /// Local x where the shaft ends and the head starts (may be negative for short arrows).
    pub fn head_start(&self) -> f64 {
        self.geometry.length - ARROW_HEAD_LENGTH_FACTOR * self.geometry.thickness
    }

    /// Allowed perpendicular half-width at local x `lx`.
    ///
    /// Constant `thickness / 2` along the shaft; in the head it tapers linearly down to
    /// zero at the tip.
    pub fn half_width_at(&self, lx: f64) -> f64 {
        if lx < 0.0 {
            return 0.0;
        }
        if lx < self.head_start() {
            self.geometry.thickness / 2.0
        } else {
            let remaining = self.geometry.length - lx;
            (remaining * ARROW_HEAD_WIDTH_FACTOR / ARROW_HEAD_LENGTH_FACTOR / 2.0).max(0.0)
        }
    }

    pub fn color_at(&self, x: i32, y: i32, under: Color) -> Color {
        let Some(local) = self.geometry.local(x, y) else {
            return under;
        };
        if self.debug_overlay {
            if let Some(marker) = self.geometry.overlay(x, y, local) {
                return marker;
            }
        }
        let (lx, ly) = local;
        if lx < 0.0 {
            return under;
        }
        if ly.abs() < self.half_width_at(lx) {
            self.color
        } else {
            under
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::{BLACK, RED, WHITE};

    const UNDER: Color = WHITE;

    fn horizontal_line() -> StraightLine {
        StraightLine::new(Point::new(0, 0), Point::new(100, 0), RED, 4.0)
    }

    #[test]
    fn straight_line_colors_inside_half_thickness_only() {
        let line = horizontal_line();
        assert_eq!(line.color_at(50, 0, UNDER), RED);
        assert_eq!(line.color_at(50, 1, UNDER), RED);
        assert_eq!(line.color_at(50, -1, UNDER), RED);
        assert_eq!(line.color_at(50, 2, UNDER), UNDER);
        assert_eq!(line.color_at(50, 3, UNDER), UNDER);
        assert_eq!(line.color_at(-1, 0, UNDER), UNDER);
        assert_eq!(line.color_at(100, 0, UNDER), UNDER);
    }

    #[test]
    fn line_family_ignores_pixels_outside_bounds() {
        let from = Point::new(10, 30);
        let to = Point::new(70, -20);
        let line = StraightLine::new(from, to, RED, 6.0);
        let dotted = DottedLine::new(from, to, RED, 6.0);
        let arrow = Arrow::new(from, to, RED, 3.0);
        for bounds in [
            line.geometry().bounds(),
            dotted.geometry().bounds(),
            arrow.geometry().bounds(),
        ] {
            for x in bounds.min.x - 5..bounds.max.x + 5 {
                for y in bounds.min.y - 5..bounds.max.y + 5 {
                    if bounds.contains_inclusive(x, y) {
                        continue;
                    }
                    assert_eq!(line.color_at(x, y, UNDER), UNDER);
                    assert_eq!(dotted.color_at(x, y, UNDER), UNDER);
                    assert_eq!(arrow.color_at(x, y, UNDER), UNDER);
                }
            }
        }
    }

    #[test]
    fn degenerate_line_is_nudged_one_pixel() {
        let mut line = StraightLine::new(Point::new(5, 5), Point::new(5, 5), RED, 2.0);
        assert_eq!(line.geometry().to(), Point::new(6, 5));
        assert!((line.geometry().length() - 1.0).abs() < 1e-9);
        assert_eq!(line.color_at(5, 5, UNDER), RED);

        line.set_points(Point::new(0, 0), Point::new(0, 20));
        assert_eq!(line.geometry().to(), Point::new(0, 20));
        assert_eq!(line.color_at(0, 10, UNDER), RED);
        assert_eq!(line.color_at(10, 0, UNDER), UNDER);
    }

    #[test]
    fn huge_thickness_saturates_bounds() {
        let line = StraightLine::new(Point::new(10, 10), Point::new(50, 50), RED, 1e10);
        let everything = Rect::from_coords(i32::MIN, i32::MIN, i32::MAX, i32::MAX);
        assert_eq!(line.geometry().bounds(), everything);
        assert_eq!(line.color_at(30, 30, UNDER), RED);

        let arrow = Arrow::new(Point::new(10, 10), Point::new(50, 50), RED, 1e10);
        assert_eq!(arrow.geometry().bounds(), everything);
    }

    #[test]
    fn set_points_refreshes_bounds_and_transform() {
        let mut line = horizontal_line();
        line.set_points(Point::new(0, 0), Point::new(0, 100));
        assert_eq!(line.geometry().bounds(), Rect::from_coords(-4, -4, 4, 104));
        assert_eq!(line.color_at(0, 50, UNDER), RED);
        assert_eq!(line.color_at(50, 0, UNDER), UNDER);
    }

    #[test]
    fn dotted_line_alternates_every_five_pixels() {
        let dotted = DottedLine::new(Point::new(0, 0), Point::new(100, 0), RED, 4.0);
        for x in 0..100 {
            let expected = if (x / 5) % 2 == 0 { RED } else { UNDER };
            assert_eq!(dotted.color_at(x, 0, UNDER), expected, "x = {x}");
        }
        assert_eq!(dotted.color_at(2, 3, UNDER), UNDER);
    }

    #[test]
    fn arrow_head_tapers_to_zero_at_tip() {
        let arrow = Arrow::new(Point::new(0, 0), Point::new(200, 0), RED, 4.0);
        let head_start = arrow.head_start();
        assert!((head_start - 160.0).abs() < 1e-9);

        let at_boundary = arrow.half_width_at(head_start);
        let near_tip = arrow.half_width_at(198.0);
        assert!(near_tip < at_boundary);
        assert!(arrow.half_width_at(200.0).abs() < 1e-9);
        assert!((arrow.half_width_at(100.0) - 2.0).abs() < 1e-9);

        // Shaft is thin, head base is wide.
        assert_eq!(arrow.color_at(100, 3, UNDER), UNDER);
        assert_eq!(arrow.color_at(165, 8, UNDER), RED);
        assert_eq!(arrow.color_at(200, 0, UNDER), UNDER);
        assert_eq!(arrow.color_at(-1, 0, UNDER), UNDER);
    }

    #[test]
    fn debug_overlay_marks_endpoints() {
        let mut line = horizontal_line();
        line.set_debug_overlay(true);
        assert_eq!(line.color_at(100, 3, BLACK), MARKER_YELLOW);
        line.set_debug_overlay(false);
        assert_eq!(line.color_at(100, 3, BLACK), BLACK);
    }
}
