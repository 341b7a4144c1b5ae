//! Integer pixel geometry and homogeneous 2D transforms.
//!
//! This module provides:
//! - [`Point`] and [`Rect`] in full-image pixel space
//! - [`Vec2`] for direction math on line-like annotations
//! - [`Mat3`] homogeneous rotation/translation matrices and [`rebase_transform`]

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

// ============================================================================
// Points and Rectangles
// ============================================================================

/// Integer pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Point::new(x, y)
    }
}

/// Axis-aligned rectangle described by its min and max corners.
///
/// Pixel buffers treat `max` as exclusive (`width() == max.x - min.x`), while the
/// annotation filters test shape membership inclusively (see [`Rect::contains_inclusive`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    pub const fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    pub const fn from_coords(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            min: Point::new(x0, y0),
            max: Point::new(x1, y1),
        }
    }

    /// Builds a rectangle from its top-left corner and size.
    pub const fn from_size(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::from_coords(x, y, x + width, y + height)
    }

    /// Returns the rectangle with `min` and `max` swapped per axis where needed, so that
    /// `min.x <= max.x` and `min.y <= max.y`.
    pub fn canon(self) -> Self {
        Self::from_coords(
            self.min.x.min(self.max.x),
            self.min.y.min(self.max.y),
            self.min.x.max(self.max.x),
            self.min.y.max(self.max.y),
        )
    }

    pub fn width(&self) -> i32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> i32 {
        self.max.y - self.min.y
    }

    /// Returns true if the rectangle has no pixels (half-open interpretation).
    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Half-open containment: `min <= p < max`.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min.x && x < self.max.x && y >= self.min.y && y < self.max.y
    }

    /// Inclusive containment: `min <= p <= max`.
    pub fn contains_inclusive(&self, x: i32, y: i32) -> bool {
        x >= self.min.x && x <= self.max.x && y >= self.min.y && y <= self.max.y
    }

    /// Grows the rectangle by `amount` on every side, saturating at the `i32` range.
    pub fn inflate(self, amount: i32) -> Self {
        Self::from_coords(
            self.min.x.saturating_sub(amount),
            self.min.y.saturating_sub(amount),
            self.max.x.saturating_add(amount),
            self.max.y.saturating_add(amount),
        )
    }

    pub fn translate(self, delta: Point) -> Self {
        Self::new(self.min + delta, self.max + delta)
    }

    /// Overlap of two rectangles, or `None` when they don't share any pixel.
    pub fn intersect(self, other: Rect) -> Option<Rect> {
        let rect = Self::from_coords(
            self.min.x.max(other.min.x),
            self.min.y.max(other.min.y),
            self.max.x.min(other.max.x),
            self.max.y.min(other.max.y),
        );
        if rect.is_empty() { None } else { Some(rect) }
    }

    /// Grows the rectangle (inclusively) so that it covers `point`.
    pub fn expand_to(self, point: Point) -> Self {
        Self::from_coords(
            self.min.x.min(point.x),
            self.min.y.min(point.y),
            self.max.x.max(point.x),
            self.max.y.max(point.y),
        )
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x).div_euclid(2),
            (self.min.y + self.max.y).div_euclid(2),
        )
    }
}

// ============================================================================
// Vectors
// ============================================================================

/// Euclidean norm of `(dx, dy)`.
pub fn vector_length(dx: f64, dy: f64) -> f64 {
    dx.hypot(dy)
}

/// Floating-point 2D vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector from `from` to `to`.
    pub fn between(from: Point, to: Point) -> Self {
        Self::new((to.x - from.x) as f64, (to.y - from.y) as f64)
    }

    pub fn length(&self) -> f64 {
        vector_length(self.x, self.y)
    }

    /// Unit vector in the same direction.
    ///
    /// Returns `None` for the zero vector: there is no direction to keep. Callers that
    /// need a direction must make sure their input is non-degenerate.
    pub fn normalize(&self) -> Option<Vec2> {
        let len = self.length();
        if len == 0.0 || !len.is_finite() {
            None
        } else {
            Some(Vec2::new(self.x / len, self.y / len))
        }
    }

    /// Angle against the positive x axis, in radians.
    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x)
    }
}

// ============================================================================
// Homogeneous transforms
// ============================================================================

/// 3×3 matrix applied to homogeneous column vectors `(x, y, 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat3 {
    /// Row-major entries.
    pub m: [[f64; 3]; 3],
}

impl Mat3 {
    pub const IDENTITY: Mat3 = Mat3 {
        m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    /// Counter-clockwise rotation by `angle` radians (y axis pointing down makes it
    /// appear clockwise on screen).
    pub fn rotation(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            m: [[cos, -sin, 0.0], [sin, cos, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    pub fn translation(tx: f64, ty: f64) -> Self {
        Self {
            m: [[1.0, 0.0, tx], [0.0, 1.0, ty], [0.0, 0.0, 1.0]],
        }
    }

    /// Applies the transform to `(x, y, 1)` and returns the resulting `(x, y)`.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let m = &self.m;
        let w = m[2][0] * x + m[2][1] * y + m[2][2];
        let tx = m[0][0] * x + m[0][1] * y + m[0][2];
        let ty = m[1][0] * x + m[1][1] * y + m[1][2];
        if w == 1.0 { (tx, ty) } else { (tx / w, ty / w) }
    }
}

impl Mul for Mat3 {
    type Output = Mat3;

    fn mul(self, rhs: Mat3) -> Mat3 {
        let mut out = [[0.0; 3]; 3];
        for (row, out_row) in out.iter_mut().enumerate() {
            for (col, cell) in out_row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.m[row][k] * rhs.m[k][col]).sum();
            }
        }
        Mat3 { m: out }
    }
}

/// Transform into a shape-local frame: "rotate by −angle" composed with
/// "translate by −origin".
///
/// Applying the result to an image-space point yields local coordinates where `origin`
/// is `(0, 0)` and the direction given by `angle` is the positive local x axis.
pub fn rebase_transform(origin: Point, angle: f64) -> Mat3 {
    Mat3::rotation(-angle) * Mat3::translation(-origin.x as f64, -origin.y as f64)
}
