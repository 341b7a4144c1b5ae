//! Freehand pen strokes.
//!
//! The stroke's point list is the only piece of editor state shared across threads: the
//! drag consumer task appends to it while the compositor reads it on the UI thread. The
//! lock is held for a single append or a single pixel query, never for a whole pass.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::draw::color::Color;
use crate::geometry::{Point, Rect};

/// Pixels within `COVERAGE_FACTOR * thickness` of a stored point are painted.
pub const COVERAGE_FACTOR: f64 = 2.0;

#[derive(Debug, Default)]
struct StrokePoints {
    points: Vec<Point>,
    bounds: Option<Rect>,
    buckets: HashMap<(i32, i32), Vec<usize>>,
}

/// Thread-safe, append-only list of sampled stroke points.
#[derive(Debug)]
pub struct PenStroke {
    thickness: f64,
    radius: f64,
    cell: i32,
    inner: Mutex<StrokePoints>,
}

impl PenStroke {
    pub fn new(thickness: f64) -> Self {
        let radius = COVERAGE_FACTOR * thickness.max(0.0);
        Self {
            thickness,
            radius,
            cell: (radius.ceil() as i32).max(1),
            inner: Mutex::new(StrokePoints::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StrokePoints> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn bucket_of(&self, point: Point) -> (i32, i32) {
        (point.x.div_euclid(self.cell), point.y.div_euclid(self.cell))
    }

    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    /// Appends a raw input point, filling gaps wider than one thickness with evenly
    /// spaced intermediate points. Repeats of the last point are ignored.
    pub fn add_point(&self, point: Point) {
        let mut stroke = self.lock();
        let mut added = 0usize;
        if let Some(&previous) = stroke.points.last() {
            if previous == point {
                return;
            }
            let dx = point.x - previous.x;
            let dy = point.y - previous.y;
            let step = self.thickness.max(1.0);
            let steps = (dx.abs().max(dy.abs()) as f64 / step) as i32;
            for i in 1..steps {
                let t = i as f64 / steps as f64;
                let interpolated = Point::new(
                    previous.x + (dx as f64 * t).round() as i32,
                    previous.y + (dy as f64 * t).round() as i32,
                );
                self.push(&mut stroke, interpolated);
                added += 1;
            }
        }
        self.push(&mut stroke, point);
        if added > 0 {
            log::trace!("pen: interpolated {} points before {:?}", added, point);
        }
    }

    fn push(&self, stroke: &mut StrokePoints, point: Point) {
        let index = stroke.points.len();
        stroke.points.push(point);
        stroke.bounds = Some(match stroke.bounds {
            Some(bounds) => bounds.expand_to(point),
            None => Rect::new(point, point),
        });
        let key = self.bucket_of(point);
        stroke.buckets.entry(key).or_default().push(index);
    }

    /// Copy of the stored points in insertion order.
    pub fn points(&self) -> Vec<Point> {
        self.lock().points.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bounding box of every pixel the stroke can paint.
    pub fn bounds(&self) -> Option<Rect> {
        let margin = self.radius.ceil() as i32;
        self.lock().bounds.map(|bounds| bounds.inflate(margin))
    }

    /// True when some stored point lies closer than the coverage radius to `(x, y)`.
    pub fn covers(&self, x: i32, y: i32) -> bool {
        let stroke = self.lock();
        let Some(bounds) = stroke.bounds else {
            return false;
        };
        let margin = self.radius.ceil() as i32;
        if !bounds.inflate(margin).contains_inclusive(x, y) {
            return false;
        }
        let radius_sq = self.radius * self.radius;
        let (bx, by) = self.bucket_of(Point::new(x, y));
        for cy in by - 1..=by + 1 {
            for cx in bx - 1..=bx + 1 {
                let Some(indices) = stroke.buckets.get(&(cx, cy)) else {
                    continue;
                };
                let hit = indices.iter().any(|&i| {
                    let p = stroke.points[i];
                    let dx = (p.x - x) as f64;
                    let dy = (p.y - y) as f64;
                    dx * dx + dy * dy < radius_sq
                });
                if hit {
                    return true;
                }
            }
        }
        false
    }
}

/// Freehand annotation; clones share the same stroke.
#[derive(Debug, Clone)]
pub struct Pen {
    stroke: Arc<PenStroke>,
    pub color: Color,
}

impl Pen {
    pub fn new(color: Color, thickness: f64) -> Self {
        Self {
            stroke: Arc::new(PenStroke::new(thickness)),
            color,
        }
    }

    /// Shared handle for the task feeding new points.
    pub fn stroke(&self) -> Arc<PenStroke> {
        Arc::clone(&self.stroke)
    }

    pub fn add_point(&self, point: Point) {
        self.stroke.add_point(point);
    }

    pub fn thickness(&self) -> f64 {
        self.stroke.thickness()
    }

    pub fn points(&self) -> Vec<Point> {
        self.stroke.points()
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.stroke.bounds()
    }

    pub fn color_at(&self, x: i32, y: i32, under: Color) -> Color {
        if self.stroke.covers(x, y) {
            self.color
        } else {
            under
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::{RED, WHITE};
    use std::thread;

    #[test]
    fn sparse_input_is_interpolated() {
        let pen = Pen::new(RED, 10.0);
        pen.add_point(Point::new(0, 0));
        pen.add_point(Point::new(100, 0));

        let points = pen.points();
        assert_eq!(points.first(), Some(&Point::new(0, 0)));
        assert_eq!(points.last(), Some(&Point::new(100, 0)));
        let interior = &points[1..points.len() - 1];
        assert!(interior.len() >= 8, "only {} interior points", interior.len());
        for pair in points.windows(2) {
            let gap = (pair[1].x - pair[0].x).abs();
            assert!(gap <= 10, "gap {gap} too wide");
        }
        for x in 0..=100 {
            assert_eq!(pen.color_at(x, 0, WHITE), RED, "x = {x}");
        }
    }

    #[test]
    fn coverage_is_twice_the_thickness() {
        let pen = Pen::new(RED, 3.0);
        pen.add_point(Point::new(50, 50));
        assert_eq!(pen.color_at(50, 55, WHITE), RED);
        assert_eq!(pen.color_at(50, 56, WHITE), WHITE);
        assert_eq!(pen.color_at(55, 54, WHITE), WHITE);
        assert_eq!(pen.bounds(), Some(Rect::from_coords(44, 44, 56, 56)));
    }

    #[test]
    fn bucketed_lookup_matches_full_scan() {
        let stroke = PenStroke::new(2.5);
        for (x, y) in [(3, 40), (17, 22), (31, 35), (30, 8), (52, 12), (60, 47)] {
            stroke.add_point(Point::new(x, y));
        }
        let points = stroke.points();
        let radius = 2.5 * COVERAGE_FACTOR;
        for y in -10..70 {
            for x in -10..80 {
                let scanned = points.iter().any(|p| {
                    let (dx, dy) = ((p.x - x) as f64, (p.y - y) as f64);
                    dx * dx + dy * dy < radius * radius
                });
                assert_eq!(stroke.covers(x, y), scanned, "({x}, {y})");
            }
        }
    }

    #[test]
    fn empty_pen_passes_through() {
        let pen = Pen::new(RED, 3.0);
        assert_eq!(pen.color_at(0, 0, WHITE), WHITE);
        assert!(pen.bounds().is_none());
        assert!(pen.stroke().is_empty());
    }

    #[test]
    fn repeated_points_are_ignored() {
        let pen = Pen::new(RED, 2.0);
        pen.add_point(Point::new(3, 3));
        pen.add_point(Point::new(3, 3));
        pen.add_point(Point::new(4, 3));
        assert_eq!(pen.points(), vec![Point::new(3, 3), Point::new(4, 3)]);
    }

    #[test]
    fn concurrent_append_and_query() {
        let pen = Pen::new(RED, 2.0);
        let stroke = pen.stroke();
        let writer = thread::spawn(move || {
            for x in 0..200 {
                stroke.add_point(Point::new(x * 3, 0));
            }
        });
        for _ in 0..200 {
            let _ = pen.color_at(30, 0, WHITE);
        }
        writer.join().unwrap();
        assert_eq!(pen.color_at(597, 0, WHITE), RED);
        assert_eq!(pen.points().len(), 200);
    }
}
