//! Zoomed and panned window onto the composed screenshot.
//!
//! Coordinates:
//! - display: pixels of the viewport widget, `(0, 0)` top-left
//! - view/source: crop-relative pixels of the composed image
//!
//! The scale is `2^(-log2_zoom)` source pixels per display pixel, so a positive
//! `log2_zoom` magnifies. Display pixel `x` shows source pixel
//! `round(x * scale) + view_x`.

use log::debug;

use super::background::checker;
use crate::draw::image::PixelBuffer;
use crate::geometry::{Point, Rect};

pub const MIN_LOG2_ZOOM: f64 = -8.0;
pub const MAX_LOG2_ZOOM: f64 = 8.0;

/// `int(v + 0.5)` with floor semantics for negative values.
pub(crate) fn round_half_up(v: f64) -> i32 {
    (v + 0.5).floor() as i32
}

/// Display-to-source mapping frozen at one instant.
///
/// `Copy` so background input tasks can translate pointer positions without touching
/// the viewport itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewMapping {
    pub display_width: i32,
    pub display_height: i32,
    pub view: Rect,
}

impl ViewMapping {
    /// Crop-relative source pixel under display position `pos`.
    pub fn to_source(&self, pos: (f64, f64)) -> Point {
        let ratio_x = pos.0 / self.display_width.max(1) as f64;
        let ratio_y = pos.1 / self.display_height.max(1) as f64;
        Point::new(
            round_half_up(ratio_x * self.view.width() as f64 + self.view.min.x as f64),
            round_half_up(ratio_y * self.view.height() as f64 + self.view.min.y as f64),
        )
    }
}

#[derive(Debug)]
pub struct Viewport {
    log2_zoom: f64,
    view_x: i32,
    view_y: i32,
    view_width: i32,
    view_height: i32,
    display_width: i32,
    display_height: i32,
    pan_origin: Option<Point>,
    cache: PixelBuffer,
}

impl Viewport {
    pub fn new(display_width: i32, display_height: i32, log2_zoom: f64) -> Self {
        let mut viewport = Self {
            log2_zoom: log2_zoom.clamp(MIN_LOG2_ZOOM, MAX_LOG2_ZOOM),
            view_x: 0,
            view_y: 0,
            view_width: 0,
            view_height: 0,
            display_width: display_width.max(0),
            display_height: display_height.max(0),
            pan_origin: None,
            cache: PixelBuffer::default(),
        };
        viewport.update_view_size();
        viewport
    }

    pub fn log2_zoom(&self) -> f64 {
        self.log2_zoom
    }

    /// Source pixels per display pixel.
    pub fn scale(&self) -> f64 {
        (-self.log2_zoom).exp2()
    }

    pub fn display_size(&self) -> (i32, i32) {
        (self.display_width, self.display_height)
    }

    /// Visible area in crop-relative source pixels; may extend past the image.
    pub fn view_rect(&self) -> Rect {
        Rect::from_size(self.view_x, self.view_y, self.view_width, self.view_height)
    }

    pub fn pan(&self) -> Point {
        Point::new(self.view_x, self.view_y)
    }

    pub fn set_pan(&mut self, pan: Point) {
        self.view_x = pan.x;
        self.view_y = pan.y;
    }

    pub fn mapping(&self) -> ViewMapping {
        ViewMapping {
            display_width: self.display_width,
            display_height: self.display_height,
            view: self.view_rect(),
        }
    }

    pub fn cache(&self) -> &PixelBuffer {
        &self.cache
    }

    fn update_view_size(&mut self) {
        let scale = self.scale();
        self.view_width = round_half_up(self.display_width as f64 * scale);
        self.view_height = round_half_up(self.display_height as f64 * scale);
    }

    /// New display size; the cache is reallocated on the next render.
    pub fn resize(&mut self, display_width: i32, display_height: i32) {
        self.display_width = display_width.max(0);
        self.display_height = display_height.max(0);
        self.update_view_size();
        debug!(
            "viewport resized to {}x{}, view {:?}",
            self.display_width,
            self.display_height,
            self.view_rect()
        );
    }

    /// Sets the zoom level, keeping the top-left pan offset.
    pub fn set_log2_zoom(&mut self, log2_zoom: f64) {
        self.log2_zoom = log2_zoom.clamp(MIN_LOG2_ZOOM, MAX_LOG2_ZOOM);
        self.update_view_size();
    }

    /// Zooms around the display position `pos`, keeping the source pixel under the
    /// cursor in place. `sensitivity` is the scroll amount per log2 step.
    pub fn scroll(&mut self, pos: (f64, f64), delta_y: f64, sensitivity: f64) {
        let ratio_x = pos.0 / self.display_width.max(1) as f64;
        let ratio_y = pos.1 / self.display_height.max(1) as f64;
        let anchor = self.mapping().to_source(pos);

        self.set_log2_zoom(self.log2_zoom + delta_y / sensitivity.max(f64::EPSILON));

        self.view_x = anchor.x - round_half_up(ratio_x * self.view_width as f64);
        self.view_y = anchor.y - round_half_up(ratio_y * self.view_height as f64);
        debug!(
            "scroll: log2_zoom={:.2} view={:?} anchored at {:?}",
            self.log2_zoom,
            self.view_rect(),
            anchor
        );
    }

    /// Records the pan offset at the start of a pan drag.
    pub fn begin_pan(&mut self) {
        self.pan_origin = Some(self.pan());
    }

    /// Pans relative to the offset recorded by [`Viewport::begin_pan`], given the total
    /// display-space drag distance so far.
    pub fn pan_to(&mut self, delta: (f64, f64)) {
        let origin = *self.pan_origin.get_or_insert(Point::new(self.view_x, self.view_y));
        let dx = delta.0 / self.display_width.max(1) as f64 * self.view_width as f64;
        let dy = delta.1 / self.display_height.max(1) as f64 * self.view_height as f64;
        self.view_x = origin.x - round_half_up(dx);
        self.view_y = origin.y - round_half_up(dy);
    }

    pub fn end_pan(&mut self) {
        self.pan_origin = None;
    }

    pub fn is_panning(&self) -> bool {
        self.pan_origin.is_some()
    }

    /// Centers axes where the image is narrower than the visible area.
    pub fn center_small_image(&mut self, image_width: i32, image_height: i32) {
        if image_width < self.view_width {
            self.view_x = -(self.view_width - image_width) / 2;
        }
        if image_height < self.view_height {
            self.view_y = -(self.view_height - image_height) / 2;
        }
    }

    /// Re-samples `composed` into the display cache.
    pub fn render(&mut self, composed: &PixelBuffer) {
        if self.cache.size() != (self.display_width, self.display_height) {
            self.cache = PixelBuffer::new(self.display_width, self.display_height);
        }
        let scale = self.scale();
        let (view_x, view_y) = (self.view_x, self.view_y);
        let cache = &mut self.cache;
        for y in 0..cache.height() {
            let source_y = (y as f64 * scale).round() as i32 + view_y;
            for x in 0..cache.width() {
                let source_x = (x as f64 * scale).round() as i32 + view_x;
                let color = composed
                    .get(source_x, source_y)
                    .unwrap_or_else(|| checker(x, y));
                cache.put(x, y, color);
            }
        }
    }
}
