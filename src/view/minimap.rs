//! Whole-image thumbnail with an outline of the visible viewport area.

use log::debug;

use super::background::checker;
use super::viewport::round_half_up;
use crate::draw::color::VIEWPORT_INDICATOR;
use crate::draw::image::PixelBuffer;
use crate::geometry::{Point, Rect};

/// Letterboxed thumbnail of the composed image.
///
/// Geometry derives from the minimap's own display size and the composed image size;
/// it is recomputed whenever either changes.
#[derive(Debug)]
pub struct Minimap {
    width: i32,
    height: i32,
    image_width: i32,
    image_height: i32,
    /// Image pixels per thumbnail pixel.
    zoom: f64,
    thumb: Rect,
    cache: PixelBuffer,
}

impl Minimap {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width: width.max(0),
            height: height.max(0),
            image_width: 0,
            image_height: 0,
            zoom: 1.0,
            thumb: Rect::default(),
            cache: PixelBuffer::default(),
        }
    }

    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// Placement of the scaled image inside the minimap area.
    pub fn thumb(&self) -> Rect {
        self.thumb
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn cache(&self) -> &PixelBuffer {
        &self.cache
    }

    pub fn resize(&mut self, width: i32, height: i32) {
        self.width = width.max(0);
        self.height = height.max(0);
        self.refresh_geometry(self.image_width, self.image_height);
    }

    /// Fits an `image_width` x `image_height` image: the more constraining axis fills
    /// the minimap edge to edge and the other one is centered.
    pub fn refresh_geometry(&mut self, image_width: i32, image_height: i32) {
        self.image_width = image_width;
        self.image_height = image_height;
        if self.width <= 0 || self.height <= 0 || image_width <= 0 || image_height <= 0 {
            self.zoom = 1.0;
            self.thumb = Rect::default();
            return;
        }
        let zoom_x = image_width as f64 / self.width as f64;
        let zoom_y = image_height as f64 / self.height as f64;
        self.thumb = if zoom_y > zoom_x {
            self.zoom = zoom_y;
            let thumb_width = (image_width as f64 / zoom_y).round() as i32;
            Rect::from_size((self.width - thumb_width) / 2, 0, thumb_width, self.height)
        } else {
            self.zoom = zoom_x;
            let thumb_height = (image_height as f64 / zoom_x).round() as i32;
            Rect::from_size(0, (self.height - thumb_height) / 2, self.width, thumb_height)
        };
        debug!(
            "minimap {}x{}: image {}x{} -> thumb {:?} (zoom {:.3})",
            self.width, self.height, image_width, image_height, self.thumb, self.zoom
        );
    }

    /// Viewport outline in minimap pixels, clipped to the thumbnail and never thinner
    /// than one pixel.
    pub fn viewport_indicator(&self, view: Rect) -> Rect {
        let thumb = self.thumb;
        let (x, width) = indicator_axis(
            view.min.x,
            view.width(),
            self.image_width,
            thumb.min.x,
            thumb.width(),
        );
        let (y, height) = indicator_axis(
            view.min.y,
            view.height(),
            self.image_height,
            thumb.min.y,
            thumb.height(),
        );
        Rect::from_size(x, y, width, height)
    }

    /// Pan offset centering a viewport of `view_size` on the image pixel under the
    /// minimap position `pos`.
    pub fn pan_target(&self, pos: (f64, f64), view_size: (i32, i32)) -> Point {
        let thumb = self.thumb;
        let ratio_x = (pos.0 - thumb.min.x as f64) / thumb.width().max(1) as f64;
        let ratio_y = (pos.1 - thumb.min.y as f64) / thumb.height().max(1) as f64;
        Point::new(
            round_half_up(ratio_x * self.image_width as f64 - view_size.0 as f64 / 2.0),
            round_half_up(ratio_y * self.image_height as f64 - view_size.1 as f64 / 2.0),
        )
    }

    /// Re-samples `composed` into the thumbnail cache and outlines `view`.
    pub fn render(&mut self, composed: &PixelBuffer, view: Rect) {
        if composed.size() != (self.image_width, self.image_height) {
            self.refresh_geometry(composed.width(), composed.height());
        }
        if self.cache.size() != (self.width, self.height) {
            self.cache = PixelBuffer::new(self.width, self.height);
        }
        let thumb = self.thumb;
        let zoom = self.zoom;
        let cache = &mut self.cache;
        for y in 0..cache.height() {
            for x in 0..cache.width() {
                let sample = if thumb.contains(x, y) {
                    let source_x = round_half_up((x - thumb.min.x) as f64 * zoom);
                    let source_y = round_half_up((y - thumb.min.y) as f64 * zoom);
                    composed.get(source_x, source_y)
                } else {
                    None
                };
                cache.put(x, y, sample.unwrap_or_else(|| checker(x, y)));
            }
        }

        if thumb.is_empty() {
            return;
        }
        let indicator = self.viewport_indicator(view);
        let (right, bottom) = (indicator.max.x - 1, indicator.max.y - 1);
        for x in indicator.min.x..indicator.max.x {
            self.cache.put(x, indicator.min.y, VIEWPORT_INDICATOR);
            self.cache.put(x, bottom, VIEWPORT_INDICATOR);
        }
        for y in indicator.min.y..indicator.max.y {
            self.cache.put(indicator.min.x, y, VIEWPORT_INDICATOR);
            self.cache.put(right, y, VIEWPORT_INDICATOR);
        }
    }
}

/// Maps one axis of the viewport through the fit transform and clips it to the thumb.
fn indicator_axis(
    view_pos: i32,
    view_len: i32,
    image_len: i32,
    thumb_pos: i32,
    thumb_len: i32,
) -> (i32, i32) {
    let image_len = image_len.max(1) as f64;
    let mut pos = thumb_pos + (view_pos as f64 / image_len * thumb_len as f64).round() as i32;
    let mut len = (view_len as f64 / image_len * thumb_len as f64).round() as i32;
    let thumb_end = thumb_pos + thumb_len;
    if pos < thumb_pos {
        len -= thumb_pos - pos;
        pos = thumb_pos;
    }
    if pos > thumb_end - 1 {
        pos = thumb_end - 1;
    }
    if pos + len > thumb_end {
        len = thumb_end - pos;
    }
    (pos, len.max(1))
}
