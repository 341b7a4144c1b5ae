//! Text annotation placed from a pre-rasterized glyph mask.

use std::sync::Arc;

use crate::draw::color::Color;
use crate::draw::font::GlyphMask;
use crate::geometry::{Point, Rect};

/// Background box padding, as a fraction of the font size.
pub const BACKGROUND_PADDING_FACTOR: f64 = 0.15;

/// Text centered on an anchor point, with an optional background box.
#[derive(Debug, Clone)]
pub struct Text {
    anchor: Point,
    text: String,
    font_size: f64,
    mask: Arc<GlyphMask>,
    origin: Point,
    background_rect: Option<Rect>,
    pub color: Color,
    pub background: Color,
}

impl Text {
    pub fn new(
        anchor: Point,
        text: impl Into<String>,
        mask: GlyphMask,
        font_size: f64,
        color: Color,
        background: Color,
    ) -> Self {
        let origin = Point::new(anchor.x - mask.width() / 2, anchor.y - mask.height() / 2);
        let background_rect = (!mask.is_empty()).then(|| {
            let padding = (font_size.max(0.0) * BACKGROUND_PADDING_FACTOR).ceil() as i32;
            Rect::from_size(origin.x, origin.y, mask.width(), mask.height()).inflate(padding)
        });
        Self {
            anchor,
            text: text.into(),
            font_size,
            mask: Arc::new(mask),
            origin,
            background_rect,
            color,
            background,
        }
    }

    pub fn anchor(&self) -> Point {
        self.anchor
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    /// Inclusive area the annotation can paint, background box included.
    pub fn bounds(&self) -> Rect {
        match self.background_rect {
            Some(rect) => Rect::new(rect.min, rect.max - Point::new(1, 1)),
            None => Rect::new(self.anchor, self.anchor),
        }
    }

    pub fn color_at(&self, x: i32, y: i32, under: Color) -> Color {
        let Some(background_rect) = self.background_rect else {
            return under;
        };
        if !background_rect.contains(x, y) {
            return under;
        }
        let base = self.background.over(under);
        match self.mask.coverage(x - self.origin.x, y - self.origin.y) {
            0 => base,
            coverage => self.color.with_coverage(coverage).over(base),
        }
    }
}
