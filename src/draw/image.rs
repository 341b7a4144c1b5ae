//! Owned RGBA8 pixel buffers.

use super::color::Color;
use crate::geometry::{Point, Rect};

const BYTES_PER_PIXEL: usize = 4;

/// Row-major RGBA raster whose top-left pixel is `(0, 0)`.
///
/// Used for the captured screenshot, the composed screenshot and the viewport/minimap
/// display caches. Buffers never resize in place; a size change allocates a new one.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: i32,
    height: i32,
    pixels: Vec<u8>,
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

impl Default for PixelBuffer {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl PixelBuffer {
    /// Allocates a transparent buffer. Negative dimensions are treated as zero.
    pub fn new(width: i32, height: i32) -> Self {
        Self::filled(width, height, Color::default())
    }

    /// Allocates a buffer painted with `color`.
    pub fn filled(width: i32, height: i32, color: Color) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let pixels = color
            .to_array()
            .repeat(width as usize * height as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Wraps raw RGBA bytes. Returns `None` when the length doesn't match the size.
    pub fn from_rgba(width: i32, height: i32, pixels: Vec<u8>) -> Option<Self> {
        if width < 0 || height < 0 {
            return None;
        }
        if pixels.len() != width as usize * height as usize * BYTES_PER_PIXEL {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Builds a buffer by evaluating `f` for every pixel.
    pub fn from_fn(width: i32, height: i32, mut f: impl FnMut(i32, i32) -> Color) -> Self {
        let mut buffer = Self::new(width, height);
        for y in 0..buffer.height {
            for x in 0..buffer.width {
                buffer.put(x, y, f(x, y));
            }
        }
        buffer
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// Bounds as a rectangle anchored at the origin.
    pub fn bounds(&self) -> Rect {
        Rect::new(Point::ORIGIN, Point::new(self.width, self.height))
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Raw RGBA bytes, row-major, no padding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            None
        } else {
            Some((y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL)
        }
    }

    /// Color at `(x, y)`, or `None` outside the buffer.
    pub fn get(&self, x: i32, y: i32) -> Option<Color> {
        self.offset(x, y).map(|i| {
            Color::new(
                self.pixels[i],
                self.pixels[i + 1],
                self.pixels[i + 2],
                self.pixels[i + 3],
            )
        })
    }

    /// Writes `color` at `(x, y)`; writes outside the buffer are ignored.
    pub fn put(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.offset(x, y) {
            self.pixels[i..i + BYTES_PER_PIXEL].copy_from_slice(&color.to_array());
        }
    }

    /// Copies `rect` (in this buffer's coordinates) into a new buffer.
    ///
    /// Parts of `rect` outside this buffer come out transparent.
    pub fn sub_image(&self, rect: Rect) -> PixelBuffer {
        let rect = rect.canon();
        PixelBuffer::from_fn(rect.width(), rect.height(), |x, y| {
            self.get(rect.min.x + x, rect.min.y + y)
                .unwrap_or_default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::{BLUE, RED};

    #[test]
    fn get_and_put_respect_bounds() {
        let mut buffer = PixelBuffer::new(4, 3);
        buffer.put(3, 2, RED);
        buffer.put(4, 2, BLUE);
        buffer.put(-1, 0, BLUE);
        assert_eq!(buffer.get(3, 2), Some(RED));
        assert_eq!(buffer.get(4, 2), None);
        assert_eq!(buffer.get(0, 0), Some(Color::default()));
        assert_eq!(buffer.as_bytes().len(), 4 * 3 * 4);
    }

    #[test]
    fn from_rgba_validates_length() {
        assert!(PixelBuffer::from_rgba(2, 2, vec![0; 16]).is_some());
        assert!(PixelBuffer::from_rgba(2, 2, vec![0; 15]).is_none());
        assert!(PixelBuffer::from_rgba(-1, 2, Vec::new()).is_none());
    }

    #[test]
    fn sub_image_pads_outside_with_transparent() {
        let buffer = PixelBuffer::filled(4, 4, RED);
        let sub = buffer.sub_image(Rect::from_coords(2, 2, 6, 5));
        assert_eq!(sub.size(), (4, 3));
        assert_eq!(sub.get(1, 1), Some(RED));
        assert_eq!(sub.get(2, 0), Some(Color::default()));
    }
}
