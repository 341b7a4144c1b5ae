//! Pixel buffers, annotation filters and compositing.
//!
//! This module defines the core drawing types used for screenshot annotation:
//! - [`Color`]: RGBA color representation with predefined color constants
//! - [`PixelBuffer`]: owned RGBA raster for captures and display caches
//! - [`Filter`]: the closed set of annotation shapes (arrows, lines, boxes, pen, text)
//! - [`Compositor`]: applies the ordered [`FilterStack`] to the captured image

pub mod color;
pub mod compositor;
pub mod filters;
pub mod font;
pub mod image;
pub mod stack;

// Re-export commonly used types at module level
pub use color::Color;
pub use compositor::Compositor;
pub use filters::Filter;
pub use font::{FontDescriptor, GlyphMask, PangoRasterizer, TextRasterizer};
pub use image::PixelBuffer;
pub use stack::FilterStack;

pub use color::{BLACK, BLUE, GREEN, ORANGE, PINK, RED, TRANSPARENT, WHITE, YELLOW};
