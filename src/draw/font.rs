//! Text rasterization for text annotations.
//!
//! Text filters never touch pango themselves: the editor asks a [`TextRasterizer`] for a
//! [`GlyphMask`] once, when the annotation is committed, and the filter composites that
//! coverage mask on every pixel query.

use thiserror::Error;

/// Font configuration for text rendering.
///
/// Describes which font to use, including family name, weight, and style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontDescriptor {
    /// Font family name (e.g., "Sans", "Monospace", "JetBrains Mono")
    pub family: String,

    /// Font weight (e.g., "normal", "bold", "light" or numeric 100-900)
    pub weight: String,

    /// Font style (e.g., "normal", "italic", "oblique")
    pub style: String,
}

impl Default for FontDescriptor {
    fn default() -> Self {
        Self {
            family: "Sans".to_string(),
            weight: "bold".to_string(),
            style: "normal".to_string(),
        }
    }
}

impl FontDescriptor {
    pub fn new(family: String, weight: String, style: String) -> Self {
        Self {
            family,
            weight,
            style,
        }
    }

    /// Pango description string without a size, e.g. "Sans Italic Bold".
    ///
    /// The size is applied separately in absolute pixels so a 24px annotation is 24
    /// image pixels tall regardless of the surface resolution.
    pub fn to_pango_string(&self) -> String {
        let mut parts = vec![self.family.clone()];
        for attribute in [&self.style, &self.weight] {
            if !attribute.eq_ignore_ascii_case("normal") && !attribute.is_empty() {
                parts.push(capitalize_first(attribute));
            }
        }
        parts.join(" ")
    }
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

/// 8-bit coverage mask produced by a [`TextRasterizer`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphMask {
    width: i32,
    height: i32,
    alpha: Vec<u8>,
}

impl GlyphMask {
    /// Wraps row-major coverage values; `None` if the length doesn't match the size.
    pub fn new(width: i32, height: i32, alpha: Vec<u8>) -> Option<Self> {
        if width < 0 || height < 0 || alpha.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            alpha,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Coverage at mask-local `(x, y)`; zero outside the mask.
    pub fn coverage(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return 0;
        }
        self.alpha[y as usize * self.width as usize + x as usize]
    }
}

#[derive(Debug, Error)]
pub enum RasterizeError {
    #[error("cairo error: {0}")]
    Cairo(#[from] cairo::Error),

    #[error("cannot read glyph surface: {0}")]
    Surface(#[from] cairo::BorrowError),
}

/// Turns a string into a coverage mask.
pub trait TextRasterizer: Send + Sync {
    fn rasterize(
        &self,
        text: &str,
        font: &FontDescriptor,
        size: f64,
    ) -> Result<GlyphMask, RasterizeError>;
}

/// Pango/cairo backed rasterizer.
#[derive(Debug, Default, Clone, Copy)]
pub struct PangoRasterizer;

impl PangoRasterizer {
    fn layout(ctx: &cairo::Context, text: &str, font: &FontDescriptor, size: f64) -> pango::Layout {
        let layout = pangocairo::functions::create_layout(ctx);
        let mut font_desc = pango::FontDescription::from_string(&font.to_pango_string());
        font_desc.set_absolute_size(size * pango::SCALE as f64);
        layout.set_font_description(Some(&font_desc));
        layout.set_text(text);
        layout
    }
}

impl TextRasterizer for PangoRasterizer {
    fn rasterize(
        &self,
        text: &str,
        font: &FontDescriptor,
        size: f64,
    ) -> Result<GlyphMask, RasterizeError> {
        // Measure on a scratch surface first; the ink rect may start at negative offsets
        // for italic glyphs.
        let scratch = cairo::ImageSurface::create(cairo::Format::A8, 1, 1)?;
        let ink = {
            let ctx = cairo::Context::new(&scratch)?;
            let (ink, _logical) = Self::layout(&ctx, text, font, size).pixel_extents();
            ink
        };
        if ink.width() <= 0 || ink.height() <= 0 {
            log::debug!("text {:?} has no ink, using empty mask", text);
            return Ok(GlyphMask::default());
        }

        let width = ink.width() + 2;
        let height = ink.height() + 2;
        let mut surface = cairo::ImageSurface::create(cairo::Format::A8, width, height)?;
        {
            let ctx = cairo::Context::new(&surface)?;
            ctx.set_antialias(cairo::Antialias::Gray);
            let layout = Self::layout(&ctx, text, font, size);
            ctx.move_to(1.0 - ink.x() as f64, 1.0 - ink.y() as f64);
            ctx.set_source_rgba(0.0, 0.0, 0.0, 1.0);
            pangocairo::functions::show_layout(&ctx, &layout);
        }
        surface.flush();

        let stride = surface.stride() as usize;
        let data = surface.data()?;
        let mut alpha = Vec::with_capacity(width as usize * height as usize);
        for row in data.chunks(stride).take(height as usize) {
            alpha.extend_from_slice(&row[..width as usize]);
        }
        log::debug!(
            "rasterized text {:?} at {}px into {}x{} mask",
            text,
            size,
            width,
            height
        );
        Ok(GlyphMask {
            width,
            height,
            alpha,
        })
    }
}
