//! PNG encoding and decoding of [`PixelBuffer`]s through cairo image surfaces.
//!
//! Cairo stores premultiplied native-endian ARGB32; the buffers here are straight RGBA8,
//! so both directions convert per pixel.

use std::io::Cursor;

use cairo::{Format, ImageSurface};

use super::types::CaptureError;
use crate::draw::{Color, PixelBuffer};

/// Encodes `image` as PNG bytes. Equal buffers always produce equal bytes.
pub fn encode_png(image: &PixelBuffer) -> Result<Vec<u8>, CaptureError> {
    if image.is_empty() {
        return Err(CaptureError::Encode("cannot encode an empty image".into()));
    }

    let mut surface = ImageSurface::create(Format::ARgb32, image.width(), image.height())?;
    let stride = surface.stride() as usize;
    {
        let mut data = surface
            .data()
            .map_err(|e| CaptureError::Encode(format!("surface data unavailable: {e}")))?;
        for y in 0..image.height() {
            let row = y as usize * stride;
            for x in 0..image.width() {
                let color = image.get(x, y).unwrap_or_default();
                let offset = row + x as usize * 4;
                data[offset..offset + 4].copy_from_slice(&premultiplied_argb(color));
            }
        }
    }

    let mut bytes = Vec::new();
    surface
        .write_to_png(&mut bytes)
        .map_err(|e| CaptureError::Encode(e.to_string()))?;
    log::debug!(
        "Encoded {}x{} image to {} PNG bytes",
        image.width(),
        image.height(),
        bytes.len()
    );
    Ok(bytes)
}

/// Decodes PNG bytes into a straight-alpha [`PixelBuffer`].
pub fn decode_png(bytes: &[u8]) -> Result<PixelBuffer, CaptureError> {
    let mut reader = Cursor::new(bytes);
    let mut surface = ImageSurface::create_from_png(&mut reader)
        .map_err(|e| CaptureError::Decode(e.to_string()))?;

    let format = surface.format();
    let width = surface.width();
    let height = surface.height();
    let stride = surface.stride() as usize;
    let data = surface
        .data()
        .map_err(|e| CaptureError::Decode(format!("surface data unavailable: {e}")))?;

    let decode_pixel: fn(&[u8]) -> Color = match format {
        Format::ARgb32 => unpremultiplied_argb,
        Format::Rgb24 => opaque_rgb,
        other => {
            return Err(CaptureError::Decode(format!(
                "unsupported surface format {other:?}"
            )));
        }
    };

    Ok(PixelBuffer::from_fn(width, height, |x, y| {
        let offset = y as usize * stride + x as usize * 4;
        decode_pixel(&data[offset..offset + 4])
    }))
}

fn premultiplied_argb(color: Color) -> [u8; 4] {
    let scale = |channel: u8| ((channel as u32 * color.a as u32 + 127) / 255) as u8;
    let argb = u32::from_be_bytes([color.a, scale(color.r), scale(color.g), scale(color.b)]);
    argb.to_ne_bytes()
}

fn unpremultiplied_argb(bytes: &[u8]) -> Color {
    let [a, r, g, b] = u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]).to_be_bytes();
    if a == 0 {
        return Color::new(0, 0, 0, 0);
    }
    let unscale = |channel: u8| ((channel as u32 * 255 + a as u32 / 2) / a as u32).min(255) as u8;
    Color::new(unscale(r), unscale(g), unscale(b), a)
}

fn opaque_rgb(bytes: &[u8]) -> Color {
    let [_, r, g, b] = u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]).to_be_bytes();
    Color::rgb(r, g, b)
}
