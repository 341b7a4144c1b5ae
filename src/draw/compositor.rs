//! Applies the filter stack to the captured screenshot.

use std::sync::Arc;
use std::time::Instant;

use log::debug;

use super::color::Color;
use super::filters::Filter;
use super::image::PixelBuffer;
use super::stack::FilterStack;
use crate::geometry::{Point, Rect};

/// Owns the original capture, the crop rectangle, the filter stack and the composed
/// result.
///
/// Filters are expressed in full-image coordinates; the composed buffer is crop-relative,
/// so composed pixel `(x, y)` shows original pixel `crop.min + (x, y)`.
#[derive(Debug)]
pub struct Compositor {
    original: PixelBuffer,
    crop: Rect,
    stack: FilterStack,
    composed: Arc<PixelBuffer>,
}

impl Compositor {
    /// Starts with the crop covering the whole capture and an up-to-date composed buffer.
    pub fn new(original: PixelBuffer, max_filters: usize) -> Self {
        let crop = original.bounds();
        let mut compositor = Self {
            original,
            crop,
            stack: FilterStack::new(max_filters),
            composed: Arc::new(PixelBuffer::default()),
        };
        compositor.apply_filters(true, Rect::default());
        compositor
    }

    pub fn original(&self) -> &PixelBuffer {
        &self.original
    }

    pub fn crop(&self) -> Rect {
        self.crop
    }

    pub fn stack(&self) -> &FilterStack {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut FilterStack {
        &mut self.stack
    }

    pub fn composed(&self) -> &PixelBuffer {
        &self.composed
    }

    /// Immutable view of the composed image as of now.
    ///
    /// Later edits copy the buffer instead of mutating what the snapshot sees.
    pub fn snapshot(&self) -> Arc<PixelBuffer> {
        Arc::clone(&self.composed)
    }

    /// Recomputes the composed buffer.
    ///
    /// With `full == false` only `visible` (crop-relative) is refreshed; the rest of the
    /// buffer is left stale until the next full pass. A crop size change always forces a
    /// full pass. Returns whether the pass was full.
    pub fn apply_filters(&mut self, full: bool, visible: Rect) -> bool {
        let started = Instant::now();
        let (width, height) = (self.crop.width(), self.crop.height());
        let mut full = full;
        if self.composed.size() != (width, height) {
            debug!(
                "composed buffer resized {:?} -> {}x{}",
                self.composed.size(),
                width,
                height
            );
            self.composed = Arc::new(PixelBuffer::new(width, height));
            full = true;
        }

        let bounds = Rect::from_size(0, 0, width, height);
        let target = if full {
            Some(bounds)
        } else {
            visible.canon().intersect(bounds)
        };
        let Some(target) = target else {
            debug!("apply_filters: visible area {:?} outside the crop", visible);
            return full;
        };

        let offset = self.crop.min;
        let region = target.translate(offset);
        // Skip filters that cannot touch this region. Filter bounds are inclusive and
        // `region` is half-open, hence the one pixel of slack.
        let active: Vec<&Filter> = self
            .stack
            .iter()
            .filter(|filter| {
                filter
                    .bounds()
                    .is_some_and(|b| b.inflate(1).intersect(region).is_some())
            })
            .collect();

        let original = &self.original;
        let composed = Arc::make_mut(&mut self.composed);
        for y in target.min.y..target.max.y {
            for x in target.min.x..target.max.x {
                let source = Point::new(x + offset.x, y + offset.y);
                let base = original.get(source.x, source.y).unwrap_or_default();
                let color = active
                    .iter()
                    .fold(base, |under: Color, filter| {
                        filter.color_at(source.x, source.y, under)
                    });
                composed.put(x, y, color);
            }
        }

        debug!(
            "apply_filters(full={}): {}x{} px, {}/{} filters in {:?}",
            full,
            target.width(),
            target.height(),
            active.len(),
            self.stack.len(),
            started.elapsed()
        );
        full
    }

    /// Adds a filter on top and recomposes everything.
    ///
    /// Hands the filter back when the stack limit is reached.
    pub fn push(&mut self, filter: Filter) -> Result<(), Filter> {
        self.stack.try_push(filter)?;
        self.apply_filters(true, Rect::default());
        Ok(())
    }

    /// Removes the last filter and recomposes. No-op on an empty stack.
    pub fn undo(&mut self) -> Option<Filter> {
        let removed = self.stack.undo()?;
        debug!("undo: removed {}", removed.kind_name());
        self.apply_filters(true, Rect::default());
        Some(removed)
    }

    /// Moves the crop rectangle, clamped to the capture.
    ///
    /// Returns the crop actually applied, or `None` (and no change) when nothing of the
    /// capture would remain.
    pub fn set_crop(&mut self, crop: Rect) -> Option<Rect> {
        let clamped = crop.canon().intersect(self.original.bounds())?;
        if clamped != self.crop {
            debug!("crop {:?} -> {:?}", self.crop, clamped);
            self.crop = clamped;
        }
        self.apply_filters(true, Rect::default());
        Some(clamped)
    }

    /// Restores the crop to the full capture and returns the previous crop.
    pub fn reset_crop(&mut self) -> Rect {
        let previous = self.crop;
        self.crop = self.original.bounds();
        self.apply_filters(true, Rect::default());
        previous
    }
}
