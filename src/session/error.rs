use thiserror::Error;

use crate::draw::font::RasterizeError;
use crate::geometry::Rect;

/// Errors from interactive editing operations.
///
/// Every one of these is also reported through the status sink; none of them leaves the
/// filter stack or viewport in a changed state.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("Invalid {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Crop {0:?} leaves nothing of the screenshot")]
    EmptyCrop(Rect),

    #[error("No drag in progress")]
    NoActiveDrag,

    #[error("No text location selected")]
    MissingTextAnchor,

    #[error("Annotation limit of {0} reached")]
    FilterLimit(usize),

    #[error("Failed to render text: {0}")]
    Rasterize(#[from] RasterizeError),
}
