//! Data types for capture, encoding and sharing.

use std::path::PathBuf;
use thiserror::Error;

use crate::geometry::Rect;

/// Errors that can occur while capturing, encoding, saving or sharing a screenshot.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Capture region {0:?} is empty")]
    EmptyRegion(Rect),

    #[error("Capture returned {actual:?}, expected {requested:?}")]
    RegionMismatch { requested: Rect, actual: Rect },

    #[error("Failed to read or write image: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    Decode(String),

    #[error("Image encoding error: {0}")]
    Encode(String),

    #[error("Cairo error: {0}")]
    Cairo(#[from] cairo::Error),

    #[error("Sharing failed: {0}")]
    ShareFailed(String),
}

/// Status of the most recent share request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ShareStatus {
    /// Nothing shared yet, or status was reset.
    #[default]
    Idle,
    /// Encoding or delivery is running in the background.
    InProgress,
    /// Delivered; carries the location reported by the sink, if any.
    Delivered(Option<PathBuf>),
    /// Delivery failed.
    Failed(String),
}

impl ShareStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, ShareStatus::Delivered(_) | ShareStatus::Failed(_))
    }
}
