//! Interactive editing session.
//!
//! An [`Editor`] owns the compositor, the viewport and minimap geometry, the current tool
//! and the per-interaction event streams. Hosts feed it pointer events and text input;
//! it reports outcomes through a [`StatusSink`] and explicit `Result`s.

mod editor;
mod error;
mod status;

pub use editor::{
    BACKGROUND_COLOR_KEY, DEFAULT_PATH_KEY, DRAWING_COLOR_KEY, DisplayPos, DrawingSettings,
    Editor, FONT_SIZE_KEY, LOG2_ZOOM_KEY, THICKNESS_KEY,
};
pub use error::EditError;
pub use status::{LogStatus, RecordingStatus, StatusSink};
