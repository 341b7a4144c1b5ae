//! Getting pixels in and out of an editing session.
//!
//! This module provides:
//! - [`CaptureSource`] collaborators that supply the screenshot region
//! - Deterministic PNG encoding of composed images
//! - File saving with configurable names
//! - Background sharing of image snapshots via [`ShareManager`]

pub mod file;
pub mod png;
pub mod source;
pub mod types;

mod share;
#[cfg(test)]
mod tests;

pub use file::{SaveTarget, default_name, save_image};
pub use png::{decode_png, encode_png};
pub use share::{FileSink, ShareManager, ShareSink};
pub use source::{CaptureSource, FileSource, start_session};
pub use types::{CaptureError, ShareStatus};
