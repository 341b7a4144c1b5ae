//! Pointer input plumbing.
//!
//! This module holds the operation modes the editor switches between and the
//! coalescing event streams that keep drag and mouse-move bursts off the UI thread.

pub mod operation;
pub mod throttle;

// Re-export commonly used types at module level
pub use operation::Operation;
pub use throttle::EventStream;
