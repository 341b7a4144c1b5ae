//! Display geometry: the zoomed/panned viewport and the minimap.
//!
//! Both keep an owned display cache that is re-sampled from the composed screenshot
//! after every compositor pass, and both paint the [`background::checker`] pattern where
//! no image data exists.

pub mod background;
pub mod minimap;
pub mod viewport;

pub use minimap::Minimap;
pub use viewport::{MAX_LOG2_ZOOM, MIN_LOG2_ZOOM, ViewMapping, Viewport};
