//! Screenshot cropping and annotation engine.
//!
//! The pieces, bottom-up:
//! - [`geometry`] and [`draw`]: pixel buffers, annotation filters and the compositor that
//!   re-applies the filter stack over the captured image
//! - [`view`]: zoomed/panned viewport and minimap geometry and their display caches
//! - [`input`]: editing operations and coalescing pointer event streams
//! - [`session`]: the interactive [`session::Editor`] tying it all together
//! - [`capture`]: capture sources, PNG encoding, saving and background sharing
//! - [`config`] and [`script`]: user settings and non-interactive annotation lists

pub mod capture;
pub mod config;
pub mod draw;
pub mod geometry;
pub mod input;
pub mod script;
pub mod session;
pub mod util;
pub mod view;

pub use config::Config;
