//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, and drives the renderer from redraw
//! requests.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
