//! Core engine-facing contracts.
//!
//! `Renderer` is the frame-throttled driver: it owns the graphics context,
//! the frame clock and the hook dispatcher, and reschedules itself through a
//! [`FrameHost`]. `App` is what the windowed runtime calls into.

mod app;
mod host;
mod renderer;

pub use app::{App, AppControl};
pub use host::{FrameHost, StopSignal};
pub use renderer::{Renderer, RendererConfig, StepOutcome};
