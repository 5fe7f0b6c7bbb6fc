//! Marcher engine crate.
//!
//! A frame-throttled rendering engine: a resource factory over wgpu, a frame
//! clock, a render-hook dispatcher and a driver that reschedules itself
//! through the host's next-frame primitive.

pub mod core;
pub mod device;
pub mod error;
pub mod input;
pub mod logging;
pub mod render;
pub mod resource;
pub mod time;
pub mod window;

#[cfg(test)]
mod testing;

pub use crate::core::{App, AppControl, FrameHost, Renderer, RendererConfig, StepOutcome, StopSignal};
pub use crate::error::{EngineError, EngineResult};
