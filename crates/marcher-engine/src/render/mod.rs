//! Frame dispatch.
//!
//! Every admitted frame clears the context's targets and runs the registered
//! render hooks in order. Hooks own their GPU resources and issue the draws.

mod context;
mod dispatcher;
mod hook;

pub use context::{ClearValue, FrameStatus, RenderContext};
pub use dispatcher::RenderDispatcher;
pub use hook::RenderHook;
