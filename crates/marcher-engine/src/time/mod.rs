//! Time subsystem.
//!
//! Frame throttling and the simulation time base, decoupled from the runtime:
//! - `FrameClock` decides which host callbacks become frames
//! - `TimeSource` supplies the timestamps it is polled with

mod frame_clock;
mod source;

pub use frame_clock::{FrameClock, FramePoll, FrameTime};
pub use source::{ManualTime, MonotonicTime, TimeSource};
