//! Input subsystem.
//!
//! Public API is platform-agnostic; `platform` translates winit window events.
//! `InputCell` carries values from input handlers to render hooks.

mod cell;
pub mod platform;
mod state;
mod types;

pub use cell::InputCell;
pub use state::InputState;
pub use types::{
    InputEvent, Key, KeyState, Modifiers, MouseButton, MouseButtonState, PointerButtonEvent,
    TouchEvent, TouchPhase,
};
