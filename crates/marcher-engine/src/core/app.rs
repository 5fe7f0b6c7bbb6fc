use crate::device::GpuContext;
use crate::input::{InputEvent, InputState};

use super::renderer::Renderer;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by programs driven by the windowed runtime.
///
/// Per-frame work is registered as render hooks during `setup`; the runtime
/// owns the loop and calls back only for setup and input.
pub trait App {
    /// Called once the window and graphics context exist, before the first frame.
    fn setup(&mut self, renderer: &mut Renderer<GpuContext>) -> anyhow::Result<()>;

    /// Called for every translated input event, after `input` has absorbed it.
    fn on_input(
        &mut self,
        event: &InputEvent,
        input: &InputState,
        renderer: &mut Renderer<GpuContext>,
    ) -> AppControl {
        let _ = (event, input, renderer);
        AppControl::Continue
    }
}
