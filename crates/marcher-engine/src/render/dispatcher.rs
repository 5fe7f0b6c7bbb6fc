use std::any::Any;

use crate::error::{EngineError, EngineResult};
use crate::time::FrameTime;

use super::context::{ClearValue, FrameStatus, RenderContext};
use super::hook::RenderHook;

/// Append-only registry of render hooks.
///
/// There is no removal API. Hooks cannot register other hooks while a frame
/// is being dispatched; the registry is mutably borrowed for its duration.
pub struct RenderDispatcher<C> {
    hooks: Vec<Box<dyn RenderHook<C>>>,
    clear: ClearValue,
}

impl<C> Default for RenderDispatcher<C> {
    fn default() -> Self {
        Self {
            hooks: Vec::new(),
            clear: ClearValue::TRANSPARENT,
        }
    }
}

impl<C: RenderContext + 'static> RenderDispatcher<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `hook`. Duplicates are not detected.
    pub fn add_render_hook<H>(&mut self, hook: H)
    where
        H: RenderHook<C> + 'static,
    {
        self.hooks.push(Box::new(hook));
    }

    /// Registers a type-erased hook.
    ///
    /// The value must be a `Box<dyn RenderHook<C>>`; anything else is rejected
    /// with [`EngineError::InvalidHook`] and the registry is left untouched.
    /// A closure boxed directly is its own concrete type, so it must be boxed
    /// as the trait object first.
    pub fn try_add_render_hook(&mut self, hook: Box<dyn Any>) -> EngineResult<()> {
        match hook.downcast::<Box<dyn RenderHook<C>>>() {
            Ok(hook) => {
                self.hooks.push(*hook);
                Ok(())
            }
            Err(_) => Err(EngineError::InvalidHook),
        }
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Clears the targets, runs every hook in order, then ends the frame.
    ///
    /// When the surface is unavailable no hook runs.
    pub fn dispatch(&mut self, ctx: &mut C, frame: &FrameTime) -> EngineResult<FrameStatus> {
        let status = ctx.begin_frame(self.clear)?;
        if status == FrameStatus::Unavailable {
            return Ok(status);
        }

        for hook in &mut self.hooks {
            hook.render(ctx, frame).map_err(EngineError::Hook)?;
        }

        ctx.end_frame();
        Ok(status)
    }
}
