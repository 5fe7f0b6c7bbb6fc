use crate::time::FrameTime;

/// Per-frame consumer of the graphics context.
///
/// Hooks run once per admitted frame, after the targets are cleared, in
/// registration order. An error aborts the frame and stops the loop.
pub trait RenderHook<C> {
    fn render(&mut self, ctx: &mut C, frame: &FrameTime) -> anyhow::Result<()>;
}

impl<C, F> RenderHook<C> for F
where
    F: FnMut(&mut C, &FrameTime) -> anyhow::Result<()>,
{
    fn render(&mut self, ctx: &mut C, frame: &FrameTime) -> anyhow::Result<()> {
        self(ctx, frame)
    }
}
