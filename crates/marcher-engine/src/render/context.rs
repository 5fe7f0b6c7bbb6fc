use crate::error::EngineResult;

/// Clear values applied at the start of every admitted frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClearValue {
    pub color: wgpu::Color,
    pub depth: f32,
}

impl ClearValue {
    /// Transparent black color, far-plane depth.
    pub const TRANSPARENT: Self = Self {
        color: wgpu::Color::TRANSPARENT,
        depth: 1.0,
    };
}

impl Default for ClearValue {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

/// Whether a frame target could be acquired.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameStatus {
    /// Targets are cleared and ready for drawing.
    Ready,
    /// The surface is transiently unavailable (lost, outdated, timed out);
    /// nothing can be drawn this frame.
    Unavailable,
}

/// Frame half of a graphics context: target acquisition, clearing, presentation.
pub trait RenderContext {
    /// Acquires the frame target and clears color and depth to `clear`.
    ///
    /// A frame left unfinished by a previous failure is discarded first.
    fn begin_frame(&mut self, clear: ClearValue) -> EngineResult<FrameStatus>;

    /// Submits and presents the frame started by `begin_frame`.
    fn end_frame(&mut self);
}
