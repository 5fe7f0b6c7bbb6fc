/// High-level response after a surface acquisition error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; drop the current frame.
    SkipFrame,
    /// Unrecoverable (commonly out of memory).
    Fatal,
}
