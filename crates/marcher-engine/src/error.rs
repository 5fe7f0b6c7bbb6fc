use crate::resource::ShaderStage;

/// Errors surfaced by the engine core.
///
/// Every variant is fatal for the operation that produced it. Diagnostic text
/// from the shader compiler or linker is carried verbatim.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No usable graphics context could be created for the surface.
    #[error("graphics context is not supported: {0}")]
    UnsupportedContext(String),

    /// The configured frame rate is not a positive, finite number.
    #[error("target frame rate must be positive and finite, got {0}")]
    InvalidFrameRate(f64),

    /// A shader stage failed to compile.
    #[error("failed to compile {stage} shader `{name}`\n\n{log}")]
    Compile {
        stage: ShaderStage,
        name: String,
        log: String,
    },

    /// A program failed to link.
    #[error("failed to link program\n\n{log}")]
    Link { log: String },

    /// A value passed to hook registration is not a render hook.
    #[error("expected a `Box<dyn RenderHook<C>>`; box closures and hook structs as that trait object before erasing them")]
    InvalidHook,

    /// A buffer write falls outside the buffer or is misaligned.
    #[error("buffer write of {len} bytes at offset {offset} does not fit a {size}-byte buffer (4-byte alignment required)")]
    BufferWrite { offset: u64, len: u64, size: u64 },

    /// The surface is unrecoverable (commonly out of memory).
    #[error("surface error: {0}")]
    Surface(String),

    /// A render hook failed; the frame loop stops.
    #[error("render hook failed")]
    Hook(#[source] anyhow::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
