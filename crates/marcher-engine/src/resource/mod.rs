//! GPU resource creation.
//!
//! `ResourceFactory` validates and shapes errors; a `ResourceBackend` performs
//! the raw API calls. `wgsl` holds the CPU-side shader front-end shared by
//! every backend.

mod backend;
mod factory;
mod source;
mod types;
pub mod wgsl;

pub use backend::ResourceBackend;
pub use factory::ResourceFactory;
pub use source::{ShaderSourceProvider, ShaderSources};
pub use types::{BufferUsage, ShaderStage, VertexAttribute, ATTRIBUTE_COMPONENTS, ATTRIBUTE_STRIDE};
