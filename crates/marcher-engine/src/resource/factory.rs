use std::borrow::Cow;

use crate::error::{EngineError, EngineResult};

use super::backend::ResourceBackend;
use super::source::ShaderSourceProvider;
use super::types::{BufferUsage, ShaderStage, VertexAttribute};

const EMPTY_LOG: &str = "no diagnostic reported";

/// Creates GPU resources against a context, resolving shader sources by name.
///
/// Creation is synchronous and fail-fast: a call either returns a fully
/// usable handle or an error carrying the driver's diagnostic text.
/// Returned handles belong to the caller; dropping them releases the GPU
/// objects.
pub struct ResourceFactory<'a, B: ResourceBackend> {
    backend: &'a mut B,
    sources: &'a dyn ShaderSourceProvider,
}

impl<'a, B: ResourceBackend> ResourceFactory<'a, B> {
    pub fn new(backend: &'a mut B, sources: &'a dyn ShaderSourceProvider) -> Self {
        Self { backend, sources }
    }

    /// Allocates a buffer initialized with `data`.
    pub fn create_buffer(&mut self, data: &[u8], usage: BufferUsage) -> B::Buffer {
        log::debug!("creating {usage:?} buffer ({} bytes)", data.len());
        self.backend.create_buffer(data, usage)
    }

    /// Creates a vertex array where each `(buffer, location)` pair feeds
    /// attribute `location` as 3 × f32, tightly packed, from offset 0.
    pub fn create_vertex_array(&mut self, bindings: &[(&B::Buffer, u32)]) -> B::VertexArray {
        let attributes: Vec<_> = bindings
            .iter()
            .map(|&(buffer, location)| VertexAttribute::vec3(buffer, location))
            .collect();

        self.backend.create_vertex_array(&attributes)
    }

    /// Creates a transform-feedback object capturing into `output` (slot 0).
    pub fn create_transform_feedback(&mut self, output: &B::Buffer) -> B::TransformFeedback {
        self.backend.create_transform_feedback(output)
    }

    /// Looks up `name`, strips leading whitespace and compiles it as `stage`.
    ///
    /// A missing name compiles an empty source, which fails as a compile error.
    pub fn create_shader_stage(&mut self, stage: ShaderStage, name: &str) -> EngineResult<B::Shader> {
        let sources = self.sources;
        let source = sources.source(name).unwrap_or_else(|| {
            log::warn!("shader source `{name}` is not registered");
            Cow::Borrowed("")
        });

        self.backend
            .compile_shader(stage, name, source.trim_start())
            .map_err(|log| EngineError::Compile {
                stage,
                name: name.to_owned(),
                log: non_empty(log),
            })
    }

    /// Compiles every stage in order and links them into a program.
    ///
    /// The first stage that fails to compile aborts creation. When
    /// `transform_outputs` is given, those vertex outputs are captured
    /// interleaved, in the given order.
    pub fn create_program(
        &mut self,
        stages: &[(ShaderStage, &str)],
        transform_outputs: Option<&[&str]>,
    ) -> EngineResult<B::Program> {
        let mut shaders = Vec::with_capacity(stages.len());
        for &(stage, name) in stages {
            shaders.push(self.create_shader_stage(stage, name)?);
        }

        let program = self
            .backend
            .link_program(shaders, transform_outputs)
            .map_err(|log| EngineError::Link { log: non_empty(log) })?;

        log::debug!(
            "linked program from [{}]",
            stages.iter().map(|(_, name)| *name).collect::<Vec<_>>().join(", ")
        );
        Ok(program)
    }
}

fn non_empty(log: String) -> String {
    if log.trim().is_empty() {
        EMPTY_LOG.to_owned()
    } else {
        log
    }
}
