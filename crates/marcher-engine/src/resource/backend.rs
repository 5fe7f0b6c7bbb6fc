use super::types::{BufferUsage, ShaderStage, VertexAttribute};

/// Resource-creation half of a graphics context.
///
/// Implementations perform the raw API calls; validation, source lookup and
/// error shaping live in [`ResourceFactory`](super::ResourceFactory).
/// Handles are plain owned values: dropping one releases the GPU object.
pub trait ResourceBackend {
    type Buffer;
    type VertexArray;
    type TransformFeedback;
    type Shader;
    type Program;

    fn create_buffer(&mut self, data: &[u8], usage: BufferUsage) -> Self::Buffer;

    /// Builds one vertex array from `attributes`, in order.
    fn create_vertex_array(
        &mut self,
        attributes: &[VertexAttribute<'_, Self::Buffer>],
    ) -> Self::VertexArray;

    /// Binds `output` as capture slot 0.
    fn create_transform_feedback(&mut self, output: &Self::Buffer) -> Self::TransformFeedback;

    /// Compiles one stage. On failure returns the compiler log.
    fn compile_shader(
        &mut self,
        stage: ShaderStage,
        label: &str,
        source: &str,
    ) -> Result<Self::Shader, String>;

    /// Links compiled stages, optionally capturing `transform_outputs`
    /// interleaved. On failure returns the linker log.
    fn link_program(
        &mut self,
        shaders: Vec<Self::Shader>,
        transform_outputs: Option<&[&str]>,
    ) -> Result<Self::Program, String>;
}
