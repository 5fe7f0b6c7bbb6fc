use std::fmt;

/// Programmable pipeline stage a shader is compiled for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub(crate) fn to_naga(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Expected update frequency of a buffer's contents.
///
/// A hint only; every buffer can be rewritten regardless of the hint.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum BufferUsage {
    /// Written once, drawn many times.
    #[default]
    Static,
    /// Rewritten occasionally.
    Dynamic,
    /// Rewritten every frame.
    Stream,
}

/// Components per vertex attribute created by the factory.
pub const ATTRIBUTE_COMPONENTS: u32 = 3;

/// Byte stride of a tightly packed 3 × f32 attribute.
pub const ATTRIBUTE_STRIDE: u64 = (ATTRIBUTE_COMPONENTS as u64) * 4;

/// Attribute description handed to a backend when building a vertex array.
#[derive(Debug)]
pub struct VertexAttribute<'a, B> {
    pub buffer: &'a B,
    pub location: u32,
    pub format: wgpu::VertexFormat,
    pub stride: u64,
    pub offset: u64,
}

impl<'a, B> VertexAttribute<'a, B> {
    /// 3 × f32, tightly packed, no offset.
    pub fn vec3(buffer: &'a B, location: u32) -> Self {
        Self {
            buffer,
            location,
            format: wgpu::VertexFormat::Float32x3,
            stride: ATTRIBUTE_STRIDE,
            offset: 0,
        }
    }
}
