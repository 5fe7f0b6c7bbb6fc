//! Recording graphics context used by the engine's unit tests.
//!
//! Resource calls are logged instead of reaching a GPU; shaders still go
//! through the real WGSL front-end so compile and link diagnostics are genuine.

use crate::error::EngineResult;
use crate::render::{ClearValue, FrameStatus, RenderContext};
use crate::resource::wgsl::{self, LinkedInterface, StageInterface};
use crate::resource::{BufferUsage, ResourceBackend, ShaderStage, VertexAttribute};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateBuffer {
        id: u32,
        len: usize,
        usage: BufferUsage,
    },
    CreateVertexArray {
        id: u32,
    },
    CreateTransformFeedback {
        id: u32,
        output: u32,
    },
    CompileShader {
        stage: ShaderStage,
        label: String,
        source: String,
    },
    LinkProgram {
        stages: usize,
        transform_outputs: Option<Vec<String>>,
    },
    Clear(ClearValue),
    Present,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedBuffer {
    pub id: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedAttribute {
    pub buffer: u32,
    pub location: u32,
    pub format: wgpu::VertexFormat,
    pub stride: u64,
    pub offset: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedVertexArray {
    pub id: u32,
    pub attributes: Vec<RecordedAttribute>,
}

impl RecordedVertexArray {
    /// Buffer feeding attribute `location`, if it is enabled.
    pub fn source_of(&self, location: u32) -> Option<u32> {
        self.attributes
            .iter()
            .find(|a| a.location == location)
            .map(|a| a.buffer)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedTransformFeedback {
    pub id: u32,
    /// `(slot, buffer)` pairs.
    pub slots: Vec<(u32, u32)>,
}

#[derive(Debug, Default)]
pub struct RecordingContext {
    pub calls: Vec<Call>,
    /// Number of upcoming frames that report an unavailable surface.
    pub unavailable_frames: u32,
    next_id: u32,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear_count(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, Call::Clear(_))).count()
    }

    pub fn present_count(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, Call::Present)).count()
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

impl RenderContext for RecordingContext {
    fn begin_frame(&mut self, clear: ClearValue) -> EngineResult<FrameStatus> {
        if self.unavailable_frames > 0 {
            self.unavailable_frames -= 1;
            return Ok(FrameStatus::Unavailable);
        }
        self.calls.push(Call::Clear(clear));
        Ok(FrameStatus::Ready)
    }

    fn end_frame(&mut self) {
        self.calls.push(Call::Present);
    }
}

impl ResourceBackend for RecordingContext {
    type Buffer = RecordedBuffer;
    type VertexArray = RecordedVertexArray;
    type TransformFeedback = RecordedTransformFeedback;
    type Shader = StageInterface;
    type Program = LinkedInterface;

    fn create_buffer(&mut self, data: &[u8], usage: BufferUsage) -> RecordedBuffer {
        let id = self.next_id();
        self.calls.push(Call::CreateBuffer {
            id,
            len: data.len(),
            usage,
        });
        RecordedBuffer { id }
    }

    fn create_vertex_array(
        &mut self,
        attributes: &[VertexAttribute<'_, RecordedBuffer>],
    ) -> RecordedVertexArray {
        let id = self.next_id();
        self.calls.push(Call::CreateVertexArray { id });
        RecordedVertexArray {
            id,
            attributes: attributes
                .iter()
                .map(|a| RecordedAttribute {
                    buffer: a.buffer.id,
                    location: a.location,
                    format: a.format,
                    stride: a.stride,
                    offset: a.offset,
                })
                .collect(),
        }
    }

    fn create_transform_feedback(&mut self, output: &RecordedBuffer) -> RecordedTransformFeedback {
        let id = self.next_id();
        self.calls.push(Call::CreateTransformFeedback {
            id,
            output: output.id,
        });
        RecordedTransformFeedback {
            id,
            slots: vec![(0, output.id)],
        }
    }

    fn compile_shader(
        &mut self,
        stage: ShaderStage,
        label: &str,
        source: &str,
    ) -> Result<StageInterface, String> {
        self.calls.push(Call::CompileShader {
            stage,
            label: label.to_owned(),
            source: source.to_owned(),
        });
        wgsl::compile_stage(stage, source)
    }

    fn link_program(
        &mut self,
        shaders: Vec<StageInterface>,
        transform_outputs: Option<&[&str]>,
    ) -> Result<LinkedInterface, String> {
        self.calls.push(Call::LinkProgram {
            stages: shaders.len(),
            transform_outputs: transform_outputs
                .map(|names| names.iter().map(|n| (*n).to_owned()).collect()),
        });
        let refs: Vec<_> = shaders.iter().collect();
        wgsl::link(&refs, transform_outputs)
    }
}
