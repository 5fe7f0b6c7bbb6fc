//! wgpu implementations of the resource handles.
//!
//! Handles own their GPU objects; dropping one releases them.

use std::borrow::Cow;
use std::sync::Arc;

use wgpu::util::DeviceExt;

use crate::error::{EngineError, EngineResult};
use crate::resource::wgsl::{self, LinkedInterface, StageInterface, TransformLayout};
use crate::resource::{BufferUsage, ResourceBackend, ShaderStage, VertexAttribute};

use super::GpuContext;

/// Buffers are usable for every binding the engine supports so one upload can
/// feed vertices, uniforms or capture output.
const BUFFER_USAGES: wgpu::BufferUsages = wgpu::BufferUsages::VERTEX
    .union(wgpu::BufferUsages::UNIFORM)
    .union(wgpu::BufferUsages::STORAGE)
    .union(wgpu::BufferUsages::COPY_DST)
    .union(wgpu::BufferUsages::COPY_SRC);

/// Byte alignment required for buffer writes.
const WRITE_ALIGNMENT: u64 = wgpu::COPY_BUFFER_ALIGNMENT;

#[derive(Debug, Clone)]
pub struct GpuBuffer {
    raw: Arc<wgpu::Buffer>,
    usage: BufferUsage,
    size: u64,
}

impl GpuBuffer {
    pub fn raw(&self) -> &wgpu::Buffer {
        &self.raw
    }

    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Size in bytes, including any padding added at creation.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Schedules a write of `data` at `offset`; lands before the next submit.
    ///
    /// Fails without writing when the range falls outside the buffer or is
    /// not 4-byte aligned.
    pub fn write(&self, queue: &wgpu::Queue, offset: u64, data: &[u8]) -> EngineResult<()> {
        check_write(offset, data.len() as u64, self.size)?;
        queue.write_buffer(&self.raw, offset, data);
        Ok(())
    }
}

fn check_write(offset: u64, len: u64, size: u64) -> EngineResult<()> {
    let fits = offset.checked_add(len).is_some_and(|end| end <= size);
    if !fits || offset % WRITE_ALIGNMENT != 0 || len % WRITE_ALIGNMENT != 0 {
        return Err(EngineError::BufferWrite { offset, len, size });
    }
    Ok(())
}

#[derive(Debug, Clone)]
struct VertexSlot {
    buffer: Arc<wgpu::Buffer>,
    stride: u64,
    attribute: wgpu::VertexAttribute,
}

/// Vertex input state: one vertex buffer slot per enabled attribute.
#[derive(Debug, Clone, Default)]
pub struct GpuVertexArray {
    slots: Vec<VertexSlot>,
}

impl GpuVertexArray {
    /// Buffer layouts for a render pipeline, in slot order.
    pub fn buffer_layouts(&self) -> Vec<wgpu::VertexBufferLayout<'_>> {
        self.slots
            .iter()
            .map(|slot| wgpu::VertexBufferLayout {
                array_stride: slot.stride,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: std::slice::from_ref(&slot.attribute),
            })
            .collect()
    }

    /// Binds every slot's buffer on `pass`.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        for (index, slot) in self.slots.iter().enumerate() {
            pass.set_vertex_buffer(index as u32, slot.buffer.slice(..));
        }
    }
}

/// Capture target for vertex outputs.
///
/// Exposed to shaders as a writable storage buffer at binding 0 of whichever
/// group the capturing vertex stage declares.
#[derive(Debug)]
pub struct GpuTransformFeedback {
    output: Arc<wgpu::Buffer>,
    layout: wgpu::BindGroupLayout,
    bind_group: Option<wgpu::BindGroup>,
}

impl GpuTransformFeedback {
    pub fn output(&self) -> &wgpu::Buffer {
        &self.output
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    /// `None` when the output buffer is empty.
    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }
}

#[derive(Debug)]
pub struct GpuShader {
    stage: ShaderStage,
    label: String,
    module: wgpu::ShaderModule,
    interface: StageInterface,
}

impl GpuShader {
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn module(&self) -> &wgpu::ShaderModule {
        &self.module
    }

    pub fn interface(&self) -> &StageInterface {
        &self.interface
    }
}

/// A linked vertex (+ optional fragment) stage pair.
#[derive(Debug)]
pub struct GpuProgram {
    label: String,
    vertex: wgpu::ShaderModule,
    fragment: Option<wgpu::ShaderModule>,
    interface: LinkedInterface,
}

impl GpuProgram {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn interface(&self) -> &LinkedInterface {
        &self.interface
    }

    /// Byte layout of the captured varyings, if capture was requested.
    ///
    /// Nothing is captured automatically: the vertex shader must write each
    /// varying into the [`GpuTransformFeedback`] storage buffer at these
    /// offsets itself.
    pub fn transform_layout(&self) -> Option<&TransformLayout> {
        self.interface.transform.as_ref()
    }

    /// Builds a triangle-list pipeline targeting the context's surface.
    ///
    /// The pipeline layout is derived from the shaders, so bind group layouts
    /// are available through `get_bind_group_layout`.
    pub fn render_pipeline(
        &self,
        ctx: &GpuContext,
        vertex_array: &GpuVertexArray,
        blend: Option<wgpu::BlendState>,
    ) -> wgpu::RenderPipeline {
        let buffers = vertex_array.buffer_layouts();
        let targets = [Some(wgpu::ColorTargetState {
            format: ctx.surface_format(),
            blend,
            write_mask: wgpu::ColorWrites::ALL,
        })];

        ctx.device().create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&self.label),
            layout: None,

            vertex: wgpu::VertexState {
                module: &self.vertex,
                entry_point: Some(&self.interface.vertex_entry),
                compilation_options: Default::default(),
                buffers: &buffers,
            },

            fragment: self.fragment.as_ref().map(|module| wgpu::FragmentState {
                module,
                entry_point: self.interface.fragment_entry.as_deref(),
                compilation_options: Default::default(),
                targets: &targets,
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }
}

impl ResourceBackend for GpuContext {
    type Buffer = GpuBuffer;
    type VertexArray = GpuVertexArray;
    type TransformFeedback = GpuTransformFeedback;
    type Shader = GpuShader;
    type Program = GpuProgram;

    fn create_buffer(&mut self, data: &[u8], usage: BufferUsage) -> GpuBuffer {
        let raw = self.device().create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("marcher buffer"),
            contents: data,
            usage: BUFFER_USAGES,
        });
        let size = raw.size();

        GpuBuffer {
            raw: Arc::new(raw),
            usage,
            size,
        }
    }

    fn create_vertex_array(&mut self, attributes: &[VertexAttribute<'_, GpuBuffer>]) -> GpuVertexArray {
        let slots = attributes
            .iter()
            .map(|attr| VertexSlot {
                buffer: Arc::clone(&attr.buffer.raw),
                stride: attr.stride,
                attribute: wgpu::VertexAttribute {
                    format: attr.format,
                    offset: attr.offset,
                    shader_location: attr.location,
                },
            })
            .collect();

        GpuVertexArray { slots }
    }

    fn create_transform_feedback(&mut self, output: &GpuBuffer) -> GpuTransformFeedback {
        let visibility = if self
            .device()
            .features()
            .contains(wgpu::Features::VERTEX_WRITABLE_STORAGE)
        {
            wgpu::ShaderStages::VERTEX
        } else {
            log::debug!("vertex-stage storage writes unavailable, capture limited to compute");
            wgpu::ShaderStages::COMPUTE
        };

        let layout = self
            .device()
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("marcher transform feedback bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let bind_group = if output.size == 0 {
            log::warn!("transform feedback created over an empty buffer");
            None
        } else {
            Some(self.device().create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("marcher transform feedback"),
                layout: &layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: output.raw.as_entire_binding(),
                }],
            }))
        };

        GpuTransformFeedback {
            output: Arc::clone(&output.raw),
            layout,
            bind_group,
        }
    }

    fn compile_shader(
        &mut self,
        stage: ShaderStage,
        label: &str,
        source: &str,
    ) -> Result<GpuShader, String> {
        // Validate up front against what this device can run: wgpu reports
        // shader errors asynchronously.
        let capabilities = wgsl::capabilities_for(self.device().features());
        let interface = wgsl::compile_stage_with(stage, source, capabilities)?;

        let module = self
            .device()
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(Cow::Owned(source.to_owned())),
            });

        Ok(GpuShader {
            stage,
            label: label.to_owned(),
            module,
            interface,
        })
    }

    fn link_program(
        &mut self,
        shaders: Vec<GpuShader>,
        transform_outputs: Option<&[&str]>,
    ) -> Result<GpuProgram, String> {
        let interfaces: Vec<_> = shaders.iter().map(|s| &s.interface).collect();
        let interface = wgsl::link(&interfaces, transform_outputs)?;

        let mut vertex = None;
        let mut fragment = None;
        let mut labels = Vec::with_capacity(shaders.len());
        for shader in shaders {
            labels.push(shader.label);
            match shader.stage {
                ShaderStage::Vertex => vertex = Some(shader.module),
                ShaderStage::Fragment => fragment = Some(shader.module),
            }
        }

        let vertex = vertex.ok_or_else(|| "error: program has no vertex stage".to_owned())?;

        Ok(GpuProgram {
            label: labels.join("+"),
            vertex,
            fragment,
            interface,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_inside_the_buffer_is_accepted() {
        assert!(check_write(0, 32, 32).is_ok());
        assert!(check_write(16, 16, 32).is_ok());
        assert!(check_write(32, 0, 32).is_ok());
    }

    #[test]
    fn out_of_range_write_fails() {
        let err = check_write(16, 32, 32).unwrap_err();
        assert!(matches!(
            err,
            EngineError::BufferWrite { offset: 16, len: 32, size: 32 }
        ));
    }

    #[test]
    fn overflowing_range_fails_instead_of_wrapping() {
        assert!(check_write(u64::MAX - 3, 8, 32).is_err());
    }

    #[test]
    fn misaligned_write_fails() {
        assert!(check_write(2, 4, 32).is_err());
        assert!(check_write(0, 6, 32).is_err());
    }
}
