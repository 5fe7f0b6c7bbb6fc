use anyhow::Context;
use bytemuck::{Pod, Zeroable};

use marcher_engine::device::{GpuBuffer, GpuContext, GpuVertexArray};
use marcher_engine::input::{InputEvent, InputState, Key, KeyState};
use marcher_engine::resource::{BufferUsage, ShaderSources, ShaderStage};
use marcher_engine::time::FrameTime;
use marcher_engine::render::RenderHook;
use marcher_engine::{App, AppControl, Renderer};

use crate::pointer::{PointerCells, PointerTracker};

/// Covers the whole viewport with one triangle; the overhang is clipped.
const FULLSCREEN_TRIANGLE: [[f32; 3]; 3] = [
    [-1.0, -1.0, 0.0],
    [3.0, -1.0, 0.0],
    [-1.0, 3.0, 0.0],
];

/// Mirrors `Uniforms` in `raymarch.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    mouse: [f32; 4],
    resolution: [f32; 2],
    time: f32,
    frame: i32,
}

fn shader_sources() -> ShaderSources {
    ShaderSources::new()
        .with("fullscreen", include_str!("../shaders/fullscreen.wgsl"))
        .with("raymarch", include_str!("../shaders/raymarch.wgsl"))
}

/// Full-screen raymarching demo.
#[derive(Default)]
pub struct Marcher {
    pointer: PointerTracker,
}

impl Marcher {
    pub fn new() -> Self {
        Self {
            pointer: PointerTracker::new(),
        }
    }
}

impl App for Marcher {
    fn setup(&mut self, renderer: &mut Renderer<GpuContext>) -> anyhow::Result<()> {
        let sources = shader_sources();
        let mut factory = renderer.factory(&sources);

        let program = factory
            .create_program(
                &[
                    (ShaderStage::Vertex, "fullscreen"),
                    (ShaderStage::Fragment, "raymarch"),
                ],
                None,
            )
            .context("building the raymarch program")?;

        let triangle = factory.create_buffer(
            bytemuck::cast_slice(&FULLSCREEN_TRIANGLE),
            BufferUsage::Static,
        );
        let vertex_array = factory.create_vertex_array(&[(&triangle, 0)]);
        let uniforms = factory.create_buffer(
            bytemuck::bytes_of(&Uniforms::zeroed()),
            BufferUsage::Stream,
        );

        let ctx = renderer.context();
        let pipeline =
            program.render_pipeline(ctx, &vertex_array, Some(wgpu::BlendState::ALPHA_BLENDING));

        let bind_group = ctx.device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("marcher uniforms"),
            layout: &pipeline.get_bind_group_layout(0),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.raw().as_entire_binding(),
            }],
        });

        renderer.add_render_hook(RaymarchHook {
            pipeline,
            vertex_array,
            uniforms,
            bind_group,
            pointer: self.pointer.cells(),
        });

        log::info!("raymarch scene ready (P pauses, Esc quits)");
        Ok(())
    }

    fn on_input(
        &mut self,
        event: &InputEvent,
        _input: &InputState,
        renderer: &mut Renderer<GpuContext>,
    ) -> AppControl {
        self.pointer.handle(event);

        match event {
            InputEvent::Key {
                key: Key::Character('p'),
                state: KeyState::Pressed,
                repeat: false,
                ..
            } => {
                let paused = renderer.clock_mut().toggle_pause();
                log::info!("simulation {}", if paused { "paused" } else { "resumed" });
                AppControl::Continue
            }
            InputEvent::Key {
                key: Key::Escape,
                state: KeyState::Pressed,
                ..
            } => AppControl::Exit,
            _ => AppControl::Continue,
        }
    }
}

struct RaymarchHook {
    pipeline: wgpu::RenderPipeline,
    vertex_array: GpuVertexArray,
    uniforms: GpuBuffer,
    bind_group: wgpu::BindGroup,
    pointer: PointerCells,
}

impl RaymarchHook {
    fn snapshot(&self, width: u32, height: u32, frame: &FrameTime) -> Uniforms {
        let [x, y] = self.pointer.position.get();
        let [down, touch] = self.pointer.info.get();

        Uniforms {
            // Shader space has its origin bottom-left.
            mouse: [x, height as f32 - y, down, touch],
            resolution: [width as f32, height as f32],
            time: frame.elapsed_secs as f32,
            frame: frame.frame_index as i32,
        }
    }
}

impl RenderHook<GpuContext> for RaymarchHook {
    fn render(&mut self, ctx: &mut GpuContext, frame: &FrameTime) -> anyhow::Result<()> {
        let size = ctx.size();
        let uniforms = self.snapshot(size.width, size.height, frame);
        self.uniforms
            .write(ctx.queue(), 0, bytemuck::bytes_of(&uniforms))
            .context("uploading raymarch uniforms")?;

        let Some(mut pass) = ctx.render_pass("marcher raymarch") else {
            return Ok(());
        };
        pass.set_pipeline(&self.pipeline);
        self.vertex_array.bind(&mut pass);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..3, 0..1);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_block_matches_shader_layout() {
        assert_eq!(std::mem::size_of::<Uniforms>(), 32);
        assert_eq!(std::mem::align_of::<Uniforms>(), 4);
    }

    #[test]
    fn demo_shaders_compile_and_link() {
        use marcher_engine::resource::wgsl;
        use marcher_engine::resource::ShaderSourceProvider;

        let sources = shader_sources();
        let vertex = wgsl::compile_stage(
            ShaderStage::Vertex,
            &sources.source("fullscreen").unwrap(),
        )
        .unwrap();
        let fragment = wgsl::compile_stage(
            ShaderStage::Fragment,
            &sources.source("raymarch").unwrap(),
        )
        .unwrap();

        let linked = wgsl::link(&[&vertex, &fragment], None).unwrap();
        assert_eq!(linked.vertex_entry, "vs_main");
        assert_eq!(linked.fragment_entry.as_deref(), Some("fs_main"));
        assert!(linked.transform.is_none());
    }
}
