use std::sync::Arc;

use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::error::{EngineError, EngineResult};
use crate::render::{ClearValue, FrameStatus, RenderContext};

use super::surface;
use super::{GpuFrame, GpuInit, SurfaceErrorAction};

/// The graphics context: wgpu core objects bound to one window surface.
///
/// - creates and stores Instance/Adapter/Device/Queue
/// - configures the surface and owns a matching depth target
/// - holds the frame being recorded between `begin_frame` and `end_frame`
pub struct GpuContext {
    window: Arc<Window>,

    /// Kept alive for the lifetime of the surface.
    _instance: wgpu::Instance,

    surface: wgpu::Surface<'static>,

    device: wgpu::Device,

    queue: wgpu::Queue,

    config: wgpu::SurfaceConfiguration,

    /// Current drawable size in physical pixels.
    size: PhysicalSize<u32>,

    depth_format: wgpu::TextureFormat,

    depth_view: wgpu::TextureView,

    frame: Option<GpuFrame>,
}

impl GpuContext {
    /// Creates a context for `window`.
    ///
    /// Fails with [`EngineError::UnsupportedContext`] when no surface, adapter,
    /// device or surface format is available.
    pub async fn new(window: Arc<Window>, init: GpuInit) -> EngineResult<Self> {
        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Err(unsupported("window has zero size"));
        }

        let GpuInit {
            prefer_srgb,
            present_mode,
            alpha_mode,
            required_features,
            required_limits,
            desired_maximum_frame_latency,
            depth_format,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(Arc::clone(&window))
            .map_err(|e| unsupported(format!("failed to create surface: {e}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| unsupported(format!("no suitable GPU adapter: {e}")))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("marcher device"),
                required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| unsupported(format!("failed to create device: {e}")))?;

        let caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&caps, prefer_srgb)
            .ok_or_else(|| unsupported("surface reports no supported formats"))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode,
            alpha_mode: surface::choose_alpha_mode(&caps, alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency,
        };

        surface.configure(&device, &config);
        let depth_view = surface::create_depth_view(&device, depth_format, size);

        let info = adapter.get_info();
        log::info!(
            "graphics context ready: {} ({:?}), {:?} {}x{}",
            info.name,
            info.backend,
            format,
            size.width,
            size.height
        );

        Ok(Self {
            window,
            _instance: instance,
            surface,
            device,
            queue,
            config,
            size,
            depth_format,
            depth_view,
            frame: None,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Current drawable size (physical pixels).
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn depth_format(&self) -> wgpu::TextureFormat {
        self.depth_format
    }

    /// Depth target cleared at the start of every frame.
    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_view
    }

    /// Reconfigures the surface and depth target after a resize.
    ///
    /// A 0x0 size is recorded but configuration is deferred; frames report
    /// the surface as unavailable until a non-zero size arrives.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.size = new_size;
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = surface::create_depth_view(&self.device, self.depth_format, new_size);
    }

    /// The frame being recorded, if one was begun.
    pub fn frame_mut(&mut self) -> Option<&mut GpuFrame> {
        self.frame.as_mut()
    }

    /// Opens a render pass over the current frame's color target, preserving
    /// what earlier passes drew. Returns `None` outside a frame.
    pub fn render_pass(&mut self, label: &str) -> Option<wgpu::RenderPass<'_>> {
        let frame = self.frame.as_mut()?;

        Some(frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        }))
    }
}

impl RenderContext for GpuContext {
    fn begin_frame(&mut self, clear: ClearValue) -> EngineResult<FrameStatus> {
        // A frame abandoned by a failed hook is discarded, not presented.
        self.frame = None;

        if self.size.width == 0 || self.size.height == 0 {
            return Ok(FrameStatus::Unavailable);
        }

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(err) => {
                let action = surface::recover_surface_error(
                    &self.surface,
                    &self.device,
                    &self.config,
                    self.size,
                    &err,
                );
                log::debug!("surface acquisition failed ({err}), {action:?}");
                return match action {
                    SurfaceErrorAction::Fatal => Err(EngineError::Surface(err.to_string())),
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                        Ok(FrameStatus::Unavailable)
                    }
                };
            }
        };

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("marcher frame encoder"),
            });

        // Clear pass; dropped before hooks record their own passes.
        {
            let _rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("marcher clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear.color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear.depth),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        self.frame = Some(GpuFrame {
            surface_texture,
            view,
            encoder,
        });

        Ok(FrameStatus::Ready)
    }

    fn end_frame(&mut self) {
        let Some(frame) = self.frame.take() else {
            return;
        };

        self.queue.submit(std::iter::once(frame.encoder.finish()));
        self.window.pre_present_notify();
        frame.surface_texture.present();
    }
}

fn unsupported(reason: impl Into<String>) -> EngineError {
    EngineError::UnsupportedContext(reason.into())
}
