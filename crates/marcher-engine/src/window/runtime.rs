use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameHost, Renderer, RendererConfig, StepOutcome};
use crate::device::{GpuContext, GpuInit};
use crate::input::platform::translate_window_event;
use crate::input::InputState;

/// Below this, waiting for the throttle costs more than an early redraw.
const MIN_WAIT: Duration = Duration::from_millis(1);

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Request a transparent window so cleared pixels show the desktop.
    pub transparent: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "marcher".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            transparent: false,
        }
    }
}

/// Entry point for the windowed runtime.
///
/// Owns the winit event loop and maps the renderer's next-frame requests onto
/// redraw requests, so the frame loop is driven entirely by the platform.
pub struct Runtime;

impl Runtime {
    pub fn run<A>(
        config: RuntimeConfig,
        gpu_init: GpuInit,
        renderer_config: RendererConfig,
        app: A,
    ) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, renderer_config, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Records next-frame requests made during a step.
#[derive(Debug, Default)]
struct WindowHost {
    frame_requested: bool,
}

impl FrameHost for WindowHost {
    fn request_next_frame(&mut self) {
        self.frame_requested = true;
    }
}

struct Session {
    window: Arc<Window>,
    renderer: Renderer<GpuContext>,
    input: InputState,
}

struct AppState<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    renderer_config: RendererConfig,
    app: A,

    session: Option<Session>,
    frame_pending: bool,
    error: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: App + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, renderer_config: RendererConfig, app: A) -> Self {
        Self {
            config,
            gpu_init,
            renderer_config,
            app,
            session: None,
            frame_pending: false,
            error: None,
        }
    }

    fn create_session(&mut self, event_loop: &ActiveEventLoop) -> Result<Session> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size)
            .with_transparent(self.config.transparent);

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let ctx = pollster::block_on(GpuContext::new(Arc::clone(&window), self.gpu_init.clone()))
            .context("graphics initialization failed")?;

        let mut renderer = Renderer::new(ctx, self.renderer_config.clone())?;
        self.app
            .setup(&mut renderer)
            .context("application setup failed")?;

        log::info!("{} render hook(s) registered", renderer.hook_count());

        Ok(Session {
            window,
            renderer,
            input: InputState::default(),
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.error = Some(err);
        self.shutdown(event_loop);
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(session) = &self.session {
            session.renderer.stop();
        }
        self.frame_pending = false;
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let mut host = WindowHost::default();
        match session.renderer.step(&mut host) {
            Ok(StepOutcome::Stopped) => {
                self.frame_pending = false;
                event_loop.exit();
            }
            Ok(_) => self.frame_pending = host.frame_requested,
            Err(err) => self.fail(event_loop, err.into()),
        }
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.session.is_some() {
            return;
        }

        match self.create_session(event_loop) {
            Ok(session) => {
                session.window.request_redraw();
                self.session = Some(session);
                self.frame_pending = true;
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(session) = self.session.as_ref() else {
            return;
        };

        if !self.frame_pending {
            event_loop.set_control_flow(ControlFlow::Wait);
            return;
        }

        let wait = session.renderer.time_until_next_frame();
        if wait > MIN_WAIT {
            let flow = match Instant::now().checked_add(wait) {
                Some(deadline) => ControlFlow::WaitUntil(deadline),
                None => ControlFlow::Wait,
            };
            event_loop.set_control_flow(flow);
        } else {
            event_loop.set_control_flow(ControlFlow::Wait);
            self.frame_pending = false;
            session.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.window.id() != window_id {
            return;
        }

        if let Some(input_event) = translate_window_event(&session.input, &event) {
            session.input.apply_event(&input_event);
            let control = self
                .app
                .on_input(&input_event, &session.input, &mut session.renderer);
            if control == AppControl::Exit {
                self.shutdown(event_loop);
                return;
            }
        }

        match &event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),

            WindowEvent::Resized(new_size) => {
                session.renderer.context_mut().resize(*new_size);
                session.window.request_redraw();
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = session.window.inner_size();
                session.renderer.context_mut().resize(new_size);
                session.window.request_redraw();
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }
}
