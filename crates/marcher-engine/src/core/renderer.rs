use std::any::Any;
use std::time::Duration;

use crate::error::EngineResult;
use crate::render::{FrameStatus, RenderContext, RenderDispatcher, RenderHook};
use crate::resource::{ResourceBackend, ResourceFactory, ShaderSourceProvider};
use crate::time::{FrameClock, FramePoll, MonotonicTime, TimeSource};

use super::host::{FrameHost, StopSignal};

/// Renderer configuration.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Target frames per second. Must be positive and finite.
    pub target_fps: f64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self { target_fps: 60.0 }
    }
}

/// Outcome of one scheduling step.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StepOutcome {
    /// The frame was admitted, cleared and dispatched.
    Rendered,
    /// The frame was admitted but the surface was unavailable; nothing drawn.
    Dropped,
    /// Too early; the throttle skipped this opportunity.
    Skipped,
    /// A stop was requested; no further frame was requested from the host.
    Stopped,
}

/// Frame-throttled driver owning the graphics context.
///
/// The renderer never runs its own loop. The host calls [`Renderer::step`] on
/// every frame opportunity, and each step asks the host for the next one, so
/// the loop sustains itself until stopped, an error propagates, or the host
/// stops calling back.
pub struct Renderer<C> {
    ctx: C,
    clock: FrameClock,
    dispatcher: RenderDispatcher<C>,
    time: Box<dyn TimeSource>,
    stop: StopSignal,
}

impl<C: RenderContext + 'static> Renderer<C> {
    pub fn new(ctx: C, config: RendererConfig) -> EngineResult<Self> {
        Self::with_time_source(ctx, config, MonotonicTime::new())
    }

    pub fn with_time_source<T>(ctx: C, config: RendererConfig, time: T) -> EngineResult<Self>
    where
        T: TimeSource + 'static,
    {
        let clock = FrameClock::new(config.target_fps, time.now_ms())?;
        log::info!(
            "renderer targeting {} fps ({:.3} ms interval)",
            config.target_fps,
            clock.target_interval_ms()
        );

        Ok(Self {
            ctx,
            clock,
            dispatcher: RenderDispatcher::new(),
            time: Box::new(time),
            stop: StopSignal::new(),
        })
    }

    pub fn context(&self) -> &C {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.ctx
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Mutable clock access; the pause flag lives here.
    pub fn clock_mut(&mut self) -> &mut FrameClock {
        &mut self.clock
    }

    pub fn frame_count(&self) -> u64 {
        self.clock.frame_count()
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.clock.elapsed_secs()
    }

    /// Resource factory over this renderer's context.
    pub fn factory<'a>(&'a mut self, sources: &'a dyn ShaderSourceProvider) -> ResourceFactory<'a, C>
    where
        C: ResourceBackend,
    {
        ResourceFactory::new(&mut self.ctx, sources)
    }

    pub fn add_render_hook<H>(&mut self, hook: H)
    where
        H: RenderHook<C> + 'static,
    {
        self.dispatcher.add_render_hook(hook);
    }

    /// See [`RenderDispatcher::try_add_render_hook`].
    pub fn try_add_render_hook(&mut self, hook: Box<dyn Any>) -> EngineResult<()> {
        self.dispatcher.try_add_render_hook(hook)
    }

    pub fn hook_count(&self) -> usize {
        self.dispatcher.len()
    }

    /// Handle that stops the loop at the next step.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn stop(&self) {
        self.stop.raise();
    }

    /// Time left before the throttle admits another frame.
    ///
    /// Saturates at `Duration::MAX` for intervals too long to represent.
    pub fn time_until_next_frame(&self) -> Duration {
        let ms = self.clock.time_until_next_frame(self.time.now_ms());
        Duration::try_from_secs_f64(ms / 1000.0).unwrap_or(Duration::MAX)
    }

    /// Runs one frame opportunity.
    ///
    /// The next opportunity is requested from `host` whether the frame was
    /// admitted or skipped. Errors propagate without rescheduling, which ends
    /// the loop.
    pub fn step(&mut self, host: &mut dyn FrameHost) -> EngineResult<StepOutcome> {
        if self.stop.is_raised() {
            log::debug!("frame loop stopped after {} frames", self.clock.frame_count());
            return Ok(StepOutcome::Stopped);
        }

        let now = self.time.now_ms();
        let outcome = match self.clock.poll(now) {
            FramePoll::Skip => StepOutcome::Skipped,
            FramePoll::Admit { .. } => {
                let frame = self.clock.frame_time(now);
                let status = self.dispatcher.dispatch(&mut self.ctx, &frame)?;
                self.clock.advance(now);

                match status {
                    FrameStatus::Ready => StepOutcome::Rendered,
                    FrameStatus::Unavailable => StepOutcome::Dropped,
                }
            }
        };

        host.request_next_frame();
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::error::EngineError;
    use crate::testing::RecordingContext;
    use crate::time::{FrameTime, ManualTime};

    /// Host that counts redraw requests, like a refresh callback queue.
    #[derive(Default)]
    struct CountingHost {
        requests: u32,
    }

    impl FrameHost for CountingHost {
        fn request_next_frame(&mut self) {
            self.requests += 1;
        }
    }

    fn renderer(fps: f64) -> (Renderer<RecordingContext>, ManualTime) {
        let time = ManualTime::new(0.0);
        let renderer = Renderer::with_time_source(
            RecordingContext::new(),
            RendererConfig { target_fps: fps },
            time.clone(),
        )
        .unwrap();
        (renderer, time)
    }

    /// Steps the renderer as a host calling back at `host_hz`.
    fn run_host(
        renderer: &mut Renderer<RecordingContext>,
        time: &ManualTime,
        host: &mut CountingHost,
        host_hz: u32,
        callbacks: u32,
    ) {
        let start = time.now_ms();
        for i in 1..=callbacks {
            time.set(start + f64::from(i) * 1000.0 / f64::from(host_hz));
            renderer.step(host).unwrap();
        }
    }

    #[test]
    fn invalid_frame_rate_fails_construction() {
        let err = Renderer::new(RecordingContext::new(), RendererConfig { target_fps: 0.0 })
            .err()
            .unwrap();
        assert!(matches!(err, EngineError::InvalidFrameRate(_)));
    }

    #[test]
    fn ten_admitted_frames_clear_ten_times() {
        let (mut renderer, time) = renderer(60.0);
        let mut host = CountingHost::default();

        run_host(&mut renderer, &time, &mut host, 60, 10);

        assert_eq!(renderer.hook_count(), 0);
        assert_eq!(renderer.frame_count(), 10);
        assert_eq!(renderer.context().clear_count(), 10);
        assert_eq!(renderer.context().present_count(), 10);
    }

    #[test]
    fn forty_fps_on_sixty_hz_host_renders_thirty() {
        let (mut renderer, time) = renderer(40.0);
        let mut host = CountingHost::default();

        run_host(&mut renderer, &time, &mut host, 60, 60);

        assert_eq!(renderer.frame_count(), 30);
        assert_eq!(renderer.context().clear_count(), 30);
        assert_eq!(host.requests, 60);
    }

    #[test]
    fn skipped_polls_still_reschedule() {
        let (mut renderer, time) = renderer(10.0);
        let mut host = CountingHost::default();

        time.set(50.0);
        assert_eq!(renderer.step(&mut host).unwrap(), StepOutcome::Skipped);
        time.set(100.0);
        assert_eq!(renderer.step(&mut host).unwrap(), StepOutcome::Rendered);

        assert_eq!(host.requests, 2);
        assert_eq!(renderer.frame_count(), 1);
    }

    #[test]
    fn hooks_see_frame_index_before_increment() {
        let (mut renderer, time) = renderer(60.0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = seen.clone();
            renderer.add_render_hook(
                move |_: &mut RecordingContext, frame: &FrameTime| -> anyhow::Result<()> {
                    seen.borrow_mut().push(frame.frame_index);
                    Ok(())
                },
            );
        }

        run_host(&mut renderer, &time, &mut CountingHost::default(), 60, 3);
        assert_eq!(*seen.borrow(), [0, 1, 2]);
    }

    #[test]
    fn paused_renderer_keeps_counting_frames() {
        let (mut renderer, time) = renderer(60.0);
        let mut host = CountingHost::default();

        run_host(&mut renderer, &time, &mut host, 60, 5);
        let frozen = renderer.elapsed_secs();
        renderer.clock_mut().pause();
        run_host(&mut renderer, &time, &mut host, 60, 5);

        assert_eq!(renderer.elapsed_secs(), frozen);
        assert_eq!(renderer.frame_count(), 10);
    }

    #[test]
    fn failing_hook_stops_rescheduling() {
        let (mut renderer, time) = renderer(60.0);
        let mut host = CountingHost::default();
        renderer.add_render_hook(
            |_: &mut RecordingContext, _: &FrameTime| -> anyhow::Result<()> {
                anyhow::bail!("device lost")
            },
        );

        time.set(20.0);
        assert!(matches!(renderer.step(&mut host), Err(EngineError::Hook(_))));
        assert_eq!(host.requests, 0);
        assert_eq!(renderer.frame_count(), 0);
    }

    #[test]
    fn unavailable_surface_drops_frame_but_advances_clock() {
        let (mut renderer, time) = renderer(60.0);
        renderer.context_mut().unavailable_frames = 1;

        time.set(20.0);
        let outcome = renderer.step(&mut CountingHost::default()).unwrap();
        assert_eq!(outcome, StepOutcome::Dropped);
        assert_eq!(renderer.frame_count(), 1);
        assert_eq!(renderer.context().clear_count(), 0);
    }

    #[test]
    fn stop_signal_ends_the_loop() {
        let (mut renderer, time) = renderer(60.0);
        let mut host = CountingHost::default();
        let stop = renderer.stop_signal();

        run_host(&mut renderer, &time, &mut host, 60, 2);
        stop.raise();
        time.advance(100.0);

        assert_eq!(renderer.step(&mut host).unwrap(), StepOutcome::Stopped);
        assert_eq!(host.requests, 2);
        assert_eq!(renderer.frame_count(), 2);
    }

    #[test]
    fn invalid_hook_leaves_registry_unchanged() {
        let (mut renderer, _) = renderer(60.0);
        assert!(matches!(
            renderer.try_add_render_hook(Box::new(7.5_f64)),
            Err(EngineError::InvalidHook)
        ));
        assert_eq!(renderer.hook_count(), 0);
    }

    #[test]
    fn time_until_next_frame_tracks_the_throttle() {
        let (renderer, time) = renderer(10.0);
        time.set(40.0);
        let remaining = renderer.time_until_next_frame().as_secs_f64();
        assert!((remaining - 0.060).abs() < 1e-6);
    }

    #[test]
    fn very_low_frame_rate_saturates_the_wait() {
        let (renderer, _time) = renderer(1e-20);
        assert_eq!(renderer.time_until_next_frame(), Duration::MAX);
    }

    #[test]
    fn subnormal_frame_rate_fails_construction() {
        let err = Renderer::new(RecordingContext::new(), RendererConfig { target_fps: 1e-320 })
            .err()
            .unwrap();
        assert!(matches!(err, EngineError::InvalidFrameRate(_)));
    }
}
