use crate::error::{EngineError, EngineResult};

/// Slack applied when comparing a frame delta against the target interval.
///
/// Host timestamps are floating point; a host period equal to the interval
/// must not be skipped because of representation error.
const INTERVAL_TOLERANCE_MS: f64 = 1e-6;

/// Frame timing snapshot handed to render hooks.
///
/// Values are taken before the clock advances, so the first admitted frame is
/// frame 0 at simulation time 0.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Wall time since the previous admitted frame, in milliseconds.
    pub delta_ms: f64,

    /// Simulation time in seconds. Frozen while the clock is paused.
    pub elapsed_secs: f64,

    /// Number of frames admitted before this one.
    pub frame_index: u64,

    /// Timestamp of the poll that admitted this frame, in milliseconds.
    pub now_ms: f64,
}

/// Result of polling the clock.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum FramePoll {
    /// Not enough time has passed since the last admitted frame.
    Skip,
    /// The frame is admitted; `delta_ms` is the wall time since the last one.
    Admit { delta_ms: f64 },
}

/// Frame-rate throttle and simulation time base.
///
/// Throttling is purely time based. A poll is admitted once at least one
/// target interval has elapsed since the previous admitted frame, which means
/// the admitted rate is quantized to a sub-multiple of the host callback rate:
/// a 40 FPS target on a 60 Hz host admits every other callback (30 FPS), not 40.
///
/// Invariants:
/// - `frame_count` grows by exactly one per admitted frame, never on skips
/// - `elapsed_sim_secs` only grows while not paused
#[derive(Debug, Clone)]
pub struct FrameClock {
    target_interval_ms: f64,
    last_frame_ms: f64,
    start_ms: f64,
    elapsed_sim_secs: f64,
    frame_count: u64,
    paused: bool,
}

impl FrameClock {
    /// Creates a running clock whose time base starts at `now_ms`.
    pub fn new(target_fps: f64, now_ms: f64) -> EngineResult<Self> {
        if !target_fps.is_finite() || target_fps <= 0.0 {
            return Err(EngineError::InvalidFrameRate(target_fps));
        }

        // Subnormal rates overflow the interval.
        let target_interval_ms = 1000.0 / target_fps;
        if !target_interval_ms.is_finite() {
            return Err(EngineError::InvalidFrameRate(target_fps));
        }

        Ok(Self {
            target_interval_ms,
            last_frame_ms: now_ms,
            start_ms: now_ms,
            elapsed_sim_secs: 0.0,
            frame_count: 0,
            paused: false,
        })
    }

    /// Decides whether a poll at `now_ms` is admitted. Does not mutate state.
    pub fn poll(&self, now_ms: f64) -> FramePoll {
        let delta_ms = now_ms - self.last_frame_ms;

        if delta_ms + INTERVAL_TOLERANCE_MS < self.target_interval_ms {
            FramePoll::Skip
        } else {
            FramePoll::Admit { delta_ms }
        }
    }

    /// Commits an admitted frame at `now_ms`.
    pub fn advance(&mut self, now_ms: f64) {
        let delta_ms = now_ms - self.last_frame_ms;

        if !self.paused {
            self.elapsed_sim_secs += delta_ms / 1000.0;
        }

        self.frame_count += 1;
        self.last_frame_ms = now_ms;
    }

    /// Polls and, when admitted, advances in one call.
    pub fn tick(&mut self, now_ms: f64) -> FramePoll {
        let poll = self.poll(now_ms);
        if let FramePoll::Admit { .. } = poll {
            self.advance(now_ms);
        }
        poll
    }

    /// Snapshot for a frame admitted at `now_ms`, taken before `advance`.
    pub fn frame_time(&self, now_ms: f64) -> FrameTime {
        FrameTime {
            delta_ms: now_ms - self.last_frame_ms,
            elapsed_secs: self.elapsed_sim_secs,
            frame_index: self.frame_count,
            now_ms,
        }
    }

    /// Milliseconds left until a poll would be admitted; zero when due.
    pub fn time_until_next_frame(&self, now_ms: f64) -> f64 {
        (self.last_frame_ms + self.target_interval_ms - now_ms).max(0.0)
    }

    pub fn target_interval_ms(&self) -> f64 {
        self.target_interval_ms
    }

    pub fn start_ms(&self) -> f64 {
        self.start_ms
    }

    pub fn last_frame_ms(&self) -> f64 {
        self.last_frame_ms
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_sim_secs
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            log::debug!("simulation time {}", if paused { "paused" } else { "resumed" });
        }
        self.paused = paused;
    }

    pub fn pause(&mut self) {
        self.set_paused(true);
    }

    pub fn resume(&mut self) {
        self.set_paused(false);
    }

    /// Flips the pause flag and returns the new state.
    pub fn toggle_pause(&mut self) -> bool {
        self.set_paused(!self.paused);
        self.paused
    }
}
