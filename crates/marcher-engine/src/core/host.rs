use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Host capability that schedules the next frame opportunity.
///
/// Windowed hosts map this onto a redraw request; headless hosts can count
/// requests or drive the next step directly.
pub trait FrameHost {
    fn request_next_frame(&mut self);
}

/// Cooperative stop request for the frame loop.
///
/// Clones share one flag. Once raised, the driver stops rescheduling.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    raised: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.raised.store(true, Ordering::Relaxed);
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Relaxed)
    }
}
