use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Source of wall-clock timestamps in milliseconds.
///
/// Only differences between readings are meaningful.
pub trait TimeSource {
    fn now_ms(&self) -> f64;
}

/// Monotonic time measured from construction.
#[derive(Debug, Clone)]
pub struct MonotonicTime {
    origin: Instant,
}

impl MonotonicTime {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicTime {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Externally driven time, for headless stepping and simulation.
///
/// Clones share the same reading, so one handle can be given to the renderer
/// while another advances it.
#[derive(Debug, Clone, Default)]
pub struct ManualTime {
    now_ms: Rc<Cell<f64>>,
}

impl ManualTime {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now_ms: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: f64) {
        self.now_ms.set(now_ms);
    }

    pub fn advance(&self, delta_ms: f64) {
        self.now_ms.set(self.now_ms.get() + delta_ms);
    }
}

impl TimeSource for ManualTime {
    fn now_ms(&self) -> f64 {
        self.now_ms.get()
    }
}
