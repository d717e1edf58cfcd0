//! Wall-clock sources and a fixed-interval cadence for host timers.
//!
//! All engine timestamps are Unix milliseconds (`Millis`). The engine never
//! reads the system clock directly; it asks a `Clock`, which makes every
//! time-based rule testable with `ManualClock`.

use std::cell::Cell;
use std::rc::Rc;

/// Unix epoch milliseconds.
pub type Millis = u64;

pub const SECOND_MS: Millis = 1_000;
pub const HOUR_MS: Millis = 60 * 60 * SECOND_MS;
pub const DAY_MS: Millis = 24 * HOUR_MS;

/// Source of wall-clock reads.
pub trait Clock {
    fn now_ms(&self) -> Millis;
}

/// Real clock. Uses `Date.now()` in the browser because
/// `SystemTime::now()` panics on wasm32-unknown-unknown.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[cfg(target_arch = "wasm32")]
    fn now_ms(&self) -> Millis {
        js_sys::Date::now() as Millis
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now_ms(&self) -> Millis {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as Millis)
            .unwrap_or(0)
    }
}

/// Hand-driven clock. Clones share the same instant, so a test can keep one
/// handle and give another to the engine.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<Millis>>,
}

impl ManualClock {
    pub fn new(start_ms: Millis) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, ms: Millis) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: Millis) {
        self.now.set(self.now.get().saturating_add(ms));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.get()
    }
}

/// Counts how many whole intervals have elapsed between successive
/// timestamps, carrying the remainder forward (accumulator pattern).
///
/// The first call only records the timestamp and fires nothing.
#[derive(Clone, Debug)]
pub struct Cadence {
    interval_ms: Millis,
    accumulator: Millis,
    last_timestamp: Option<Millis>,
}

impl Cadence {
    pub fn new(interval_ms: Millis) -> Self {
        Self {
            interval_ms: interval_ms.max(1),
            accumulator: 0,
            last_timestamp: None,
        }
    }

    /// Feed the current time; returns how many intervals completed.
    /// A clock that goes backwards contributes nothing.
    pub fn update(&mut self, now_ms: Millis) -> u32 {
        let delta = match self.last_timestamp {
            Some(prev) => now_ms.saturating_sub(prev),
            None => 0,
        };
        self.last_timestamp = Some(now_ms);

        self.accumulator += delta;
        let fired = self.accumulator / self.interval_ms;
        self.accumulator -= fired * self.interval_ms;
        fired.min(u32::MAX as u64) as u32
    }
}
