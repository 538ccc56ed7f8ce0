//! Time source for debouncing, result holds and card polling.

use embedded_hal::delay::DelayNs;

/// Monotonic millisecond clock that can also block.
///
/// On hardware this is the system tick plus the HAL delay; the simulator uses
/// `std::time`; tests use [`ManualClock`].
pub trait Clock: DelayNs {
    /// Milliseconds since boot.
    fn now_ms(&self) -> u64;
}

/// Virtual clock where time only moves when someone delays on it.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now_ns: u64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_ms(&mut self, ms: u64) {
        self.now_ns += ms * 1_000_000;
    }
}

impl DelayNs for ManualClock {
    fn delay_ns(&mut self, ns: u32) {
        self.now_ns += u64::from(ns);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ns / 1_000_000
    }
}
