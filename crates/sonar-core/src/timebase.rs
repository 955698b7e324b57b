use crate::convert::REFERENCE_CLOCK_HZ;
use crate::hal::Clock;
use std::time::Instant;

/// Host clock for real measurement sessions.
///
/// The device's cycle counter runs at [`REFERENCE_CLOCK_HZ`]; here the
/// tick domain is synthesized from `Instant` nanoseconds at exactly
/// that rate so raw durations convert with the same constants on every
/// platform.
#[derive(Debug, Clone, Copy)]
pub struct TimeBase {
    start: Instant,
    tick_hz: u32,
}

impl TimeBase {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            tick_hz: REFERENCE_CLOCK_HZ,
        }
    }
}

impl Default for TimeBase {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TimeBase {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn now_ticks(&self) -> u64 {
        let ns = self.start.elapsed().as_nanos();
        (ns * self.tick_hz as u128 / 1_000_000_000) as u64
    }

    fn tick_hz(&self) -> u32 {
        self.tick_hz
    }
}
