use crate::hal::{Clock, CriticalSection, SonarLines};
use log::debug;
use std::time::Duration;
use thiserror::Error;

/// Width of the trigger pulse. Real HC-SR04 modules only need ~10 µs;
/// the shipped device drives the line for a full 20 ms and modules in
/// the field are calibrated against that, so keep it.
pub const TRIGGER_PULSE_MS: u64 = 20;

/// Upper bound on a whole measurement attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

/// Raw echo pulse width in capture-clock ticks. Opaque outside the
/// converter; only meaningful within the session that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawDuration(u64);

impl RawDuration {
    pub fn from_ticks(ticks: u64) -> Self {
        Self(ticks)
    }

    pub fn ticks(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PulseError {
    /// The echo line never produced a pulse: sensor absent, unpowered,
    /// or miswired. The protocol still ran to completion within the
    /// timeout.
    #[error("no echo pulse within {timeout_ms} ms")]
    NoEcho { timeout_ms: u64 },
}

/// Executes the trigger/echo protocol against a pair of GPIO lines and
/// returns the raw pulse width in clock ticks.
///
/// Single-shot and synchronous: each `measure` call reconfigures the
/// lines, runs the capture window inside the critical section, and
/// returns within the given timeout no matter what the sensor does.
/// The caller keeps the obligation to `release` the lines when the
/// measurement session ends.
pub struct PulseTimer<L, C, S>
where
    L: SonarLines,
    C: Clock,
    S: CriticalSection,
{
    lines: L,
    clock: C,
    section: S,
}

impl<L, C, S> PulseTimer<L, C, S>
where
    L: SonarLines,
    C: Clock,
    S: CriticalSection,
{
    pub fn new(lines: L, clock: C, section: S) -> Self {
        Self {
            lines,
            clock,
            section,
        }
    }

    pub fn tick_hz(&self) -> u32 {
        self.clock.tick_hz()
    }

    /// Trigger the sensor and capture the echo pulse width.
    ///
    /// Never blocks past `timeout`: each wait phase is bounded against
    /// one start timestamp, and an expired phase falls through with
    /// whatever timestamps were captured instead of aborting. A zero
    /// duration (the line never rose, or the timeout truncated the
    /// capture instantly) is reported as [`PulseError::NoEcho`].
    pub fn measure(&mut self, timeout: Duration) -> Result<RawDuration, PulseError> {
        let timeout_ms = timeout.as_millis() as u64;

        self.lines.set_trigger(false);
        self.lines.configure_for_measurement();

        self.section.enter();

        self.lines.set_trigger(true);
        self.spin_ms(TRIGGER_PULSE_MS);
        self.lines.set_trigger(false);

        let start = self.clock.now_ms();

        // Drain any stale pulse left over from a previous attempt.
        self.wait_while_level(true, start, timeout_ms);
        // Wait for the real echo to begin.
        let echo_began = !self.wait_while_level(false, start, timeout_ms);
        let begin = self.clock.now_ticks();
        // Ride the pulse out.
        self.wait_while_level(true, start, timeout_ms);
        let end = self.clock.now_ticks();

        self.section.exit();

        // A pulse that never began has zero width by definition; the
        // two timestamps only bracket clock-read latency then.
        let ticks = if echo_began {
            end.saturating_sub(begin)
        } else {
            0
        };
        debug!(
            "echo capture: {} ticks within a {} ms window",
            ticks, timeout_ms
        );

        if ticks > 0 {
            Ok(RawDuration(ticks))
        } else {
            Err(PulseError::NoEcho { timeout_ms })
        }
    }

    /// Restore the lines to their pre-session pin mode. Call once when
    /// the measurement session ends.
    pub fn release(&mut self) {
        self.lines.release();
    }

    /// Bounded spin: poll until the echo line leaves `level` or the
    /// deadline measured from `start` expires. Returns `true` when the
    /// deadline fired first.
    fn wait_while_level(&self, level: bool, start: u64, timeout_ms: u64) -> bool {
        loop {
            if self.clock.now_ms() - start >= timeout_ms {
                return true;
            }
            if self.lines.echo_is_high() != level {
                return false;
            }
        }
    }

    /// Busy millisecond delay on the deadline clock. Runs inside the
    /// critical section, so sleeping is not an option.
    fn spin_ms(&self, ms: u64) {
        let until = self.clock.now_ms() + ms;
        while self.clock.now_ms() < until {}
    }
}
