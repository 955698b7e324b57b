//! Scripted sensor for host tests and `--sim` runs.
//!
//! One shared cell models the pins, the clock and the critical section
//! together so a scripted echo pulse can be replayed against virtual
//! time. Every poll advances the virtual clock by a fixed cost, which
//! makes the pulse timer's spin loops terminate instantly in wall time
//! while preserving their timing semantics.

use crate::convert::REFERENCE_CLOCK_HZ;
use crate::hal::{Clock, CriticalSection, SonarLines};
use std::cell::RefCell;
use std::rc::Rc;

/// Virtual time consumed by a single line or clock poll.
const POLL_COST_NS: u64 = 5_000;

/// One echo response, referenced to the trigger's falling edge.
#[derive(Debug, Clone, Copy)]
pub struct EchoPulse {
    pub rise_after_ns: u64,
    /// `None` models a line that rises and never falls.
    pub width_ns: Option<u64>,
}

/// What the echo line does during a measurement.
#[derive(Debug, Clone, Copy)]
pub struct EchoScript {
    /// The line reads high for this long right after the pins are
    /// configured, as if a previous pulse were still in flight.
    pub stale_high_ns: u64,
    /// `None` models an absent or unpowered sensor.
    pub response: Option<EchoPulse>,
}

impl EchoScript {
    /// Sensor absent: the echo line never rises.
    pub fn silent() -> Self {
        Self {
            stale_high_ns: 0,
            response: None,
        }
    }

    /// Clean echo pulse of `width_ns` starting `rise_after_ns` past
    /// the trigger's falling edge.
    pub fn pulse(rise_after_ns: u64, width_ns: u64) -> Self {
        Self {
            stale_high_ns: 0,
            response: Some(EchoPulse {
                rise_after_ns,
                width_ns: Some(width_ns),
            }),
        }
    }

    /// Echo rises and stays high, as with a shorted line.
    pub fn stuck_high(rise_after_ns: u64) -> Self {
        Self {
            stale_high_ns: 0,
            response: Some(EchoPulse {
                rise_after_ns,
                width_ns: None,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PinMode {
    SerialAlternate,
    Measurement,
}

#[derive(Debug)]
struct SimInner {
    now_ns: u64,
    script: EchoScript,
    mode: PinMode,
    trigger_high: bool,
    configured_at_ns: u64,
    trigger_fell_at_ns: Option<u64>,
    configure_calls: u32,
    release_calls: u32,
    section_enters: u32,
    section_exits: u32,
}

impl SimInner {
    fn advance(&mut self) -> u64 {
        let sampled = self.now_ns;
        self.now_ns += POLL_COST_NS;
        sampled
    }

    fn echo_level_at(&self, t_ns: u64) -> bool {
        if self.mode != PinMode::Measurement {
            return false;
        }
        if t_ns >= self.configured_at_ns
            && t_ns < self.configured_at_ns + self.script.stale_high_ns
        {
            return true;
        }
        let (fell_at, pulse) = match (self.trigger_fell_at_ns, self.script.response) {
            (Some(f), Some(p)) => (f, p),
            _ => return false,
        };
        let rise = fell_at + pulse.rise_after_ns;
        match pulse.width_ns {
            Some(w) => t_ns >= rise && t_ns < rise + w,
            None => t_ns >= rise,
        }
    }
}

/// Handle owning the simulated sensor; hands out capability views and
/// exposes probes for assertions.
#[derive(Debug, Clone)]
pub struct SimulatedSonar {
    inner: Rc<RefCell<SimInner>>,
}

impl SimulatedSonar {
    pub fn new(script: EchoScript) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SimInner {
                now_ns: 0,
                script,
                mode: PinMode::SerialAlternate,
                trigger_high: false,
                configured_at_ns: 0,
                trigger_fell_at_ns: None,
                configure_calls: 0,
                release_calls: 0,
                section_enters: 0,
                section_exits: 0,
            })),
        }
    }

    pub fn lines(&self) -> SimLines {
        SimLines {
            inner: Rc::clone(&self.inner),
        }
    }

    pub fn clock(&self) -> SimClock {
        SimClock {
            inner: Rc::clone(&self.inner),
        }
    }

    pub fn section(&self) -> SimSection {
        SimSection {
            inner: Rc::clone(&self.inner),
        }
    }

    pub fn poll_cost_ns(&self) -> u64 {
        POLL_COST_NS
    }

    /// Virtual milliseconds since construction.
    pub fn elapsed_ms(&self) -> u64 {
        self.inner.borrow().now_ns / 1_000_000
    }

    pub fn trigger_is_high(&self) -> bool {
        self.inner.borrow().trigger_high
    }

    pub fn in_measurement_mode(&self) -> bool {
        self.inner.borrow().mode == PinMode::Measurement
    }

    pub fn configure_calls(&self) -> u32 {
        self.inner.borrow().configure_calls
    }

    pub fn release_calls(&self) -> u32 {
        self.inner.borrow().release_calls
    }

    pub fn sections_balanced(&self) -> bool {
        let inner = self.inner.borrow();
        inner.section_enters > 0 && inner.section_enters == inner.section_exits
    }
}

/// `SonarLines` view of the simulated sensor.
#[derive(Debug, Clone)]
pub struct SimLines {
    inner: Rc<RefCell<SimInner>>,
}

impl SonarLines for SimLines {
    fn configure_for_measurement(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.mode = PinMode::Measurement;
        inner.configured_at_ns = inner.now_ns;
        inner.configure_calls += 1;
    }

    fn set_trigger(&mut self, high: bool) {
        let mut inner = self.inner.borrow_mut();
        if inner.trigger_high && !high {
            inner.trigger_fell_at_ns = Some(inner.now_ns);
        }
        inner.trigger_high = high;
    }

    fn echo_is_high(&self) -> bool {
        let mut inner = self.inner.borrow_mut();
        let t = inner.advance();
        inner.echo_level_at(t)
    }

    fn release(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.mode = PinMode::SerialAlternate;
        inner.release_calls += 1;
    }
}

/// `Clock` view of the simulated sensor's virtual time.
#[derive(Debug, Clone)]
pub struct SimClock {
    inner: Rc<RefCell<SimInner>>,
}

impl Clock for SimClock {
    fn now_ms(&self) -> u64 {
        self.inner.borrow_mut().advance() / 1_000_000
    }

    fn now_ticks(&self) -> u64 {
        let sampled = self.inner.borrow_mut().advance();
        sampled * (REFERENCE_CLOCK_HZ as u64 / 1_000_000) / 1_000
    }

    fn tick_hz(&self) -> u32 {
        REFERENCE_CLOCK_HZ
    }
}

/// Counting critical section; the probes assert enter/exit pairing.
#[derive(Debug, Clone)]
pub struct SimSection {
    inner: Rc<RefCell<SimInner>>,
}

impl CriticalSection for SimSection {
    fn enter(&mut self) {
        self.inner.borrow_mut().section_enters += 1;
    }

    fn exit(&mut self) {
        self.inner.borrow_mut().section_exits += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_follows_the_scripted_pulse() {
        let sim = SimulatedSonar::new(EchoScript::pulse(10_000, 20_000));
        let mut lines = sim.lines();
        lines.configure_for_measurement();
        lines.set_trigger(true);
        lines.set_trigger(false);

        let mut seen_high = false;
        let mut seen_low_after_high = false;
        for _ in 0..20 {
            let high = lines.echo_is_high();
            if high {
                seen_high = true;
            } else if seen_high {
                seen_low_after_high = true;
            }
        }
        assert!(seen_high && seen_low_after_high);
    }

    #[test]
    fn echo_is_low_in_serial_mode() {
        let sim = SimulatedSonar::new(EchoScript::stuck_high(0));
        let mut lines = sim.lines();
        lines.set_trigger(true);
        lines.set_trigger(false);
        assert!(!lines.echo_is_high());
    }

    #[test]
    fn clock_domains_agree() {
        let sim = SimulatedSonar::new(EchoScript::silent());
        let clock = sim.clock();
        for _ in 0..250 {
            let _ = clock.now_ms();
        }
        // 250 polls at 5 µs each plus the sampling poll itself.
        let ms = clock.now_ms();
        assert_eq!(ms, 1);
        assert!(clock.now_ticks() > 72_000); // past 1 ms of 72 MHz ticks
    }
}
