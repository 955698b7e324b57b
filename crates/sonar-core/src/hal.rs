/// The two serial-port pins repurposed as the sensor's trigger and echo
/// lines for the duration of a measurement session.
///
/// `configure_for_measurement` claims the pins (trigger as a push-pull
/// output driven low, echo as a floating input); `release` must hand
/// them back to their original alternate function. The caller that
/// constructed the lines owns the release obligation.
pub trait SonarLines {
    fn configure_for_measurement(&mut self);
    fn set_trigger(&mut self, high: bool);
    fn echo_is_high(&self) -> bool;
    fn release(&mut self);
}

/// Monotonic time source spanning both clock domains the protocol
/// needs: a coarse millisecond tick for deadlines and a fine cycle
/// counter for pulse-width capture.
///
/// Tick values are only comparable against ticks from the same clock
/// instance within one session.
pub trait Clock {
    fn now_ms(&self) -> u64;
    fn now_ticks(&self) -> u64;
    fn tick_hz(&self) -> u32;
}

/// "No preemption during capture" capability. The pulse capture window
/// is the only hard real-time region in the system; scheduling jitter
/// inside it corrupts sub-millisecond timing.
///
/// Implementations pick whatever mechanism the platform offers.
/// `exit` must always follow `enter` before `measure` returns.
pub trait CriticalSection {
    fn enter(&mut self);
    fn exit(&mut self);
}

/// Section that does nothing. For hosts where no preemption control is
/// available or needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreemptibleSection;

impl CriticalSection for PreemptibleSection {
    fn enter(&mut self) {}
    fn exit(&mut self) {}
}
