use crate::convert;
use crate::pulse::{PulseError, RawDuration};

/// Outcome of one measurement attempt. Overwrites the previous result;
/// only the latest attempt is retained.
///
/// `echo_time_ms` and `distance_cm` are meaningful only when `valid`
/// is set. A timed-out or silent sensor produces an invalid result so
/// the failed attempt can never be presented as a fresh reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementResult {
    pub echo_time_ms: f64,
    pub distance_cm: f64,
    pub valid: bool,
}

impl MeasurementResult {
    pub fn from_pulse(outcome: Result<RawDuration, PulseError>, clock_hz: u32) -> Self {
        match outcome {
            Ok(raw) => Self {
                echo_time_ms: convert::duration_to_ms(raw.ticks(), clock_hz),
                distance_cm: convert::duration_to_cm(raw.ticks(), clock_hz),
                valid: true,
            },
            Err(PulseError::NoEcho { .. }) => Self::failed(),
        }
    }

    pub fn failed() -> Self {
        Self {
            echo_time_ms: 0.0,
            distance_cm: 0.0,
            valid: false,
        }
    }
}
