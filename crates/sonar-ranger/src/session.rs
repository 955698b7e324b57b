//! Session state and the measurement action.

use crate::feedback::{
    Notifier, SEQUENCE_BLINK_START_YELLOW, SEQUENCE_BLINK_STOP, SEQUENCE_FAIL, SEQUENCE_SUCCESS,
};
use crate::power::PowerRail;
use sonar_core::hal::{Clock, CriticalSection, SonarLines};
use sonar_core::{MeasurementResult, PulseTimer};
use std::time::Duration;
use tracing::{info, warn};

/// All mutable session state. Owned by the event-loop thread and
/// passed by reference into each handler; the input thread only talks
/// to it through the event queue, so one measurement at a time is
/// structural.
#[derive(Debug)]
pub struct AppState {
    pub have_5v: bool,
    pub last: Option<MeasurementResult>,
}

impl AppState {
    pub fn new(have_5v: bool) -> Self {
        Self {
            have_5v,
            last: None,
        }
    }
}

/// Bring the 5V rail up for the session. Returns whether the rail is
/// available.
pub fn power_session_enter(power: &mut dyn PowerRail) -> bool {
    power.suppress_charge_enter();
    if power.is_otg_enabled() || power.is_charging() {
        true
    } else {
        power.enable_otg()
    }
}

/// Drop every power override, no matter how the session ended.
pub fn power_session_exit(power: &mut dyn PowerRail) {
    if power.is_otg_enabled() {
        power.disable_otg();
    }
    power.suppress_charge_exit();
}

/// One measurement attempt: power re-check, capture, convert, store,
/// feedback. Every failure path is recoverable; the session keeps
/// running.
pub fn run_measurement<L, C, S>(
    state: &mut AppState,
    timer: &mut PulseTimer<L, C, S>,
    power: &mut dyn PowerRail,
    notifier: &mut dyn Notifier,
    timeout: Duration,
) where
    L: SonarLines,
    C: Clock,
    S: CriticalSection,
{
    // The rail can drop between attempts (USB unplugged). Refuse the
    // measurement before any pin is touched when it cannot come back.
    if !state.have_5v {
        if power.is_otg_enabled() || power.is_charging() {
            state.have_5v = true;
        } else {
            warn!("5V rail unavailable; measurement refused");
            notifier.message(SEQUENCE_FAIL);
            return;
        }
    }

    notifier.message(SEQUENCE_BLINK_START_YELLOW);
    let outcome = timer.measure(timeout);
    let result = MeasurementResult::from_pulse(outcome, timer.tick_hz());
    notifier.message(SEQUENCE_BLINK_STOP);

    if result.valid {
        info!(
            echo_ms = result.echo_time_ms,
            distance_cm = result.distance_cm,
            "measurement complete"
        );
        notifier.message(SEQUENCE_SUCCESS);
    } else {
        warn!("no echo from sensor");
        notifier.message(SEQUENCE_FAIL);
    }
    state.last = Some(result);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::RecordingNotifier;
    use crate::power::SimPowerRail;
    use sonar_core::{EchoScript, SimulatedSonar, DEFAULT_TIMEOUT};

    fn timer_for(
        sim: &SimulatedSonar,
    ) -> PulseTimer<sonar_core::SimLines, sonar_core::SimClock, sonar_core::SimSection> {
        PulseTimer::new(sim.lines(), sim.clock(), sim.section())
    }

    #[test]
    fn refused_measurement_leaves_gpio_untouched_and_fails_once() {
        let sim = SimulatedSonar::new(EchoScript::pulse(300_000, 2_000_000));
        let mut timer = timer_for(&sim);
        let mut power = SimPowerRail::unavailable();
        let mut notifier = RecordingNotifier::new();
        let mut state = AppState::new(false);

        run_measurement(
            &mut state,
            &mut timer,
            &mut power,
            &mut notifier,
            DEFAULT_TIMEOUT,
        );

        assert_eq!(sim.configure_calls(), 0);
        assert_eq!(notifier.count_of(SEQUENCE_FAIL), 1);
        assert_eq!(notifier.sequences.len(), 1);
        assert!(state.last.is_none());
    }

    #[test]
    fn rail_recovery_is_picked_up_on_the_next_attempt() {
        let sim = SimulatedSonar::new(EchoScript::pulse(300_000, 2_000_000));
        let mut timer = timer_for(&sim);
        let mut power = SimPowerRail::available();
        power.enable_otg();
        let mut notifier = RecordingNotifier::new();
        let mut state = AppState::new(false);

        run_measurement(
            &mut state,
            &mut timer,
            &mut power,
            &mut notifier,
            DEFAULT_TIMEOUT,
        );

        assert!(state.have_5v);
        assert!(state.last.expect("result stored").valid);
        assert_eq!(notifier.count_of(SEQUENCE_SUCCESS), 1);
    }

    #[test]
    fn successful_capture_stores_a_valid_result() {
        let sim = SimulatedSonar::new(EchoScript::pulse(300_000, 2_915_000));
        let mut timer = timer_for(&sim);
        let mut power = SimPowerRail::available();
        let mut notifier = RecordingNotifier::new();
        let mut state = AppState::new(true);

        run_measurement(
            &mut state,
            &mut timer,
            &mut power,
            &mut notifier,
            DEFAULT_TIMEOUT,
        );

        let result = state.last.expect("result stored");
        assert!(result.valid);
        assert!(result.distance_cm > 45.0 && result.distance_cm < 55.0);
        assert_eq!(notifier.count_of(SEQUENCE_BLINK_START_YELLOW), 1);
        assert_eq!(notifier.count_of(SEQUENCE_BLINK_STOP), 1);
        assert_eq!(notifier.count_of(SEQUENCE_SUCCESS), 1);
        assert_eq!(notifier.count_of(SEQUENCE_FAIL), 0);
    }

    #[test]
    fn timeout_overwrites_the_previous_result_as_failed() {
        let sim = SimulatedSonar::new(EchoScript::silent());
        let mut timer = timer_for(&sim);
        let mut power = SimPowerRail::available();
        let mut notifier = RecordingNotifier::new();
        let mut state = AppState::new(true);
        state.last = Some(MeasurementResult {
            echo_time_ms: 100.0,
            distance_cm: 171.5,
            valid: true,
        });

        run_measurement(
            &mut state,
            &mut timer,
            &mut power,
            &mut notifier,
            DEFAULT_TIMEOUT,
        );

        let result = state.last.expect("attempt recorded");
        assert!(!result.valid);
        assert_eq!(notifier.count_of(SEQUENCE_FAIL), 1);
    }

    #[test]
    fn power_session_is_symmetric() {
        let mut power = SimPowerRail::available();
        assert!(power_session_enter(&mut power));
        assert!(power.is_otg_enabled());
        assert_eq!(power.suppress_depth(), 1);

        power_session_exit(&mut power);
        assert!(!power.is_otg_enabled());
        assert_eq!(power.suppress_depth(), 0);
    }

    #[test]
    fn power_session_reports_missing_rail() {
        let mut power = SimPowerRail::unavailable();
        assert!(!power_session_enter(&mut power));
        power_session_exit(&mut power);
    }
}
