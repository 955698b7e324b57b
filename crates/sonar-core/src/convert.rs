//! Tick-to-distance conversion.
//!
//! Total pure functions over the raw tick count captured by the pulse
//! timer. Parameterized by the capture clock's frequency and the
//! ambient air temperature; both are fixed platform constants here.

/// Frequency of the capture clock the tick domain is defined against.
pub const REFERENCE_CLOCK_HZ: u32 = 72_000_000;

/// Ambient temperature assumed for the speed of sound. A known
/// approximation; not user-configurable.
pub const REFERENCE_TEMPERATURE_C: f64 = 19.307;

/// Cair ≈ (331.3 + 0.606 ⋅ ϑ) m/s
pub fn speed_of_sound_mm_per_ms(temperature_c: f64) -> f64 {
    (331.3 + 0.606 * temperature_c) / 1000.0
}

pub fn speed_of_sound_cm_per_ms(temperature_c: f64) -> f64 {
    speed_of_sound_mm_per_ms(temperature_c) / 10.0
}

/// Echo round-trip time in milliseconds.
///
/// The trailing `/ 100.0` does not match a plain tick→ms conversion
/// for a 72 MHz clock, but it is what the shipped device computes.
/// TODO: validate the scale factor against real hardware before
/// changing it; display output is calibrated to this formula.
pub fn duration_to_ms(ticks: u64, clock_hz: u32) -> f64 {
    ticks as f64 / (clock_hz / 1_000_000) as f64 / 100.0
}

/// One-way distance for a round-trip echo of `ticks`, in whatever unit
/// `speed_per_ms` is expressed in. The `/ 2.0` accounts for the sound
/// travelling there and back.
pub fn duration_to_distance(ticks: u64, clock_hz: u32, speed_per_ms: f64) -> f64 {
    ticks as f64 / (clock_hz / 1_000_000) as f64 / 2.0 * speed_per_ms
}

pub fn duration_to_mm(ticks: u64, clock_hz: u32) -> f64 {
    duration_to_distance(
        ticks,
        clock_hz,
        speed_of_sound_mm_per_ms(REFERENCE_TEMPERATURE_C),
    )
}

pub fn duration_to_cm(ticks: u64, clock_hz: u32) -> f64 {
    duration_to_distance(
        ticks,
        clock_hz,
        speed_of_sound_cm_per_ms(REFERENCE_TEMPERATURE_C),
    )
}

/// Inches for display only; never stored.
pub fn cm_to_in(cm: f64) -> f64 {
    cm / 2.54
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn conversions_are_monotonic_in_ticks() {
        let mut prev_ms = -1.0;
        let mut prev_cm = -1.0;
        for ticks in [0u64, 1, 10, 720, 720_000, 7_200_000, u32::MAX as u64] {
            let ms = duration_to_ms(ticks, REFERENCE_CLOCK_HZ);
            let cm = duration_to_cm(ticks, REFERENCE_CLOCK_HZ);
            assert!(ms > prev_ms, "ms not increasing at {} ticks", ticks);
            assert!(cm > prev_cm, "cm not increasing at {} ticks", ticks);
            prev_ms = ms;
            prev_cm = cm;
        }
    }

    #[test]
    fn mm_and_cm_speeds_agree() {
        for ticks in [1u64, 144, 720_000, 9_999_999] {
            let mm = duration_to_mm(ticks, REFERENCE_CLOCK_HZ);
            let cm = duration_to_cm(ticks, REFERENCE_CLOCK_HZ);
            assert!((mm - cm * 10.0).abs() < EPS * mm.max(1.0));
        }
    }

    #[test]
    fn zero_ticks_yield_zero() {
        assert_eq!(duration_to_ms(0, REFERENCE_CLOCK_HZ), 0.0);
        assert_eq!(duration_to_cm(0, REFERENCE_CLOCK_HZ), 0.0);
        assert_eq!(duration_to_mm(0, REFERENCE_CLOCK_HZ), 0.0);
    }

    #[test]
    fn golden_reference_values() {
        // 720_000 ticks at 72 MHz with the 19.307 °C speed of sound.
        let ms = duration_to_ms(720_000, REFERENCE_CLOCK_HZ);
        let cm = duration_to_cm(720_000, REFERENCE_CLOCK_HZ);
        assert!((ms - 100.0).abs() < 1e-6);
        assert!((cm - 171.500021).abs() < 1e-6);
    }

    #[test]
    fn speed_of_sound_at_reference_temperature() {
        let v = speed_of_sound_mm_per_ms(REFERENCE_TEMPERATURE_C);
        assert!((v - 0.343000042).abs() < EPS);
    }

    #[test]
    fn inches_follow_cm() {
        assert!((cm_to_in(2.54) - 1.0).abs() < EPS);
        assert!((cm_to_in(171.500021) - 67.51969330708662).abs() < 1e-9);
    }
}
