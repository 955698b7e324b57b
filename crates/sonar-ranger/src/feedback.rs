//! Fixed visual+audible notification sequences.
//!
//! One sequence for a successful capture, one for failure (power
//! missing or no echo), plus the blink pair bracketing a measurement
//! in flight.

use std::io::Write;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationMessage {
    BacklightOn,
    LedGreen,
    LedRed,
    BlinkStartYellow,
    BlinkStop,
    NoteC5,
    NoteC1,
    DelayMs(u64),
    SoundOff,
}

use NotificationMessage::*;

pub const SEQUENCE_SUCCESS: &[NotificationMessage] =
    &[BacklightOn, LedGreen, NoteC5, DelayMs(50), SoundOff];

pub const SEQUENCE_FAIL: &[NotificationMessage] =
    &[BacklightOn, LedRed, NoteC1, DelayMs(50), SoundOff];

pub const SEQUENCE_BLINK_START_YELLOW: &[NotificationMessage] = &[BlinkStartYellow];

pub const SEQUENCE_BLINK_STOP: &[NotificationMessage] = &[BlinkStop];

pub trait Notifier {
    fn message(&mut self, sequence: &[NotificationMessage]);
}

/// Plays sequences on the terminal: colored status dot on stderr, BEL
/// for the notes. Crude, but it keeps the feedback channel separate
/// from the rendered screen on stdout.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn message(&mut self, sequence: &[NotificationMessage]) {
        let mut err = std::io::stderr();
        for step in sequence {
            match step {
                BacklightOn => {}
                LedGreen => {
                    let _ = write!(err, "\x1b[32m\u{25cf}\x1b[0m");
                }
                LedRed => {
                    let _ = write!(err, "\x1b[31m\u{25cf}\x1b[0m");
                }
                BlinkStartYellow => {
                    let _ = write!(err, "\x1b[33m\u{25cc}\x1b[0m");
                }
                BlinkStop => {
                    let _ = write!(err, "\r");
                }
                NoteC5 | NoteC1 => {
                    let _ = write!(err, "\x07");
                }
                DelayMs(ms) => {
                    let _ = err.flush();
                    std::thread::sleep(Duration::from_millis(*ms));
                }
                SoundOff => {}
            }
        }
        let _ = err.flush();
    }
}

/// Captures sequences for assertions.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub sequences: Vec<Vec<NotificationMessage>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count_of(&self, sequence: &[NotificationMessage]) -> usize {
        self.sequences
            .iter()
            .filter(|s| s.as_slice() == sequence)
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn message(&mut self, sequence: &[NotificationMessage]) {
        self.sequences.push(sequence.to_vec());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_and_fail_sequences_differ_only_in_color_and_note() {
        assert_eq!(SEQUENCE_SUCCESS.len(), SEQUENCE_FAIL.len());
        assert_eq!(SEQUENCE_SUCCESS[0], SEQUENCE_FAIL[0]);
        assert_ne!(SEQUENCE_SUCCESS[1], SEQUENCE_FAIL[1]);
        assert_ne!(SEQUENCE_SUCCESS[2], SEQUENCE_FAIL[2]);
        assert_eq!(SEQUENCE_SUCCESS[3], DelayMs(50));
        assert_eq!(SEQUENCE_SUCCESS[4], SoundOff);
    }

    #[test]
    fn recording_notifier_counts_sequences() {
        let mut rec = RecordingNotifier::new();
        rec.message(SEQUENCE_FAIL);
        rec.message(SEQUENCE_BLINK_STOP);
        rec.message(SEQUENCE_FAIL);
        assert_eq!(rec.count_of(SEQUENCE_FAIL), 2);
        assert_eq!(rec.count_of(SEQUENCE_SUCCESS), 0);
    }
}
