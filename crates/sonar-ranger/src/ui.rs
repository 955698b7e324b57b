use crate::session::AppState;
use sonar_core::convert::cm_to_in;
use std::io::Write;

/// Renders the session screen. Three states: rail missing,
/// idle/instructions, and the latest result (which is shown as an
/// explicit failure when the attempt produced no echo).
pub struct Ui {
    trig_pin: u8,
    echo_pin: u8,
}

impl Ui {
    pub fn new(trig_pin: u8, echo_pin: u8) -> Self {
        Self { trig_pin, echo_pin }
    }

    pub fn render(&self, state: &AppState) -> String {
        let mut screen = String::from("HC-SR04 Ultrasonic\nDistance Sensor\n\n");

        if !state.have_5v {
            screen.push_str("5V on GPIO must be\nenabled, or USB must\nbe connected.\n");
            return screen;
        }

        match &state.last {
            None => {
                screen.push_str("Press OK to measure\n");
                screen.push_str(&format!(
                    "GPIO{}/TX -> Trig\nGPIO{}/RX -> Echo\n",
                    self.trig_pin, self.echo_pin
                ));
            }
            Some(result) if result.valid => {
                screen.push_str(&format!("Echo: {:.2} ms\n", result.echo_time_ms));
                screen.push_str(&format!("Distance: {:.2} cm\n", result.distance_cm));
                screen.push_str(&format!("Distance: {:.2} in\n", cm_to_in(result.distance_cm)));
            }
            Some(_) => {
                screen.push_str("No echo received.\nCheck wiring and\nmeasure again.\n");
            }
        }
        screen
    }

    /// Clear the terminal and redraw. Draw errors are ignored; the
    /// screen is best-effort output.
    pub fn draw(&self, state: &AppState) {
        let mut out = std::io::stdout();
        let _ = write!(out, "\x1b[2J\x1b[H{}", self.render(state));
        let _ = out.flush();
    }
}
