//! Sensor lines on the Pi's serial header pins.
//!
//! The trigger and echo lines borrow the UART pins for the duration of
//! the session, so their original pin modes are captured up front and
//! restored on release.

use rppal::gpio::{Bias, Gpio, IoPin, Mode};
use sonar_core::hal::SonarLines;
use tracing::debug;

/// BCM 14, the serial TX pin, drives the sensor's trigger input.
pub const DEFAULT_TRIG_PIN: u8 = 14;
/// BCM 15, the serial RX pin, reads the sensor's echo output.
pub const DEFAULT_ECHO_PIN: u8 = 15;

pub struct RppalSonar {
    trig: IoPin,
    echo: IoPin,
    trig_restore: Mode,
    echo_restore: Mode,
}

impl RppalSonar {
    pub fn new(gpio: &Gpio, trig_pin: u8, echo_pin: u8) -> Result<Self, rppal::gpio::Error> {
        let trig = gpio.get(trig_pin)?;
        let echo = gpio.get(echo_pin)?;
        // On the serial header these read back as Alt0 (UART); whatever
        // they are, that is what release() puts back.
        let trig_restore = trig.mode();
        let echo_restore = echo.mode();
        debug!(trig_pin, echo_pin, "claimed sensor lines");
        Ok(Self {
            trig: trig.into_io(trig_restore),
            echo: echo.into_io(echo_restore),
            trig_restore,
            echo_restore,
        })
    }
}

impl SonarLines for RppalSonar {
    fn configure_for_measurement(&mut self) {
        self.trig.set_mode(Mode::Output);
        self.trig.set_low();
        self.echo.set_mode(Mode::Input);
        self.echo.set_bias(Bias::Off);
    }

    fn set_trigger(&mut self, high: bool) {
        if high {
            self.trig.set_high();
        } else {
            self.trig.set_low();
        }
    }

    fn echo_is_high(&self) -> bool {
        self.echo.is_high()
    }

    fn release(&mut self) {
        self.trig.set_mode(self.trig_restore);
        self.echo.set_mode(self.echo_restore);
        debug!("sensor lines restored to their prior mode");
    }
}
