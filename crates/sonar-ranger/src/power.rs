use rppal::gpio::{Gpio, OutputPin};
use std::path::{Path, PathBuf};
use tracing::debug;

/// The 5V supply the sensor runs from. Queried before every
/// measurement; the override must be dropped on exit no matter how the
/// session ends.
pub trait PowerRail {
    fn is_otg_enabled(&self) -> bool;
    fn is_charging(&self) -> bool;
    /// Try to bring the rail up. Returns whether it actually came up.
    fn enable_otg(&mut self) -> bool;
    fn disable_otg(&mut self);
    fn suppress_charge_enter(&mut self);
    fn suppress_charge_exit(&mut self);
}

/// Charger presence as exported by the kernel.
pub const DEFAULT_SUPPLY_ONLINE: &str = "/sys/class/power_supply/usb/online";

pub(crate) fn supply_is_online(path: &Path) -> bool {
    std::fs::read_to_string(path)
        .map(|s| s.trim() == "1")
        .unwrap_or(false)
}

/// Real rail: a boost-converter enable line plus the kernel's charger
/// presence flag. Charge suppression has no userspace control on this
/// platform, so it is tracked and logged only.
pub struct BoostPowerRail {
    boost_enable: OutputPin,
    supply_online: PathBuf,
    charge_suppressed: bool,
}

impl BoostPowerRail {
    pub fn new(
        gpio: &Gpio,
        boost_pin: u8,
        supply_online: PathBuf,
    ) -> Result<Self, rppal::gpio::Error> {
        let mut boost_enable = gpio.get(boost_pin)?.into_output();
        boost_enable.set_low();
        Ok(Self {
            boost_enable,
            supply_online,
            charge_suppressed: false,
        })
    }
}

impl PowerRail for BoostPowerRail {
    fn is_otg_enabled(&self) -> bool {
        self.boost_enable.is_set_high()
    }

    fn is_charging(&self) -> bool {
        supply_is_online(&self.supply_online)
    }

    fn enable_otg(&mut self) -> bool {
        self.boost_enable.set_high();
        true
    }

    fn disable_otg(&mut self) {
        self.boost_enable.set_low();
    }

    fn suppress_charge_enter(&mut self) {
        self.charge_suppressed = true;
        debug!("charge suppression requested for the session");
    }

    fn suppress_charge_exit(&mut self) {
        self.charge_suppressed = false;
        debug!("charge suppression released");
    }
}

/// Scriptable rail for tests and `--sim` runs.
#[derive(Debug)]
pub struct SimPowerRail {
    charging: bool,
    otg_supported: bool,
    otg_on: bool,
    suppress_depth: u32,
}

impl SimPowerRail {
    /// Rail comes up on request, as with a healthy boost converter.
    pub fn available() -> Self {
        Self {
            charging: false,
            otg_supported: true,
            otg_on: false,
            suppress_depth: 0,
        }
    }

    /// No charger and the boost converter refuses to start.
    pub fn unavailable() -> Self {
        Self {
            charging: false,
            otg_supported: false,
            otg_on: false,
            suppress_depth: 0,
        }
    }

    pub fn suppress_depth(&self) -> u32 {
        self.suppress_depth
    }
}

impl PowerRail for SimPowerRail {
    fn is_otg_enabled(&self) -> bool {
        self.otg_on
    }

    fn is_charging(&self) -> bool {
        self.charging
    }

    fn enable_otg(&mut self) -> bool {
        if self.otg_supported {
            self.otg_on = true;
        }
        self.otg_on
    }

    fn disable_otg(&mut self) {
        self.otg_on = false;
    }

    fn suppress_charge_enter(&mut self) {
        self.suppress_depth += 1;
    }

    fn suppress_charge_exit(&mut self) {
        self.suppress_depth = self.suppress_depth.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn supply_online_reads_the_kernel_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("online");

        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"1\n")
            .unwrap();
        assert!(supply_is_online(&path));

        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"0\n")
            .unwrap();
        assert!(!supply_is_online(&path));

        assert!(!supply_is_online(&dir.path().join("missing")));
    }

    #[test]
    fn unavailable_rail_refuses_to_come_up() {
        let mut rail = SimPowerRail::unavailable();
        assert!(!rail.enable_otg());
        assert!(!rail.is_otg_enabled());
    }

    #[test]
    fn available_rail_toggles() {
        let mut rail = SimPowerRail::available();
        assert!(!rail.is_otg_enabled());
        assert!(rail.enable_otg());
        assert!(rail.is_otg_enabled());
        rail.disable_otg();
        assert!(!rail.is_otg_enabled());
    }
}
