pub mod convert;
pub mod hal;
#[cfg(feature = "simulation")]
pub mod hal_sim;
pub mod measurement;
pub mod pulse;
pub mod timebase;

pub use convert::{REFERENCE_CLOCK_HZ, REFERENCE_TEMPERATURE_C};
pub use hal::{Clock, CriticalSection, PreemptibleSection, SonarLines};
#[cfg(feature = "simulation")]
pub use hal_sim::{EchoPulse, EchoScript, SimClock, SimLines, SimSection, SimulatedSonar};
pub use measurement::MeasurementResult;
pub use pulse::{PulseError, PulseTimer, RawDuration, DEFAULT_TIMEOUT, TRIGGER_PULSE_MS};
pub use timebase::TimeBase;
