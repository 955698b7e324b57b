//! Backend selection, resource lifecycle and the event loop.

use crate::feedback::TerminalNotifier;
use crate::hal_rppal::RppalSonar;
use crate::input::{spawn_stdin_reader, InputKey};
use crate::power::{BoostPowerRail, PowerRail, SimPowerRail, DEFAULT_SUPPLY_ONLINE};
use crate::rt::FifoSection;
use crate::runtime::config::RangerConfig;
use crate::runtime::logging;
use crate::session::{power_session_enter, power_session_exit, run_measurement, AppState};
use crate::ui::Ui;
use crossbeam::channel::{self, RecvTimeoutError};
use rppal::gpio::Gpio;
use sonar_core::hal::{Clock, CriticalSection, SonarLines};
use sonar_core::{EchoScript, PulseTimer, SimClock, SimLines, SimSection, SimulatedSonar, TimeBase};
use std::process::ExitCode;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info};

/// Scripted echo for `--sim` runs: a clean pulse that converts to just
/// under 50 cm.
const SIM_ECHO_RISE_NS: u64 = 500_000;
const SIM_ECHO_WIDTH_NS: u64 = 2_915_000;

#[derive(Debug, Error)]
pub enum RangerError {
    #[error("failed to claim GPIO resources: {0}")]
    ResourceInit(#[from] rppal::gpio::Error),
}

/// Sensor lines, real or scripted. Enum dispatch keeps the pulse timer
/// monomorphic over one concrete type per process.
enum RangerLines {
    Sim(SimLines),
    Gpio(RppalSonar),
}

impl SonarLines for RangerLines {
    fn configure_for_measurement(&mut self) {
        match self {
            RangerLines::Sim(l) => l.configure_for_measurement(),
            RangerLines::Gpio(l) => l.configure_for_measurement(),
        }
    }

    fn set_trigger(&mut self, high: bool) {
        match self {
            RangerLines::Sim(l) => l.set_trigger(high),
            RangerLines::Gpio(l) => l.set_trigger(high),
        }
    }

    fn echo_is_high(&self) -> bool {
        match self {
            RangerLines::Sim(l) => l.echo_is_high(),
            RangerLines::Gpio(l) => l.echo_is_high(),
        }
    }

    fn release(&mut self) {
        match self {
            RangerLines::Sim(l) => l.release(),
            RangerLines::Gpio(l) => l.release(),
        }
    }
}

enum RangerClock {
    Sim(SimClock),
    Host(TimeBase),
}

impl Clock for RangerClock {
    fn now_ms(&self) -> u64 {
        match self {
            RangerClock::Sim(c) => c.now_ms(),
            RangerClock::Host(c) => c.now_ms(),
        }
    }

    fn now_ticks(&self) -> u64 {
        match self {
            RangerClock::Sim(c) => c.now_ticks(),
            RangerClock::Host(c) => c.now_ticks(),
        }
    }

    fn tick_hz(&self) -> u32 {
        match self {
            RangerClock::Sim(c) => c.tick_hz(),
            RangerClock::Host(c) => c.tick_hz(),
        }
    }
}

enum RangerSection {
    Sim(SimSection),
    Fifo(FifoSection),
}

impl CriticalSection for RangerSection {
    fn enter(&mut self) {
        match self {
            RangerSection::Sim(s) => s.enter(),
            RangerSection::Fifo(s) => s.enter(),
        }
    }

    fn exit(&mut self) {
        match self {
            RangerSection::Sim(s) => s.exit(),
            RangerSection::Fifo(s) => s.exit(),
        }
    }
}

pub fn run_from_args() -> ExitCode {
    let config = RangerConfig::from_env();
    if config.show_help {
        RangerConfig::print_help();
        return ExitCode::SUCCESS;
    }

    logging::init_tracing(config.json_logs);

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "startup failed");
            ExitCode::from(255)
        }
    }
}

fn run(config: &RangerConfig) -> Result<(), RangerError> {
    let timeout = Duration::from_millis(config.timeout_ms);

    let mut power: Box<dyn PowerRail>;
    let lines;
    let clock;
    let section;

    if config.sim {
        info!("running against the scripted sensor");
        let sim = SimulatedSonar::new(EchoScript::pulse(SIM_ECHO_RISE_NS, SIM_ECHO_WIDTH_NS));
        power = Box::new(SimPowerRail::available());
        lines = RangerLines::Sim(sim.lines());
        clock = RangerClock::Sim(sim.clock());
        section = RangerSection::Sim(sim.section());
    } else {
        let gpio = Gpio::new()?;
        power = Box::new(BoostPowerRail::new(
            &gpio,
            config.boost_pin,
            DEFAULT_SUPPLY_ONLINE.into(),
        )?);
        lines = RangerLines::Gpio(RppalSonar::new(&gpio, config.trig_pin, config.echo_pin)?);
        clock = RangerClock::Host(TimeBase::new());
        section = RangerSection::Fifo(FifoSection::new());
    }

    let have_5v = power_session_enter(power.as_mut());
    let mut timer = PulseTimer::new(lines, clock, section);
    let mut state = AppState::new(have_5v);
    let ui = Ui::new(config.trig_pin, config.echo_pin);
    let mut notifier = TerminalNotifier;

    let (tx, rx) = channel::unbounded();
    let _reader = spawn_stdin_reader(tx);

    let deadline = config
        .run_seconds
        .map(|secs| Instant::now() + Duration::from_secs(secs));

    info!(
        trig_pin = config.trig_pin,
        echo_pin = config.echo_pin,
        have_5v,
        "session started"
    );
    ui.draw(&state);

    loop {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                info!("run duration elapsed");
                break;
            }
        }

        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => match event.key {
                InputKey::Ok => {
                    run_measurement(
                        &mut state,
                        &mut timer,
                        power.as_mut(),
                        &mut notifier,
                        timeout,
                    );
                }
                InputKey::Back => {
                    info!("exit requested");
                    break;
                }
                // No navigation on the single screen.
                InputKey::Up | InputKey::Down | InputKey::Left | InputKey::Right => {}
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        ui.draw(&state);
    }

    // Teardown mirrors bring-up: pins back to serial, then every power
    // override dropped. The reader thread ends on its own once stdin
    // closes.
    timer.release();
    power_session_exit(power.as_mut());
    info!("session ended");
    Ok(())
}
