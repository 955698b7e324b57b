use crate::hal_rppal::{DEFAULT_ECHO_PIN, DEFAULT_TRIG_PIN};

/// Boost-converter enable line for the sensor's 5V rail.
pub const DEFAULT_BOOST_PIN: u8 = 16;

#[derive(Debug, Clone)]
pub struct RangerConfig {
    pub show_help: bool,
    pub sim: bool,
    pub trig_pin: u8,
    pub echo_pin: u8,
    pub boost_pin: u8,
    pub timeout_ms: u64,
    pub run_seconds: Option<u64>,
    pub json_logs: bool,
}

impl Default for RangerConfig {
    fn default() -> Self {
        Self {
            show_help: false,
            sim: false,
            trig_pin: DEFAULT_TRIG_PIN,
            echo_pin: DEFAULT_ECHO_PIN,
            boost_pin: DEFAULT_BOOST_PIN,
            timeout_ms: 2000,
            run_seconds: None,
            json_logs: false,
        }
    }
}

impl RangerConfig {
    pub fn from_env() -> Self {
        let args: Vec<String> = std::env::args().collect();
        Self::from_args(&args)
    }

    pub fn from_args(args: &[String]) -> Self {
        let mut cfg = RangerConfig::default();
        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--sim" => {
                    cfg.sim = true;
                }
                "--trig-pin" => {
                    if i + 1 < args.len() {
                        cfg.trig_pin = args[i + 1].parse().unwrap_or(DEFAULT_TRIG_PIN);
                        i += 1;
                    }
                }
                "--echo-pin" => {
                    if i + 1 < args.len() {
                        cfg.echo_pin = args[i + 1].parse().unwrap_or(DEFAULT_ECHO_PIN);
                        i += 1;
                    }
                }
                "--boost-pin" => {
                    if i + 1 < args.len() {
                        cfg.boost_pin = args[i + 1].parse().unwrap_or(DEFAULT_BOOST_PIN);
                        i += 1;
                    }
                }
                "--timeout-ms" => {
                    if i + 1 < args.len() {
                        cfg.timeout_ms = args[i + 1].parse().unwrap_or(2000);
                        i += 1;
                    }
                }
                "--run-seconds" => {
                    if i + 1 < args.len() {
                        cfg.run_seconds = args[i + 1].parse::<u64>().ok();
                        i += 1;
                    }
                }
                "--json-logs" => {
                    cfg.json_logs = true;
                }
                "--help" | "-h" => {
                    cfg.show_help = true;
                    break;
                }
                _ => {}
            }
            i += 1;
        }
        cfg
    }

    pub fn print_help() {
        println!(
            r#"sonar-ranger - HC-SR04 ultrasonic distance sensor session

USAGE:
    sonar-ranger [OPTIONS]

OPTIONS:
    --sim                   Run against the scripted sensor (no GPIO access)
    --trig-pin <BCM>        Trigger line, repurposed serial TX pin [default: 14]
    --echo-pin <BCM>        Echo line, repurposed serial RX pin [default: 15]
    --boost-pin <BCM>       5V boost-converter enable line [default: 16]
    --timeout-ms <MS>       Per-measurement timeout [default: 2000]
    --run-seconds <SECS>    Exit after a fixed duration
    --json-logs             Output logs in JSON format (for log aggregation)
    -h, --help              Print this help message

KEYS:
    m / Enter               Trigger a measurement
    q                       Exit (pins are restored to serial mode)
    w a s d                 Navigation (no effect on this screen)

ENVIRONMENT VARIABLES:
    RUST_LOG                Set log filter (e.g., RUST_LOG=debug,sonar_ranger=trace)

EXAMPLES:
    # Measure with the sensor wired to the serial header
    sonar-ranger

    # Headless smoke run against the scripted sensor
    sonar-ranger --sim --run-seconds 5
"#
        );
    }
}
