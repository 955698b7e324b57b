mod feedback;
mod hal_rppal;
mod input;
mod power;
mod rt;
mod runtime;
mod session;
mod ui;

use std::process::ExitCode;

fn main() -> ExitCode {
    runtime::run_from_args()
}
