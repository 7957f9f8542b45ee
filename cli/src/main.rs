mod commands;
mod terminal;

use std::process::ExitCode;

use commands::{CommandLine, monitor};
use reachr_common::config::Config;
use reachr_common::error;
use reachr_core::monitor::MonitorError;
use terminal::{logging, print};

/// Exit status when the run never started because no targets were loaded.
const EXIT_NO_TARGETS: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let commands: CommandLine = CommandLine::parse_args();

    logging::init(commands.quiet);
    print::banner(commands.no_banner, commands.quiet);

    let (kind, args) = commands.command.split();
    let cfg: Config = args.into_config(kind, commands.quiet);

    match monitor::monitor(cfg).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) if e.downcast_ref::<MonitorError>() == Some(&MonitorError::NoTargets) => {
            error!("{e}");
            ExitCode::from(EXIT_NO_TARGETS)
        }
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
