use reachr_common::config::Config;
use reachr_common::warn;
use reachr_core::monitor::Monitor;
use reachr_core::scheduler::{RunSummary, Shutdown};
use tokio::task::JoinHandle;

use crate::terminal::print;

pub async fn monitor(cfg: Config) -> anyhow::Result<RunSummary> {
    print::config_summary(&cfg);
    let quiet: u8 = cfg.quiet;
    let monitor: Monitor = Monitor::prepare(cfg)?;

    let shutdown: Shutdown = Shutdown::new();
    let listener: JoinHandle<()> = tokio::spawn(listen_for_interrupts(shutdown.clone()));

    print::header("monitoring", quiet);
    let summary: RunSummary = monitor.run(&shutdown).await;
    listener.abort();

    print::run_summary(&summary, quiet);
    Ok(summary)
}

/// First Ctrl+C stops new cycles, the second kills what is still running.
async fn listen_for_interrupts(shutdown: Shutdown) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for Ctrl+C: {e}");
        return;
    }
    warn!("Stopping after the current cycle, press Ctrl+C again to force");
    shutdown.request_stop();

    if tokio::signal::ctrl_c().await.is_ok() {
        warn!("Forcing stop");
        shutdown.request_abort();
    }
}
