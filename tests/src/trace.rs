use std::path::PathBuf;
use std::time::{Duration, Instant};

use reachr_common::config::StopPolicy;
use reachr_common::probe::ProbeKind;
use reachr_core::monitor::Monitor;
use reachr_core::scheduler::RunSummary;

use crate::harness::{Workspace, artifact, read, run_for, script};

const THREE_HOPS: &str = "echo \"traceroute to $1 ($1), 30 hops max, 60 byte packets\"; \
    echo ' 1  10.0.0.1  0.4 ms'; \
    echo ' 2  10.0.0.2  0.9 ms'; \
    echo \" 3  $1  1.3 ms\"; \
    echo 'Trace complete.'";

#[tokio::test]
async fn streamed_trace_is_recorded_with_header_and_trailer() -> anyhow::Result<()> {
    let ws: Workspace = Workspace::with_targets("10.0.0.3\n")?;
    let monitor: Monitor =
        Monitor::prepare(ws.config(ProbeKind::Trace))?.with_command(script(THREE_HOPS));
    let path: PathBuf = artifact(&monitor, "10.0.0.3", ProbeKind::Trace)?;
    assert!(path.to_string_lossy().contains("trace_10_0_0_3_"));

    let summary: RunSummary = run_for(monitor, Duration::from_millis(500)).await;
    assert_eq!(summary.completed, 1);

    let text: String = read(&path)?;
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].ends_with(" - 10.0.0.3 - SUCCESS"), "{text}");
    assert!(lines[1].starts_with("traceroute to 10.0.0.3"));
    assert_eq!(lines.iter().filter(|l| l.starts_with('[')).count(), 3);
    assert!(lines[5].starts_with("Trace complete - Total time: "));
    assert!(lines[6].starts_with("Trace succeeded - Total time: "));
    assert!(text.ends_with("ms\n\n"));
    Ok(())
}

#[tokio::test]
async fn overdue_trace_keeps_partial_output() -> anyhow::Result<()> {
    let ws: Workspace = Workspace::with_targets("10.0.0.3\n")?;
    let mut cfg = ws.config(ProbeKind::Trace);
    cfg.timeout = Duration::from_millis(400);
    cfg.stop_policy = StopPolicy::Drain;

    let monitor: Monitor = Monitor::prepare(cfg)?
        .with_command(script("echo ' 1  10.0.0.1  0.4 ms'; sleep 5"));
    let path: PathBuf = artifact(&monitor, "10.0.0.3", ProbeKind::Trace)?;

    run_for(monitor, Duration::from_millis(100)).await;

    let text: String = read(&path)?;
    assert!(text.contains(" - 10.0.0.3 - TIMEOUT\n"), "{text}");
    assert!(text.contains("] 1  10.0.0.1  0.4 ms\n"));
    assert!(text.contains("] Process timed out\n"));
    assert!(text.contains("Trace timed out - Total time: "));
    Ok(())
}

#[tokio::test]
async fn abandoned_traces_do_not_hold_up_shutdown() -> anyhow::Result<()> {
    let ws: Workspace = Workspace::with_targets("10.0.0.1\n10.0.0.2\n")?;
    let mut cfg = ws.config(ProbeKind::Trace);
    cfg.stop_policy = StopPolicy::Abandon;

    let monitor: Monitor = Monitor::prepare(cfg)?.with_command(script("sleep 30"));
    let path: PathBuf = artifact(&monitor, "10.0.0.1", ProbeKind::Trace)?;

    let started: Instant = Instant::now();
    let summary: RunSummary = run_for(monitor, Duration::from_millis(300)).await;

    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(summary.submitted, 2);
    assert_eq!(summary.abandoned, 2);
    assert!(!path.exists());
    Ok(())
}
