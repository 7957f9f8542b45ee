use std::path::PathBuf;
use std::time::Duration;

use reachr_common::probe::ProbeKind;
use reachr_core::monitor::Monitor;
use reachr_core::scheduler::RunSummary;

use crate::harness::{Workspace, artifact, read, run_for, script};

#[tokio::test]
async fn reply_is_recorded_with_latency() -> anyhow::Result<()> {
    let ws: Workspace = Workspace::with_targets("10.0.0.5\n")?;
    let monitor: Monitor = Monitor::prepare(ws.config(ProbeKind::Ping))?
        .with_command(script("echo \"64 bytes from $1: icmp_seq=1 ttl=64 time=4.2 ms\""));
    let path: PathBuf = artifact(&monitor, "10.0.0.5", ProbeKind::Ping)?;

    let summary: RunSummary = run_for(monitor, Duration::from_millis(500)).await;
    assert_eq!(summary.cycles, 1);
    assert_eq!(summary.completed, 1);

    let text: String = read(&path)?;
    assert_eq!(text.lines().count(), 1);
    assert!(text.contains(" - 10.0.0.5 - SUCCESS - 4.2ms"), "{text}");
    Ok(())
}

#[tokio::test]
async fn slow_reply_is_recorded_as_timeout() -> anyhow::Result<()> {
    let ws: Workspace = Workspace::with_targets("10.0.0.9\n")?;
    let mut cfg = ws.config(ProbeKind::Ping);
    cfg.timeout = Duration::from_millis(300);

    let monitor: Monitor = Monitor::prepare(cfg)?.with_command(script("sleep 5"));
    let path: PathBuf = artifact(&monitor, "10.0.0.9", ProbeKind::Ping)?;

    run_for(monitor, Duration::from_millis(100)).await;

    let text: String = read(&path)?;
    assert!(text.contains("TIMEOUT"), "{text}");
    assert!(!text.contains("FAILED"), "{text}");
    Ok(())
}

#[tokio::test]
async fn repeated_cycles_append_to_one_file_per_target() -> anyhow::Result<()> {
    let ws: Workspace = Workspace::with_targets("10.0.0.1\n10.0.0.2\n")?;
    let mut cfg = ws.config(ProbeKind::Ping);
    cfg.cadence = Duration::from_millis(300);

    let monitor: Monitor = Monitor::prepare(cfg)?.with_command(script(
        "case \"$1\" in 10.0.0.1) echo 'time=1.5 ms' ;; *) exit 1 ;; esac",
    ));
    let up: PathBuf = artifact(&monitor, "10.0.0.1", ProbeKind::Ping)?;
    let down: PathBuf = artifact(&monitor, "10.0.0.2", ProbeKind::Ping)?;

    let summary: RunSummary = run_for(monitor, Duration::from_millis(1_000)).await;
    assert!(summary.cycles >= 3, "{summary:?}");
    assert_eq!(summary.completed, summary.submitted);

    let up_text: String = read(&up)?;
    let down_text: String = read(&down)?;
    assert_eq!(up_text.lines().count() as u64, summary.cycles);
    assert_eq!(down_text.lines().count() as u64, summary.cycles);
    assert!(up_text.lines().all(|l| l.ends_with("SUCCESS - 1.5ms")));
    assert!(down_text.lines().all(|l| l.ends_with("FAILED - No response")));

    let stamps: Vec<&str> = up_text.lines().map(|l| &l[..19]).collect();
    assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    Ok(())
}
