use reachr_common::probe::ProbeKind;
use reachr_core::monitor::{Monitor, MonitorError};

use crate::harness::Workspace;

#[test]
fn empty_target_list_aborts_before_any_output() -> anyhow::Result<()> {
    let ws: Workspace = Workspace::with_targets("")?;

    for kind in [ProbeKind::Ping, ProbeKind::Trace] {
        let err: MonitorError = Monitor::prepare(ws.config(kind)).unwrap_err();
        assert_eq!(err, MonitorError::NoTargets);
        assert_eq!(err.to_string(), "No targets to probe!");
    }

    assert!(!ws.output_root().exists());
    Ok(())
}

#[test]
fn missing_target_list_aborts_before_any_output() -> anyhow::Result<()> {
    let ws: Workspace = Workspace::with_targets("10.0.0.1\n")?;
    let mut cfg = ws.config(ProbeKind::Ping);
    cfg.targets_file = ws.dir.path().join("nowhere.txt");

    assert_eq!(Monitor::prepare(cfg).unwrap_err(), MonitorError::NoTargets);
    assert!(!ws.output_root().exists());
    Ok(())
}
