use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reachr_common::config::Config;
use reachr_common::network::target::Target;
use reachr_common::probe::{CommandTemplate, ProbeKind};
use reachr_core::monitor::Monitor;
use reachr_core::scheduler::{RunSummary, Shutdown};
use tempfile::TempDir;

/// A scratch directory holding a target list and an output root.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn with_targets(lines: &str) -> anyhow::Result<Self> {
        let dir: TempDir = tempfile::tempdir()?;
        fs::write(dir.path().join("destinationip.txt"), lines)?;
        Ok(Self { dir })
    }

    pub fn output_root(&self) -> PathBuf {
        self.dir.path().join("output")
    }

    pub fn config(&self, kind: ProbeKind) -> Config {
        let mut cfg: Config = Config::for_kind(kind);
        cfg.targets_file = self.dir.path().join("destinationip.txt");
        cfg.output_root = self.output_root();
        cfg
    }
}

/// Runs `/bin/sh -c script` with the target as `$1`.
pub fn script(body: &str) -> CommandTemplate {
    CommandTemplate::new("sh", ["-c", body, "sh", "{target}"])
}

/// Runs `monitor` until `stop_after` has passed, then requests a stop.
pub async fn run_for(monitor: Monitor, stop_after: Duration) -> RunSummary {
    let shutdown: Shutdown = Shutdown::new();
    let trigger: Shutdown = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(stop_after).await;
        trigger.request_stop();
    });
    monitor.run(&shutdown).await
}

pub fn artifact(monitor: &Monitor, target: &str, kind: ProbeKind) -> anyhow::Result<PathBuf> {
    let target: Target = target.parse()?;
    Ok(monitor.session().artifact_path(&target, kind))
}

pub fn read(path: &Path) -> anyhow::Result<String> {
    Ok(fs::read_to_string(path)?)
}
