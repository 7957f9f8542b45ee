use std::path::PathBuf;
use std::time::Duration;

use crate::probe::ProbeKind;

pub const DEFAULT_TARGETS_FILE: &str = "destinationip.txt";

/// Upper bound on ping workers regardless of target count.
pub const PING_WORKER_CAP: usize = 10;

/// What the scheduler does with probes still in flight on the first interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopPolicy {
    /// Wait for every submitted probe to finish and record its result.
    Drain,
    /// Abort outstanding probes; their processes are killed.
    Abandon,
}

/// Settings for one monitoring run.
#[derive(Debug, Clone)]
pub struct Config {
    pub kind: ProbeKind,
    /// Newline-delimited list of targets.
    pub targets_file: PathBuf,
    /// Directory that receives the per-target artifacts.
    pub output_root: PathBuf,
    /// Interval between the starts of successive cycles.
    pub cadence: Duration,
    /// Hard limit for a single probe.
    pub timeout: Duration,
    /// Worker bound override. `None` uses the per-kind default.
    pub workers: Option<usize>,
    pub stop_policy: StopPolicy,
    /// Suppresses status output below warnings when non-zero.
    pub quiet: u8,
}

impl Config {
    /// Defaults for the given probe kind.
    pub fn for_kind(kind: ProbeKind) -> Self {
        match kind {
            ProbeKind::Ping => Self {
                kind,
                targets_file: PathBuf::from(DEFAULT_TARGETS_FILE),
                output_root: PathBuf::from("./ping_output"),
                cadence: Duration::from_secs(3),
                timeout: Duration::from_secs(2),
                workers: None,
                stop_policy: StopPolicy::Drain,
                quiet: 0,
            },
            ProbeKind::Trace => Self {
                kind,
                targets_file: PathBuf::from(DEFAULT_TARGETS_FILE),
                output_root: PathBuf::from("./traceroute_output"),
                cadence: Duration::from_secs(45),
                timeout: Duration::from_secs(45),
                workers: None,
                stop_policy: StopPolicy::Abandon,
                quiet: 0,
            },
        }
    }

    /// Number of probes allowed to execute at once for `target_count` targets.
    pub fn worker_bound(&self, target_count: usize) -> usize {
        let bound: usize = match (self.workers, self.kind) {
            (Some(workers), _) => workers,
            (None, ProbeKind::Ping) => PING_WORKER_CAP.min(target_count),
            (None, ProbeKind::Trace) => target_count.saturating_mul(2),
        };
        bound.max(1)
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
