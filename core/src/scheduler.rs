//! # Cycle Scheduler
//!
//! Fires one probe per target on a fixed cadence and feeds every result to a
//! [`Recorder`].
//!
//! ```text
//! Idle -> Scheduling(1) -> Awaiting(1) -> Scheduling(2) -> ... -> Stopped
//! ```
//!
//! Deadlines are computed from the previous deadline, never from the moment a
//! cycle actually started, so stalls do not push every later cycle back. A
//! cycle that finishes submitting after its successor's deadline starts the
//! next one straight away and counts as late.
//!
//! Submission never waits on a probe. Probes writing to the same artifact
//! share a [`Lane`] inside the pool and run one at a time in submission order,
//! so a slow target only delays itself and its file always grows in order.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reachr_common::config::StopPolicy;
use reachr_common::network::target::Target;
use reachr_common::probe::{ProbeKind, ProbeResult};
use reachr_common::{error, info, warn};
use tokio::sync::watch;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

use crate::executor::Prober;
use crate::sink::Recorder;

mod pool;

pub use pool::{Lane, PoolTally, WorkerPool};

/// Two-stage stop signal shared between the signal handler and the run.
///
/// The first stage stops new cycles; the second abandons whatever is still
/// running.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    graceful: CancellationToken,
    force: CancellationToken,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.graceful.cancel();
    }

    pub fn request_abort(&self) {
        self.graceful.cancel();
        self.force.cancel();
    }

    pub fn is_stopping(&self) -> bool {
        self.graceful.is_cancelled()
    }

    pub fn is_aborted(&self) -> bool {
        self.force.is_cancelled()
    }

    /// Resolves once a stop has been requested.
    pub async fn stopping(&self) {
        self.graceful.cancelled().await
    }

    /// Resolves once an abort has been requested.
    pub async fn aborted(&self) {
        self.force.cancelled().await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    /// Submitting the probes of the given cycle.
    Scheduling(u64),
    /// Waiting for the deadline after the given cycle.
    Awaiting(u64),
    Stopped,
}

/// What to do once a cycle has been submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePlan {
    /// Sleep this long, then start the next cycle.
    Sleep(Duration),
    /// The deadline passed this long ago; start the next cycle now.
    Late(Duration),
}

/// Decides between sleeping and starting immediately.
pub fn plan_next_cycle(deadline: Instant, now: Instant) -> CyclePlan {
    if now >= deadline {
        CyclePlan::Late(now - deadline)
    } else {
        CyclePlan::Sleep(deadline - now)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub submitted: usize,
    pub completed: usize,
    pub abandoned: usize,
    /// Probe tasks that panicked instead of returning a result.
    pub crashed: usize,
    pub late_cycles: u64,
}

impl RunSummary {
    fn absorb(&mut self, tally: PoolTally) {
        self.completed += tally.completed;
        self.abandoned += tally.abandoned;
        self.crashed += tally.crashed;
    }
}

/// Lanes keyed by artifact file stem.
type Lanes = HashMap<String, Lane>;

pub struct CycleScheduler {
    prober: Arc<dyn Prober>,
    recorder: Arc<dyn Recorder>,
    cadence: Duration,
    workers: usize,
    stop_policy: StopPolicy,
    state: watch::Sender<SchedulerState>,
}

impl CycleScheduler {
    pub fn new(
        prober: Arc<dyn Prober>,
        recorder: Arc<dyn Recorder>,
        cadence: Duration,
        workers: usize,
    ) -> Self {
        let (state, _) = watch::channel(SchedulerState::Idle);
        Self {
            prober,
            recorder,
            cadence,
            workers,
            stop_policy: StopPolicy::Drain,
            state,
        }
    }

    pub fn with_stop_policy(mut self, stop_policy: StopPolicy) -> Self {
        self.stop_policy = stop_policy;
        self
    }

    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SchedulerState> {
        self.state.subscribe()
    }

    /// Probes `targets` every cadence until `shutdown` fires.
    ///
    /// Returns after in-flight probes have been drained or abandoned,
    /// according to the stop policy.
    pub async fn run(&self, targets: &[Target], shutdown: &Shutdown) -> RunSummary {
        let mut lanes: Lanes = targets
            .iter()
            .map(|target| (target.file_stem(), Lane::default()))
            .collect();
        let mut pool: WorkerPool = WorkerPool::new(self.workers);
        let mut summary: RunSummary = RunSummary::default();
        let mut cycle_start: Instant = Instant::now();

        while !shutdown.is_stopping() {
            summary.cycles += 1;
            let cycle: u64 = summary.cycles;
            self.state.send_replace(SchedulerState::Scheduling(cycle));
            tracing::debug!(cycle, targets = targets.len(), "Submitting cycle");

            summary.submitted += self.submit_cycle(targets, &mut lanes, &mut pool);
            summary.absorb(pool.reap());
            self.state.send_replace(SchedulerState::Awaiting(cycle));
            if shutdown.is_stopping() {
                break;
            }

            let deadline: Instant = cycle_start + self.cadence;
            match plan_next_cycle(deadline, Instant::now()) {
                CyclePlan::Late(behind) => {
                    summary.late_cycles += 1;
                    tracing::debug!(cycle, ?behind, "Deadline missed");
                    info!("Cycle running late, starting next immediately...");
                    cycle_start = deadline;
                }
                CyclePlan::Sleep(wait) => {
                    info!("Next cycle in {:.1} seconds...", wait.as_secs_f64());
                    tokio::select! {
                        _ = sleep_until(deadline) => {}
                        _ = shutdown.stopping() => {}
                    }
                    cycle_start = deadline;
                }
            }
        }

        self.stop(&mut pool, shutdown, &mut summary).await;
        self.state.send_replace(SchedulerState::Stopped);
        summary
    }

    /// Submits one probe per target in list order and returns how many were
    /// submitted.
    fn submit_cycle(&self, targets: &[Target], lanes: &mut Lanes, pool: &mut WorkerPool) -> usize {
        let mut submitted: usize = 0;

        for target in targets {
            let Some(lane) = lanes.get_mut(&target.file_stem()) else {
                continue;
            };

            let prober: Arc<dyn Prober> = Arc::clone(&self.prober);
            let recorder: Arc<dyn Recorder> = Arc::clone(&self.recorder);
            let target: Target = target.clone();
            pool.submit(lane, async move {
                let kind: ProbeKind = prober.kind();
                let result: ProbeResult = prober.probe(&target).await;
                if let Err(e) = recorder.record(kind, &result) {
                    error!("Could not record {kind} result for {target}: {e}");
                }
            });
            submitted += 1;
        }

        submitted
    }

    async fn stop(&self, pool: &mut WorkerPool, shutdown: &Shutdown, summary: &mut RunSummary) {
        let pending: usize = pool.in_flight();
        if pending == 0 {
            return;
        }

        let tally: PoolTally = match self.stop_policy {
            StopPolicy::Drain => {
                info!("Waiting for {pending} probes to finish...");
                pool.drain(shutdown).await
            }
            StopPolicy::Abandon => {
                warn!("Abandoning {pending} probes still in flight");
                pool.abandon().await
            }
        };
        summary.absorb(tally);
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
