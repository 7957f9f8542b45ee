//! # Monitor
//!
//! Wires one run together: loads the target list, opens the [`Session`],
//! builds the prober and the [`LogSink`], then hands everything to a
//! [`CycleScheduler`] until shutdown.

use std::sync::Arc;

use reachr_common::config::Config;
use reachr_common::network::target::{Target, load_targets};
use reachr_common::probe::CommandTemplate;
use reachr_common::session::Session;
use reachr_common::{error, info, success};
use thiserror::Error;

use crate::executor::{Prober, build_prober};
use crate::scheduler::{CycleScheduler, RunSummary, Shutdown};
use crate::sink::LogSink;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MonitorError {
    #[error("No targets to probe!")]
    NoTargets,
}

#[derive(Debug)]
pub struct Monitor {
    config: Config,
    targets: Vec<Target>,
    session: Session,
    template: Option<CommandTemplate>,
}

impl Monitor {
    /// Loads the configured target list.
    ///
    /// A missing or unreadable list is reported and treated as empty, so the
    /// run ends before anything is written.
    pub fn prepare(config: Config) -> Result<Self, MonitorError> {
        let targets: Vec<Target> = match load_targets(&config.targets_file) {
            Ok(targets) => targets,
            Err(e) => {
                error!("{e}");
                Vec::new()
            }
        };
        Self::from_targets(config, targets)
    }

    pub fn from_targets(config: Config, targets: Vec<Target>) -> Result<Self, MonitorError> {
        if targets.is_empty() {
            return Err(MonitorError::NoTargets);
        }

        let session: Session = Session::new(&config.output_root);
        Ok(Self {
            config,
            targets,
            session,
            template: None,
        })
    }

    /// Runs `template` instead of the platform diagnostic command.
    pub fn with_command(mut self, template: CommandTemplate) -> Self {
        self.template = Some(template);
        self
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn run(self, shutdown: &Shutdown) -> RunSummary {
        let workers: usize = self.config.worker_bound(self.targets.len());
        let prober: Arc<dyn Prober> =
            build_prober(self.config.kind, self.config.timeout, self.template.clone());
        let sink: Arc<LogSink> = Arc::new(LogSink::new(self.session.clone()));

        success!(
            "Starting {} monitoring for {} targets...",
            self.config.kind,
            self.targets.len()
        );
        info!(
            "Output files will be saved in {}/ with timestamp {}",
            self.session.root().display(),
            self.session.label()
        );
        tracing::debug!(
            workers,
            cadence = ?self.config.cadence,
            timeout = ?self.config.timeout,
            policy = ?self.config.stop_policy,
            "Scheduler configured"
        );

        let scheduler: CycleScheduler =
            CycleScheduler::new(prober, sink, self.config.cadence, workers)
                .with_stop_policy(self.config.stop_policy);
        let summary: RunSummary = scheduler.run(&self.targets, shutdown).await;

        success!(
            "{} monitoring stopped after {} cycles ({} probes recorded, {} abandoned)",
            self.config.kind,
            summary.cycles,
            summary.completed,
            summary.abandoned
        );
        summary
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
