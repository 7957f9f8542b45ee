//! The central **abstraction** for running a single probe.
//!
//! A [`Prober`] launches one external diagnostic command against one target,
//! enforces its timeout and classifies the result. Two strategies exist:
//!
//! * [`PingProbe`]: one blocking invocation, output read in a single batch.
//! * [`TraceProbe`]: a streaming invocation whose lines are rendered as they
//!   arrive, through a [`LineStream`].
//!
//! **Failure policy:** spawn errors, timeouts and non-zero exits never leave
//! this module as errors. They become a terminal [`ProbeResult`] whose
//! [`ProbeOutcome`](reachr_common::probe::ProbeOutcome) describes what went
//! wrong. No retries happen here; the next cycle is the retry.

use std::io;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reachr_common::network::target::Target;
use reachr_common::probe::{CommandTemplate, ProbeKind, ProbeResult};
use thiserror::Error;
use tokio::process::{Child, Command};

mod ping;
mod stream;
mod trace;

pub use ping::PingProbe;
pub use stream::LineStream;
pub use trace::TraceProbe;

/// Runs one probe against one target.
///
/// Implementations must not leave the external process running once
/// [`Prober::probe`] returns.
#[async_trait]
pub trait Prober: Send + Sync {
    fn kind(&self) -> ProbeKind;

    async fn probe(&self, target: &Target) -> ProbeResult;
}

/// Why a probe did not end in success. Converted into a `ProbeResult` before
/// it leaves the executor.
#[derive(Debug, Error)]
pub(crate) enum ProbeFailure {
    #[error("{0}")]
    Invocation(#[from] io::Error),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("exited with {0}")]
    NonZeroExit(ExitStatus),
}

/// Builds the prober for `kind`, using the platform command unless a
/// `template` is given.
pub fn build_prober(
    kind: ProbeKind,
    timeout: Duration,
    template: Option<CommandTemplate>,
) -> Arc<dyn Prober> {
    match (kind, template) {
        (ProbeKind::Ping, None) => Arc::new(PingProbe::new(timeout)),
        (ProbeKind::Ping, Some(t)) => Arc::new(PingProbe::new(timeout).with_template(t)),
        (ProbeKind::Trace, None) => Arc::new(TraceProbe::new(timeout)),
        (ProbeKind::Trace, Some(t)) => Arc::new(TraceProbe::new(timeout).with_template(t)),
    }
}

/// Probes `target` once with the platform command for `kind`.
pub async fn execute(target: &Target, kind: ProbeKind, timeout: Duration) -> ProbeResult {
    build_prober(kind, timeout, None).probe(target).await
}

pub(crate) fn build_command(template: &CommandTemplate, target: &Target) -> Command {
    let mut cmd: Command = Command::new(&template.program);
    cmd.args(template.args_for(target))
        .stdin(Stdio::null())
        .kill_on_drop(true);
    cmd
}

/// Kills `child` and reaps it.
pub(crate) async fn terminate(child: &mut Child, target: &Target) {
    if let Err(e) = child.kill().await {
        tracing::debug!(host = %target, error = %e, "Failed to kill probe process");
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
