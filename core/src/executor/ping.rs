use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use reachr_common::network::target::Target;
use reachr_common::probe::{
    CommandTemplate, ProbeKind, ProbeOutcome, ProbeResult, TIME_NOT_PARSED,
};
use reachr_protocols::ping;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::time::{Instant, timeout};

use super::{ProbeFailure, Prober, build_command, terminate};

/// Single-echo reachability probe.
///
/// The command is run to completion and its standard output is read in one
/// batch. Standard error is discarded.
#[derive(Debug, Clone)]
pub struct PingProbe {
    template: CommandTemplate,
    timeout: Duration,
}

impl PingProbe {
    pub fn new(timeout: Duration) -> Self {
        Self {
            template: ping::command(),
            timeout,
        }
    }

    /// Replaces the platform `ping` invocation.
    pub fn with_template(mut self, template: CommandTemplate) -> Self {
        self.template = template;
        self
    }

    async fn run(&self, target: &Target) -> Result<String, ProbeFailure> {
        let mut cmd: Command = build_command(&self.template, target);
        cmd.stdout(Stdio::piped()).stderr(Stdio::null());

        let mut child: Child = cmd.spawn()?;
        let mut stdout = child.stdout.take();

        let waited = timeout(self.timeout, async {
            let mut buf: Vec<u8> = Vec::new();
            if let Some(pipe) = stdout.as_mut() {
                pipe.read_to_end(&mut buf).await?;
            }
            let status: ExitStatus = child.wait().await?;
            Ok::<_, io::Error>((status, buf))
        })
        .await;

        match waited {
            Ok(Ok((status, buf))) if status.success() => {
                Ok(String::from_utf8_lossy(&buf).into_owned())
            }
            Ok(Ok((status, _))) => Err(ProbeFailure::NonZeroExit(status)),
            Ok(Err(e)) => Err(ProbeFailure::Invocation(e)),
            Err(_elapsed) => {
                terminate(&mut child, target).await;
                Err(ProbeFailure::Timeout(self.timeout))
            }
        }
    }
}

#[async_trait]
impl Prober for PingProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Ping
    }

    async fn probe(&self, target: &Target) -> ProbeResult {
        let timestamp: DateTime<Local> = Local::now();
        let started: Instant = Instant::now();
        let ran: Result<String, ProbeFailure> = self.run(target).await;
        let elapsed: Duration = started.elapsed();

        let result: ProbeResult = match ran {
            Ok(output) => {
                let latency: String = match ping::parse_latency(&output) {
                    Some(ms) => ms,
                    None => {
                        tracing::debug!(host = %target, "Ping succeeded but latency was not parsed");
                        TIME_NOT_PARSED.to_string()
                    }
                };
                let lines: Vec<String> = output
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(String::from)
                    .collect();

                ProbeResult::new(target.clone(), ProbeOutcome::Success, timestamp)
                    .with_output(lines)
                    .with_detail(latency)
            }
            Err(ProbeFailure::NonZeroExit(status)) => {
                tracing::debug!(host = %target, %status, "Ping exited unsuccessfully");
                ProbeResult::new(target.clone(), ProbeOutcome::Failed, timestamp)
                    .with_detail("No response")
            }
            Err(ProbeFailure::Timeout(limit)) => {
                tracing::debug!(host = %target, ?limit, "Ping timed out");
                ProbeResult::new(target.clone(), ProbeOutcome::Timeout, timestamp)
                    .with_detail("Timeout")
            }
            Err(ProbeFailure::Invocation(e)) => {
                ProbeResult::new(target.clone(), ProbeOutcome::Error, timestamp)
                    .with_detail(e.to_string())
            }
        };

        result.with_elapsed(elapsed)
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
