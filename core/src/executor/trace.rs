use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use reachr_common::network::target::Target;
use reachr_common::probe::{CommandTemplate, ProbeKind, ProbeOutcome, ProbeResult};
use reachr_protocols::trace::{self, TraceRenderer};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::time::{Instant, timeout_at};
use tokio_util::task::AbortOnDropHandle;

use super::{LineStream, ProbeFailure, Prober, build_command, terminate};

/// Streaming hop-trace probe.
///
/// Output is consumed line by line while the command runs so each hop can be
/// stamped with the time it arrived. The whole trace, including waiting for
/// the process to exit, is bounded by the probe timeout.
#[derive(Debug, Clone)]
pub struct TraceProbe {
    template: CommandTemplate,
    timeout: Duration,
}

impl TraceProbe {
    pub fn new(timeout: Duration) -> Self {
        Self {
            template: trace::command(),
            timeout,
        }
    }

    /// Replaces the platform `traceroute`/`tracert` invocation.
    pub fn with_template(mut self, template: CommandTemplate) -> Self {
        self.template = template;
        self
    }

    async fn stream(
        &self,
        target: &Target,
        started: Instant,
        renderer: &mut TraceRenderer,
    ) -> Result<(), ProbeFailure> {
        let mut cmd: Command = build_command(&self.template, target);
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        let mut child: Child = cmd.spawn()?;
        let stderr: Option<AbortOnDropHandle<String>> = child
            .stderr
            .take()
            .map(|pipe| AbortOnDropHandle::new(tokio::spawn(read_all(pipe))));
        let mut lines: Option<LineStream> = child.stdout.take().map(LineStream::spawn);

        let deadline: Instant = started + self.timeout;
        let finished = timeout_at(deadline, async {
            if let Some(lines) = lines.as_mut() {
                while let Some(line) = lines.next_line().await {
                    renderer.push(&line, started.elapsed());
                }
            }
            child.wait().await
        })
        .await;

        match finished {
            Ok(Ok(status)) => {
                let stderr_text: String = match stderr {
                    Some(task) => timeout_at(deadline, task)
                        .await
                        .ok()
                        .and_then(Result::ok)
                        .unwrap_or_default(),
                    None => String::new(),
                };
                finish(status, &stderr_text, renderer)
            }
            Ok(Err(e)) => Err(ProbeFailure::Invocation(e)),
            Err(_elapsed) => {
                terminate(&mut child, target).await;
                Err(ProbeFailure::Timeout(self.timeout))
            }
        }
    }
}

fn finish(
    status: ExitStatus,
    stderr_text: &str,
    renderer: &mut TraceRenderer,
) -> Result<(), ProbeFailure> {
    if status.success() {
        return Ok(());
    }
    renderer.push_error_text(stderr_text);
    Err(ProbeFailure::NonZeroExit(status))
}

async fn read_all<R: AsyncRead + Unpin>(mut pipe: R) -> String {
    let mut buf: Vec<u8> = Vec::new();
    if let Err(e) = pipe.read_to_end(&mut buf).await {
        tracing::debug!(error = %e, "Error stream closed early");
    }
    String::from_utf8_lossy(&buf).into_owned()
}

#[async_trait]
impl Prober for TraceProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Trace
    }

    async fn probe(&self, target: &Target) -> ProbeResult {
        reachr_common::info!("Running traceroute to {target}");
        let timestamp: DateTime<Local> = Local::now();
        let started: Instant = Instant::now();
        let mut renderer: TraceRenderer = TraceRenderer::new();

        let streamed: Result<(), ProbeFailure> = self.stream(target, started, &mut renderer).await;
        let elapsed: Duration = started.elapsed();

        let outcome: ProbeOutcome = match &streamed {
            Ok(()) => ProbeOutcome::Success,
            Err(ProbeFailure::NonZeroExit(_)) => ProbeOutcome::Failed,
            Err(ProbeFailure::Timeout(_)) => {
                renderer.mark_timed_out(elapsed);
                ProbeOutcome::Timeout
            }
            Err(ProbeFailure::Invocation(_)) => ProbeOutcome::Error,
        };

        let hop_lines: usize = renderer.hop_lines();
        let mut result: ProbeResult = ProbeResult::new(target.clone(), outcome, timestamp)
            .with_elapsed(elapsed)
            .with_output(renderer.into_lines())
            .with_hop_lines(hop_lines);

        if let Err(failure) = streamed {
            tracing::debug!(host = %target, %failure, "Trace did not complete");
            result = result.with_detail(failure.to_string());
        }

        result
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
