//! # Result Sink
//!
//! Turns a finished [`ProbeResult`] into two things: a human-readable record
//! appended to the target's artifact file, and a one-line summary emitted on
//! the [`PROBE_TARGET`] log target for the console.
//!
//! Each record is written with a single append so records for one target
//! never interleave, even when several workers finish at the same moment.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use reachr_common::PROBE_TARGET;
use reachr_common::probe::{HopSequence, ProbeKind, ProbeOutcome, ProbeResult, TIME_NOT_PARSED};
use reachr_common::session::Session;
use reachr_protocols::hops;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to create {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to append to {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Persists and reports finished probes.
pub trait Recorder: Send + Sync {
    fn record(&self, kind: ProbeKind, result: &ProbeResult) -> Result<(), SinkError>;
}

/// Appends records to one file per target under the session root.
#[derive(Debug, Clone)]
pub struct LogSink {
    session: Session,
}

impl LogSink {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn append(&self, path: &Path, record: &str) -> Result<(), SinkError> {
        let root: &Path = self.session.root();
        fs::create_dir_all(root).map_err(|source| SinkError::CreateDir {
            path: root.to_path_buf(),
            source,
        })?;

        let io_err = |source: io::Error| SinkError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut file: fs::File = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(io_err)?;
        file.write_all(record.as_bytes()).map_err(io_err)
    }
}

impl Recorder for LogSink {
    fn record(&self, kind: ProbeKind, result: &ProbeResult) -> Result<(), SinkError> {
        let path: PathBuf = self.session.artifact_path(&result.target, kind);
        self.append(&path, &format_record(kind, result))?;

        tracing::info!(
            target: PROBE_TARGET,
            outcome = %result.outcome,
            line = %summary_line(kind, result),
        );
        Ok(())
    }
}

/// The text appended to the artifact for one result.
pub fn format_record(kind: ProbeKind, result: &ProbeResult) -> String {
    match kind {
        ProbeKind::Ping => format!("{}\n", ping_line(result)),
        ProbeKind::Trace => trace_record(result),
    }
}

/// The one-line console form of a result.
pub fn summary_line(kind: ProbeKind, result: &ProbeResult) -> String {
    match kind {
        ProbeKind::Ping => ping_line(result),
        ProbeKind::Trace => trace_summary(result),
    }
}

fn ping_line(result: &ProbeResult) -> String {
    let detail: &str = result.detail.as_deref().unwrap_or_default();
    let detail: String = match result.outcome {
        ProbeOutcome::Success if detail != TIME_NOT_PARSED => format!("{detail}ms"),
        _ => detail.to_string(),
    };

    format!(
        "{} - {} - {} - {}",
        result.timestamp_label(),
        result.target,
        result.outcome,
        detail
    )
}

fn trace_record(result: &ProbeResult) -> String {
    let mut record: String = format!(
        "{} - {} - {}",
        result.timestamp_label(),
        result.target,
        result.outcome
    );
    if result.outcome == ProbeOutcome::Error {
        if let Some(detail) = &result.detail {
            record.push_str(&format!(" - {detail}"));
        }
    }
    record.push('\n');

    for line in &result.rendered_output {
        record.push_str(line);
        record.push('\n');
    }

    let verdict: &str = match result.outcome {
        ProbeOutcome::Success => "Trace succeeded",
        ProbeOutcome::Timeout => "Trace timed out",
        ProbeOutcome::Failed | ProbeOutcome::Error => "Trace failed",
    };
    record.push_str(&format!(
        "{verdict} - Total time: {}ms\n\n",
        result.elapsed_ms()
    ));
    record
}

fn trace_summary(result: &ProbeResult) -> String {
    let head: String = format!(
        "{} - {} - {}",
        result.timestamp_label(),
        result.target,
        result.outcome
    );
    let took: u128 = result.elapsed_ms();
    let path: HopSequence = hops::extract_hops(&result.rendered_output);

    match result.outcome {
        ProbeOutcome::Success if path.is_empty() => {
            format!("{head} - {} hops - took {took}ms", result.hop_lines)
        }
        ProbeOutcome::Success => format!(
            "{head} - {} hops - took {took}ms - Path: {}",
            result.hop_lines,
            path.as_path()
        ),
        ProbeOutcome::Timeout if !path.is_empty() => {
            format!("{head} - took {took}ms - Partial Path: {}", path.as_path())
        }
        ProbeOutcome::Failed | ProbeOutcome::Timeout => format!("{head} - took {took}ms"),
        ProbeOutcome::Error => format!(
            "{head} - took {took}ms - {}",
            result.detail.as_deref().unwrap_or("unknown error")
        ),
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
