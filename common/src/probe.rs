//! # Probe Model
//!
//! Types shared by every stage of a probe: what was run ([`ProbeKind`],
//! [`CommandTemplate`]), how it ended ([`ProbeOutcome`]) and what it produced
//! ([`ProbeResult`], [`HopSequence`]).

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::network::target::Target;

/// Placeholder detail used when a ping succeeded but its latency could not be read.
pub const TIME_NOT_PARSED: &str = "<time not parsed>";

/// Placeholder inside a [`CommandTemplate`] argument that is replaced by the target.
pub const TARGET_PLACEHOLDER: &str = "{target}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeKind {
    /// A single ICMP echo.
    Ping,
    /// A hop-by-hop path trace.
    Trace,
}

impl ProbeKind {
    /// Prefix of the per-target artifact file name.
    pub fn file_prefix(self) -> &'static str {
        match self {
            ProbeKind::Ping => "ping",
            ProbeKind::Trace => "trace",
        }
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeKind::Ping => write!(f, "ping"),
            ProbeKind::Trace => write!(f, "traceroute"),
        }
    }
}

/// Terminal classification of one probe attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeOutcome {
    Success,
    Failed,
    Timeout,
    Error,
}

impl ProbeOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            ProbeOutcome::Success => "SUCCESS",
            ProbeOutcome::Failed => "FAILED",
            ProbeOutcome::Timeout => "TIMEOUT",
            ProbeOutcome::Error => "ERROR",
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The immutable record of one probe against one target.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub target: Target,
    pub outcome: ProbeOutcome,
    /// Wall-clock time at probe start.
    pub timestamp: DateTime<Local>,
    pub elapsed: Duration,
    /// Annotated output lines, in the order they were produced.
    pub rendered_output: Vec<String>,
    /// Latency for pings, failure reason or error text otherwise.
    pub detail: Option<String>,
    /// Number of hop lines seen by a trace. Always zero for pings.
    pub hop_lines: usize,
}

impl ProbeResult {
    pub fn new(target: Target, outcome: ProbeOutcome, timestamp: DateTime<Local>) -> Self {
        Self {
            target,
            outcome,
            timestamp,
            elapsed: Duration::ZERO,
            rendered_output: Vec::new(),
            detail: None,
            hop_lines: 0,
        }
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    pub fn with_output(mut self, rendered_output: Vec<String>) -> Self {
        self.rendered_output = rendered_output;
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_hop_lines(mut self, hop_lines: usize) -> Self {
        self.hop_lines = hop_lines;
        self
    }

    /// Timestamp formatted the way every record and console line shows it.
    pub fn timestamp_label(&self) -> String {
        self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Total elapsed time in whole milliseconds.
    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed.as_millis()
    }
}

/// Ordered, duplicate-free hop addresses recovered from a trace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HopSequence(Vec<String>);

impl HopSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `addr` unless it was already seen. Returns whether it was added.
    pub fn push(&mut self, addr: &str) -> bool {
        if self.0.iter().any(|seen| seen == addr) {
            return false;
        }
        self.0.push(addr.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Renders the path as `hopA -> hopB -> ...`.
    pub fn as_path(&self) -> String {
        self.0.join(" -> ")
    }
}

/// Program and arguments of an external diagnostic command.
///
/// Any argument equal to or containing `{target}` has the target substituted
/// when the command is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandTemplate {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Arguments with every placeholder replaced by `target`.
    pub fn args_for(&self, target: &Target) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.replace(TARGET_PLACEHOLDER, target.as_str()))
            .collect()
    }
}

impl fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
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
