//! Hop-tracing output, read one line at a time.
//!
//! Lines are classified as they arrive:
//! * a line starting with a hop index is annotated with the elapsed time,
//! * the route-tracing banner passes through untouched,
//! * the completion marker is replaced with the total elapsed time.
//!
//! Any other line is kept only if nothing has been rendered yet.

use std::time::Duration;

use reachr_common::probe::CommandTemplate;

const WINDOWS_BANNER: &str = "Tracing route";
const UNIX_BANNER: &str = "traceroute to";
const COMPLETION_MARKER: &str = "Trace complete";

/// Numeric-only hop tracing for the host platform.
pub fn command() -> CommandTemplate {
    if cfg!(windows) {
        CommandTemplate::new("tracert", ["-d", "{target}"])
    } else {
        CommandTemplate::new("traceroute", ["-n", "{target}"])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceLine {
    Hop,
    Header,
    Complete,
    Other,
}

/// Classifies one trimmed, non-empty output line.
pub fn classify(line: &str) -> TraceLine {
    let line: &str = line.trim_start();
    if line.starts_with(|c: char| c.is_ascii_digit()) {
        TraceLine::Hop
    } else if line.contains(WINDOWS_BANNER) || line.starts_with(UNIX_BANNER) {
        TraceLine::Header
    } else if line.contains(COMPLETION_MARKER) {
        TraceLine::Complete
    } else {
        TraceLine::Other
    }
}

/// Accumulates the rendered form of a trace as its lines stream in.
#[derive(Debug, Default)]
pub struct TraceRenderer {
    lines: Vec<String>,
    hop_lines: usize,
}

impl TraceRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders `raw`, received `elapsed` after the trace started.
    pub fn push(&mut self, raw: &str, elapsed: Duration) {
        let line: &str = raw.trim();
        if line.is_empty() {
            return;
        }

        match classify(line) {
            TraceLine::Hop => {
                self.hop_lines += 1;
                self.lines.push(format!("[{:.1}s] {line}", elapsed.as_secs_f64()));
            }
            TraceLine::Header => self.lines.push(line.to_string()),
            TraceLine::Complete => self.lines.push(format!(
                "Trace complete - Total time: {}ms",
                elapsed.as_millis()
            )),
            TraceLine::Other if self.lines.is_empty() => self.lines.push(line.to_string()),
            TraceLine::Other => {}
        }
    }

    /// Appends captured error-stream text verbatim.
    pub fn push_error_text(&mut self, stderr: &str) {
        let stderr: &str = stderr.trim();
        if !stderr.is_empty() {
            self.lines.push(stderr.to_string());
        }
    }

    /// Appends the marker for a trace killed after `elapsed`.
    pub fn mark_timed_out(&mut self, elapsed: Duration) {
        self.lines
            .push(format!("[{:.1}s] Process timed out", elapsed.as_secs_f64()));
    }

    pub fn hop_lines(&self) -> usize {
        self.hop_lines
    }

    #[cfg(test)]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
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
