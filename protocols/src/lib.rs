//! # Diagnostic Tool Protocols
//!
//! The external probes speak plain text. This crate knows how to invoke them
//! on the host platform and how to read what they print:
//!
//! * [`ping`]: one-echo invocation and round-trip time parsing.
//! * [`trace`]: hop-tracing invocation, line classification and rendering.
//! * [`hops`]: recovery of the ordered hop path from rendered output.
//!
//! Everything here is pure; process handling lives in `reachr-core`.

pub mod hops;
pub mod ping;
pub mod trace;
