//! # Reachr Common
//!
//! Shared vocabulary of the workspace: the probe data model, the run
//! [`session::Session`], the run [`config::Config`] and the target list loader.
//!
//! The logging macros exported here ([`info!`], [`success!`], [`warn!`],
//! [`error!`]) forward to `tracing` so library crates never talk to the
//! terminal directly. The CLI decides how each target is rendered.

pub mod config;
pub mod network;
pub mod probe;
pub mod session;
pub mod utils;

#[doc(hidden)]
pub use tracing as __tracing;

/// Target used for neutral status messages.
pub const LOG_TARGET: &str = "reachr::status";
/// Target used for positive status messages, rendered with `[+]`.
pub const SUCCESS_TARGET: &str = "reachr::success";
/// Target carrying one summary line per finished probe.
pub const PROBE_TARGET: &str = "reachr::probe";

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::__tracing::info!(target: "reachr::status", $($arg)*)
    };
}

#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::__tracing::info!(target: "reachr::success", $($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::__tracing::warn!(target: "reachr::status", $($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::__tracing::error!(target: "reachr::status", $($arg)*)
    };
}
