//! # Reachr Core
//!
//! The probing engine. A [`monitor::Monitor`] owns one run; inside it a
//! [`scheduler::CycleScheduler`] fires [`executor::Prober`]s on a cadence
//! over a bounded [`scheduler::WorkerPool`] and hands each result to a
//! [`sink::Recorder`].

pub mod executor;
pub mod monitor;
pub mod scheduler;
pub mod sink;
