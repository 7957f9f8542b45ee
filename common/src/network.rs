//! # Network Targets
//!
//! Host identifiers the probes are aimed at, and the loader that reads them.

pub mod target;
