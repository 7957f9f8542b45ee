//! End-to-end runs of the monitor against scripted stand-ins for `ping` and
//! `traceroute`.

#![cfg(all(test, unix))]

mod harness;
mod ping;
mod startup;
mod trace;
