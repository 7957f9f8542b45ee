//! # Run Session
//!
//! A [`Session`] groups every artifact written during one process run. It is
//! created once at start-up and handed to the result sink explicitly.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::network::target::Target;
use crate::probe::ProbeKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    label: String,
    root: PathBuf,
}

impl Session {
    /// Starts a session under `root`, labelled with the current local time.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::started_at(root, Local::now())
    }

    /// Starts a session labelled with the given start time.
    pub fn started_at(root: impl Into<PathBuf>, now: DateTime<Local>) -> Self {
        Self {
            label: session_label(&now),
            root: root.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the append-only artifact for one target and probe kind.
    pub fn artifact_path(&self, target: &Target, kind: ProbeKind) -> PathBuf {
        self.root.join(format!(
            "{}_{}_{}.log",
            kind.file_prefix(),
            target.file_stem(),
            self.label
        ))
    }
}

/// Coarse, filesystem-safe label such as `2026_October_17_09_05`.
pub fn session_label(now: &DateTime<Local>) -> String {
    now.format("%Y_%B_%d_%H_%M").to_string()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
