//! # Probe Target Model
//!
//! A [`Target`] is an opaque host identifier (IPv4, IPv6 or a resolvable
//! name). It is validated once when the list is loaded and never changes
//! afterwards.
//!
//! Target lists are plain text, one identifier per line:
//! * blank lines are skipped,
//! * surrounding whitespace is trimmed,
//! * byte-order marks and other control characters are stripped.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

const BYTE_ORDER_MARK: char = '\u{feff}';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("target is empty")]
    Empty,
    #[error("target '{0}' contains whitespace")]
    Whitespace(String),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{} not found!", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Target(String);

impl Target {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File-name friendly form of the target.
    ///
    /// Every character outside `[A-Za-z0-9-]` becomes `_`, so `10.0.0.1`
    /// turns into `10_0_0_1` and `fe80::1` into `fe80__1`.
    pub fn file_stem(&self) -> String {
        self.0
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect()
    }
}

impl FromStr for Target {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned: String = s
            .chars()
            .filter(|c| *c != BYTE_ORDER_MARK && !c.is_control())
            .collect();
        let cleaned: &str = cleaned.trim();

        if cleaned.is_empty() {
            return Err(TargetError::Empty);
        }
        if cleaned.chars().any(char::is_whitespace) {
            return Err(TargetError::Whitespace(cleaned.to_string()));
        }

        Ok(Target(cleaned.to_string()))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parses a newline-delimited target list.
///
/// Lines that cannot form a target are skipped with a warning rather than
/// failing the whole list.
pub fn parse_target_list(text: &str) -> Vec<Target> {
    let mut targets: Vec<Target> = Vec::new();

    for line in text.lines() {
        match Target::from_str(line) {
            Ok(target) => targets.push(target),
            Err(TargetError::Empty) => continue,
            Err(e) => crate::warn!("Skipping target line: {e}"),
        }
    }

    for (first, other) in shared_file_stems(&targets) {
        crate::warn!("{other} shares an output file with {first}");
    }

    targets
}

/// Pairs of distinct targets whose artifacts would share a file name, such
/// as `a.b` and `a_b`. Each pair names the earlier target first.
pub fn shared_file_stems(targets: &[Target]) -> Vec<(Target, Target)> {
    let mut owners: HashMap<String, &Target> = HashMap::new();
    let mut shared: Vec<(Target, Target)> = Vec::new();

    for target in targets {
        match owners.get(&target.file_stem()) {
            Some(first) if *first != target => shared.push(((*first).clone(), target.clone())),
            Some(_) => {}
            None => {
                owners.insert(target.file_stem(), target);
            }
        }
    }

    shared
}

/// Reads and parses the target list at `path`.
pub fn load_targets(path: &Path) -> Result<Vec<Target>, LoadError> {
    let bytes: Vec<u8> = fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let text = String::from_utf8_lossy(&bytes);
    Ok(parse_target_list(&text))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
