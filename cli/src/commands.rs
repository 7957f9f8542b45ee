pub mod monitor;

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use reachr_common::config::{Config, DEFAULT_TARGETS_FILE, StopPolicy};
use reachr_common::probe::ProbeKind;
use reachr_common::utils::duration::parse_duration;

#[derive(Parser)]
#[command(name = "reachr")]
#[command(version, about = "Continuous ping and traceroute monitoring.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Reduce output (-q hides status lines, -qq also hides probe lines)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Skip the start-up banner
    #[arg(long, global = true)]
    pub no_banner: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ping every target on a fixed cadence
    #[command(alias = "p")]
    Ping(ProbeArgs),
    /// Trace the route to every target on a fixed cadence
    #[command(alias = "t")]
    Trace(ProbeArgs),
}

impl Commands {
    pub fn split(self) -> (ProbeKind, ProbeArgs) {
        match self {
            Commands::Ping(args) => (ProbeKind::Ping, args),
            Commands::Trace(args) => (ProbeKind::Trace, args),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ProbeArgs {
    /// File with one target per line
    #[arg(short = 'f', long = "targets", default_value = DEFAULT_TARGETS_FILE)]
    pub targets_file: PathBuf,

    /// Directory for the per-target logs
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Time between cycle starts (e.g. 3s, 500ms, 1m)
    #[arg(short, long, value_parser = parse_duration)]
    pub cadence: Option<Duration>,

    /// Hard limit for a single probe
    #[arg(short, long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Probes allowed to run at once
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Let in-flight probes finish on Ctrl+C
    #[arg(long, conflicts_with = "abandon")]
    pub drain: bool,

    /// Kill in-flight probes on Ctrl+C
    #[arg(long)]
    pub abandon: bool,
}

impl ProbeArgs {
    /// Overlays the flags on the defaults for `kind`.
    pub fn into_config(self, kind: ProbeKind, quiet: u8) -> Config {
        let mut cfg: Config = Config::for_kind(kind);
        cfg.targets_file = self.targets_file;
        cfg.quiet = quiet;
        cfg.workers = self.workers;

        if let Some(output) = self.output {
            cfg.output_root = output;
        }
        if let Some(cadence) = self.cadence {
            cfg.cadence = cadence;
        }
        if let Some(timeout) = self.timeout {
            cfg.timeout = timeout;
        }
        if self.drain {
            cfg.stop_policy = StopPolicy::Drain;
        } else if self.abandon {
            cfg.stop_policy = StopPolicy::Abandon;
        }

        cfg
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
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

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn config_from(argv: &[&str]) -> Config {
        let cli: CommandLine = CommandLine::try_parse_from(argv).unwrap();
        let (kind, args) = cli.command.split();
        args.into_config(kind, cli.quiet)
    }

    #[test]
    fn command_line_is_well_formed() {
        CommandLine::command().debug_assert();
    }

    #[test]
    fn ping_defaults() {
        let cfg: Config = config_from(&["reachr", "ping"]);
        assert_eq!(cfg.kind, ProbeKind::Ping);
        assert_eq!(cfg.targets_file, PathBuf::from(DEFAULT_TARGETS_FILE));
        assert_eq!(cfg.cadence, Duration::from_secs(3));
        assert_eq!(cfg.timeout, Duration::from_secs(2));
        assert_eq!(cfg.stop_policy, StopPolicy::Drain);
        assert_eq!(cfg.quiet, 0);
    }

    #[test]
    fn trace_flags_override_defaults() {
        let cfg: Config = config_from(&[
            "reachr", "-qq", "t", "-f", "hosts.txt", "-o", "out", "-c", "1m", "-t", "30s", "-w",
            "4", "--drain",
        ]);
        assert_eq!(cfg.kind, ProbeKind::Trace);
        assert_eq!(cfg.targets_file, PathBuf::from("hosts.txt"));
        assert_eq!(cfg.output_root, PathBuf::from("out"));
        assert_eq!(cfg.cadence, Duration::from_secs(60));
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        assert_eq!(cfg.workers, Some(4));
        assert_eq!(cfg.stop_policy, StopPolicy::Drain);
        assert_eq!(cfg.quiet, 2);
    }

    #[yare::parameterized(
        zero_cadence   = { &["reachr", "ping", "-c", "0"] },
        bad_timeout    = { &["reachr", "ping", "-t", "soon"] },
        both_policies  = { &["reachr", "trace", "--drain", "--abandon"] },
        no_subcommand  = { &["reachr"] },
    )]
    fn rejected(argv: &[&str]) {
        assert!(CommandLine::try_parse_from(argv).is_err());
    }
}
