use std::fmt;

use colored::*;
use reachr_common::{PROBE_TARGET, SUCCESS_TARGET};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::registry::LookupSpan;

use crate::terminal::{colors, print};

pub struct ReachrFormatter;

/// Fields carried by probe summaries and raw print lines.
#[derive(Default)]
struct LineFields {
    outcome: Option<String>,
    line: Option<String>,
    raw_msg: Option<String>,
}

impl Visit for LineFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.store(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.store(field, format!("{value:?}"));
    }
}

impl LineFields {
    fn store(&mut self, field: &Field, value: String) {
        match field.name() {
            "outcome" => self.outcome = Some(value),
            "line" => self.line = Some(value),
            "raw_msg" => self.raw_msg = Some(value),
            _ => {}
        }
    }
}

fn outcome_symbol(outcome: &str) -> ColoredString {
    match outcome {
        "SUCCESS" => "[+]".color(colors::SUCCESS).bold(),
        "TIMEOUT" => "[*]".color(colors::TIMEOUT).bold(),
        "FAILED" => "[-]".color(colors::FAILED).bold(),
        _ => "[!]".color(colors::ERROR).bold(),
    }
}

fn level_symbol(level: Level) -> ColoredString {
    match level {
        Level::TRACE => "[ ]".dimmed(),
        Level::DEBUG => "[?]".blue(),
        Level::INFO => "[*]".bright_blue().bold(),
        Level::WARN => "[*]".yellow().bold(),
        Level::ERROR => "[-]".red().bold(),
    }
}

impl<S, N> FormatEvent<S, N> for ReachrFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();

        match meta.target() {
            PROBE_TARGET | print::PRINT_TARGET => {
                let mut fields: LineFields = LineFields::default();
                event.record(&mut fields);

                if let Some(raw) = fields.raw_msg {
                    return writeln!(writer, "{raw}");
                }
                let outcome: String = fields.outcome.unwrap_or_default();
                let line: String = fields.line.unwrap_or_default();
                writeln!(writer, "{} {}", outcome_symbol(&outcome), line)
            }
            SUCCESS_TARGET => {
                write!(writer, "{} ", "[+]".green().bold())?;
                ctx.field_format().format_fields(writer.by_ref(), event)?;
                writeln!(writer)
            }
            _ => {
                write!(writer, "{} ", level_symbol(*meta.level()))?;
                ctx.field_format().format_fields(writer.by_ref(), event)?;
                writeln!(writer)
            }
        }
    }
}

/// Default filter for a quiet level. `RUST_LOG` wins when set.
fn default_directives(quiet: u8) -> &'static str {
    match quiet {
        0 => "info",
        1 => "warn,reachr::probe=info,reachr::print=info",
        _ => "warn",
    }
}

pub fn init(quiet: u8) {
    let filter: EnvFilter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(quiet)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(ReachrFormatter)
        .init();
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
