use std::fmt::Display;
use std::time::Duration;

use colored::*;
use reachr_common::config::{Config, StopPolicy};
use reachr_core::scheduler::RunSummary;
use tracing::info;

use crate::terminal::colors;

pub const TOTAL_WIDTH: usize = 64;

/// Target for pre-formatted lines written without a status symbol.
pub const PRINT_TARGET: &str = "reachr::print";

const KEY_WIDTH: usize = 10;

pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, raw_msg = msg);
}

pub fn banner(no_banner: bool, q_level: u8) {
    if no_banner || q_level > 0 {
        return;
    }

    let text_content: String = format!("⟦ REACHR v{} ⟧", env!("CARGO_PKG_VERSION"));
    let text_width: usize = text_content.chars().count();
    let text: ColoredString = text_content.bright_green().bold();
    let sep: ColoredString = "═".repeat(TOTAL_WIDTH.saturating_sub(text_width) / 2).bright_black();

    print(&format!("{sep}{text}{sep}"));
}

pub fn header(msg: &str, q_level: u8) {
    if q_level > 0 {
        return;
    }

    let formatted: String = format!("⟦ {} ⟧", msg);
    let dash_count: usize = TOTAL_WIDTH.saturating_sub(formatted.chars().count());
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line: ColoredString = format!(
        "{}{}{}",
        "─".repeat(left),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right)
    )
    .bright_black();

    print(&format!("{line}"));
}

pub fn fat_separator() {
    print(&format!("{}", "═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR)));
}

pub fn aligned_line<V: Display>(key: &str, value: V) {
    let dots: String = ".".repeat((KEY_WIDTH + 1).saturating_sub(key.len()));
    let output: String = format!(
        "{} {}{}{} {}",
        ">".color(colors::SEPARATOR),
        key.color(colors::PRIMARY),
        dots.color(colors::SEPARATOR),
        ":".color(colors::SEPARATOR),
        value.to_string().color(colors::TEXT_DEFAULT)
    );
    print(&output);
}

pub fn config_summary(cfg: &Config) {
    if cfg.quiet > 0 {
        return;
    }

    header(&format!("{} setup", cfg.kind), cfg.quiet);
    aligned_line("Targets", cfg.targets_file.display());
    aligned_line("Output", cfg.output_root.display());
    aligned_line("Cadence", seconds(cfg.cadence));
    aligned_line("Timeout", seconds(cfg.timeout));
    match cfg.workers {
        Some(workers) => aligned_line("Workers", workers),
        None => aligned_line("Workers", "auto"),
    }
    aligned_line(
        "On stop",
        match cfg.stop_policy {
            StopPolicy::Drain => "drain in-flight probes",
            StopPolicy::Abandon => "abandon in-flight probes",
        },
    );
}

pub fn run_summary(summary: &RunSummary, q_level: u8) {
    if q_level > 1 {
        return;
    }

    fat_separator();
    let cycles: ColoredString = summary.cycles.to_string().color(colors::ACCENT).bold();
    let recorded: ColoredString = summary.completed.to_string().green().bold();
    let output: String = format!("{cycles} cycles, {recorded} probes recorded");
    print(&format!("{}", output.color(colors::TEXT_DEFAULT)));

    if summary.late_cycles > 0 {
        aligned_line("Late", summary.late_cycles);
    }
    if summary.abandoned > 0 {
        aligned_line("Abandoned", summary.abandoned);
    }
    if summary.crashed > 0 {
        aligned_line("Crashed", summary.crashed);
    }
}

fn seconds(d: Duration) -> String {
    format!("{:.1}s", d.as_secs_f64())
}
