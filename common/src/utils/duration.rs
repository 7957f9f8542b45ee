use std::time::Duration;

/// Parses a human duration: plain seconds (`45`, `2.5`) or a value with an
/// `ms`, `s` or `m` suffix (`500ms`, `2s`, `1m`).
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s: &str = s.trim();
    let (number, to_secs): (&str, fn(f64) -> f64) = if let Some(ms) = s.strip_suffix("ms") {
        (ms, |v| v / 1000.0)
    } else if let Some(secs) = s.strip_suffix('s') {
        (secs, |v| v)
    } else if let Some(mins) = s.strip_suffix('m') {
        (mins, |v| v * 60.0)
    } else {
        (s, |v| v)
    };

    let value: f64 = number
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid duration '{s}': {e}"))?;

    if !value.is_finite() || value <= 0.0 {
        return Err(format!("duration must be positive: '{s}'"));
    }

    Ok(Duration::from_secs_f64(to_secs(value)))
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

    #[yare::parameterized(
        plain_seconds = { "45",    Duration::from_secs(45) },
        fractional    = { "2.5",   Duration::from_millis(2500) },
        millis        = { "500ms", Duration::from_millis(500) },
        seconds       = { "2s",    Duration::from_secs(2) },
        minutes       = { "1m",    Duration::from_secs(60) },
    )]
    fn parses(input: &str, expected: Duration) {
        assert_eq!(parse_duration(input), Ok(expected));
    }

    #[yare::parameterized(
        empty    = { "" },
        zero     = { "0" },
        negative = { "-3" },
        garbage  = { "soon" },
    )]
    fn rejects(input: &str) {
        assert!(parse_duration(input).is_err());
    }
}
