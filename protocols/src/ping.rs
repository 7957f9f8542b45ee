use reachr_common::probe::CommandTemplate;

const LATENCY_MARKERS: [&str; 2] = ["time=", "time<"];

/// One-echo ping for the host platform.
pub fn command() -> CommandTemplate {
    let count_flag: &str = if cfg!(windows) { "-n" } else { "-c" };
    CommandTemplate::new("ping", [count_flag, "1", "{target}"])
}

/// Extracts the round-trip time in milliseconds from ping output.
///
/// `time=4.2 ms` yields `4.2`; the Windows form `time<1ms` yields `<1`.
/// Returns `None` when no marker is present or the value is not numeric.
pub fn parse_latency(output: &str) -> Option<String> {
    let (idx, marker) = LATENCY_MARKERS
        .iter()
        .filter_map(|marker| output.find(marker).map(|idx| (idx, *marker)))
        .min_by_key(|(idx, _)| *idx)?;

    let rest: &str = &output[idx + marker.len()..];
    let value: &str = rest.split("ms").next()?.trim();

    if value.is_empty() || value.parse::<f64>().is_err() {
        return None;
    }

    match marker {
        "time<" => Some(format!("<{value}")),
        _ => Some(value.to_string()),
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

    const LINUX_REPLY: &str = "PING 10.0.0.5 (10.0.0.5) 56(84) bytes of data.\n\
        64 bytes from 10.0.0.5: icmp_seq=1 ttl=64 time=4.2 ms\n\n\
        --- 10.0.0.5 ping statistics ---\n\
        1 packets transmitted, 1 received, 0% packet loss, time 0ms\n\
        rtt min/avg/max/mdev = 4.200/4.200/4.200/0.000 ms\n";

    #[yare::parameterized(
        linux      = { LINUX_REPLY,                                         Some("4.2") },
        windows    = { "Reply from 10.0.0.5: bytes=32 time=13ms TTL=57",    Some("13") },
        sub_ms     = { "Reply from 10.0.0.5: bytes=32 time<1ms TTL=128",    Some("<1") },
        bare       = { "time=4.2 ms",                                       Some("4.2") },
        no_marker  = { "1 packets transmitted, 1 received, time 0ms",       None },
        not_number = { "time=fast ms",                                      None },
        empty      = { "",                                                  None },
    )]
    fn latency(output: &str, expected: Option<&str>) {
        assert_eq!(parse_latency(output).as_deref(), expected);
    }

    #[test]
    fn command_requests_exactly_one_echo() {
        let template: CommandTemplate = command();
        assert_eq!(template.program, "ping");
        assert_eq!(template.args[1], "1");
        assert_eq!(template.args.last().map(String::as_str), Some("{target}"));
    }
}
