use std::net::IpAddr;

use reachr_common::probe::HopSequence;

/// Recovers the ordered, de-duplicated addresses found in `lines`.
///
/// Both IPv4 dotted quads and IPv6 literals are recognised. Every candidate
/// token must parse as an [`IpAddr`]; unspecified addresses are ignored.
pub fn extract_hops<S: AsRef<str>>(lines: &[S]) -> HopSequence {
    let mut hops: HopSequence = HopSequence::new();
    for line in lines {
        for addr in addresses(line.as_ref()) {
            hops.push(&addr);
        }
    }
    hops
}

fn addresses(line: &str) -> impl Iterator<Item = String> + '_ {
    line.split(|c: char| !is_address_char(c))
        .map(|token| token.trim_matches(|c: char| c == '.' || c == ':'))
        .filter(|token| token.contains('.') || token.contains(':'))
        .filter_map(|token| token.parse::<IpAddr>().ok())
        .filter(|addr| !addr.is_unspecified())
        .map(|addr| addr.to_string())
}

fn is_address_char(c: char) -> bool {
    c.is_ascii_hexdigit() || c == '.' || c == ':'
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
