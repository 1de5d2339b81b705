use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use topomap_core::model::NeighborRecord;
use tracing::debug;

/// `<device-id> <local-intf> <hold-time> [<capability>] <port-id>`
const NEIGHBOR_LINE: &str = r"^(?P<hostname>\S+)[ \t]+(?P<local>\S+)[ \t]+\d+[ \t]+(?:(?P<capability>\S+))?[ \t]+(?P<neighbor>\S+)$";

static NEIGHBOR_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(NEIGHBOR_LINE).expect("neighbor line pattern is valid"));

/// Extracts neighbor records from `show lldp neighbors` style output.
#[derive(Debug, Clone)]
pub struct NeighborParser {
    line: Regex,
}

impl NeighborParser {
    pub fn new() -> Self {
        Self {
            line: NEIGHBOR_LINE_RE.clone(),
        }
    }

    /// Lines that do not look like a neighbor row are skipped. Matches are
    /// dropped when the neighbor port is a sub-interface or the neighbor is
    /// not part of `known_hosts`.
    pub fn parse(&self, raw: &str, known_hosts: &HashSet<String>) -> Vec<NeighborRecord> {
        let mut out = Vec::new();

        for line in raw.lines() {
            let Some(caps) = self.line.captures(line) else {
                continue;
            };

            let hostname = &caps["hostname"];
            let neighbor_interface = &caps["neighbor"];
            let is_router = caps
                .name("capability")
                .is_some_and(|c| c.as_str().contains('R'));

            // Some IOS releases list the peer once per sub-interface.
            if neighbor_interface.contains('.') {
                debug!(hostname, neighbor_interface, "skipping sub-interface neighbor");
                continue;
            }

            if !known_hosts.contains(hostname) {
                debug!(hostname, "skipping neighbor outside inventory");
                continue;
            }

            out.push(NeighborRecord {
                hostname: hostname.to_string(),
                local_interface: caps["local"].to_string(),
                neighbor_interface: neighbor_interface.to_string(),
                is_router,
            });
        }

        out
    }
}

impl Default for NeighborParser {
    fn default() -> Self {
        Self::new()
    }
}

pub fn parse_neighbors(raw: &str, known_hosts: &HashSet<String>) -> Vec<NeighborRecord> {
    NeighborParser::new().parse(raw, known_hosts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_capability_is_optional() {
        let records = parse_neighbors("SW2   Gi0/1   120      Gi0/2", &hosts(&["SW2"]));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].local_interface, "Gi0/1");
        assert_eq!(records[0].neighbor_interface, "Gi0/2");
        assert!(!records[0].is_router);
    }

    #[test]
    fn test_crlf_line_endings() {
        let raw = "R2  Gi0/0  120  R  Gi0/1\r\nR3  Gi0/2  120  B,R  Gi0/3\r\n";
        let records = parse_neighbors(raw, &hosts(&["R2", "R3"]));
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].neighbor_interface, "Gi0/3");
        assert!(records.iter().all(|r| r.is_router));
    }
}
