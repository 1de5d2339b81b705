use serde::{Deserialize, Serialize};

/// An inventory device. `name` is the identity used throughout the topology,
/// `hostname` and `port` are how the device is reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    pub name: String,
    pub hostname: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    22
}

impl Host {
    pub fn new(name: impl Into<String>, hostname: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            hostname: hostname.into(),
            port,
        }
    }
}

/// One parsed row of a device's neighbor table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborRecord {
    pub hostname: String,
    pub local_interface: String,
    pub neighbor_interface: String,
    pub is_router: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Router,
    Switch,
}

/// Delta annotation painted onto entities of a merged snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeltaColor {
    #[serde(rename = "green")]
    Added,
    #[serde(rename = "red")]
    Removed,
    #[serde(rename = "black")]
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "Hostname")]
    pub hostname: String,
    #[serde(rename = "Type")]
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<DeltaColor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "SourceInterface")]
    pub source_interface: String,
    #[serde(rename = "Destination")]
    pub destination: String,
    #[serde(rename = "DestinationInterface")]
    pub destination_interface: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<DeltaColor>,
}

/// Full discovered topology at one point in time.
///
/// Node order follows the device inventory, link order follows aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// A `(host, interface)` pair. Used as a lookup key, never stored in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub host: String,
    pub interface: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOutcome {
    Collected(Vec<NeighborRecord>),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostResult {
    pub host: String,
    pub outcome: HostOutcome,
}

/// Per-device results of one collection run, in inventory order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionResults {
    entries: Vec<HostResult>,
}

impl Node {
    pub fn new(hostname: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            hostname: hostname.into(),
            node_type,
            color: None,
        }
    }

    pub fn with_color(mut self, color: DeltaColor) -> Self {
        self.color = Some(color);
        self
    }

    /// Nodes are the same entity when their hostnames match; type is ignored.
    pub fn same_entity(&self, other: &Node) -> bool {
        self.hostname == other.hostname
    }
}

impl Link {
    pub fn new(
        source: impl Into<String>,
        source_interface: impl Into<String>,
        destination: impl Into<String>,
        destination_interface: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            source_interface: source_interface.into(),
            destination: destination.into(),
            destination_interface: destination_interface.into(),
            color: None,
        }
    }

    pub fn with_color(mut self, color: DeltaColor) -> Self {
        self.color = Some(color);
        self
    }


    /// Directional match on all four endpoint fields. The same cable seen
    /// from the opposite end is a different entity.
    pub fn same_entity(&self, other: &Link) -> bool {
        self.source == other.source
            && self.source_interface == other.source_interface
            && self.destination == other.destination
            && self.destination_interface == other.destination_interface
    }
}

impl Endpoint {
    pub fn new(host: impl Into<String>, interface: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            interface: interface.into(),
        }
    }
}

impl Snapshot {
    pub fn new(nodes: Vec<Node>, links: Vec<Link>) -> Self {
        Self { nodes, links }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Only snapshots with at least one node and one link may be persisted.
    pub fn is_publishable(&self) -> bool {
        !self.nodes.is_empty() && !self.links.is_empty()
    }

    pub fn node(&self, hostname: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.hostname == hostname)
    }

    /// The topology as it stood when this snapshot was taken: entities
    /// marked removed are dropped and all colors cleared.
    pub fn observed(&self) -> Snapshot {
        let nodes = self
            .nodes
            .iter()
            .filter(|n| n.color != Some(DeltaColor::Removed))
            .map(|n| Node {
                color: None,
                ..n.clone()
            })
            .collect();
        let links = self
            .links
            .iter()
            .filter(|l| l.color != Some(DeltaColor::Removed))
            .map(|l| Link {
                color: None,
                ..l.clone()
            })
            .collect();
        Snapshot { nodes, links }
    }
}

impl HostResult {
    pub fn collected(host: impl Into<String>, neighbors: Vec<NeighborRecord>) -> Self {
        Self {
            host: host.into(),
            outcome: HostOutcome::Collected(neighbors),
        }
    }

    pub fn failed(host: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            outcome: HostOutcome::Failed(reason.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, HostOutcome::Failed(_))
    }
}

impl CollectionResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: HostResult) {
        self.entries.push(result);
    }

    pub fn iter(&self) -> impl Iterator<Item = &HostResult> {
        self.entries.iter()
    }

    pub fn get(&self, host: &str) -> Option<&HostResult> {
        self.entries.iter().find(|r| r.host == host)
    }

    pub fn failed_hosts(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|r| r.is_failed())
            .map(|r| r.host.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<HostResult> for CollectionResults {
    fn from_iter<I: IntoIterator<Item = HostResult>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
