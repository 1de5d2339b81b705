use std::collections::{HashMap, HashSet};
use topomap_core::model::{
    CollectionResults, Endpoint, HostOutcome, Link, Node, NodeType, Snapshot,
};
use tracing::{debug, info};

/// Links keyed by their source endpoint, kept in first-insertion order.
#[derive(Default)]
struct LinkTable {
    order: Vec<Endpoint>,
    targets: HashMap<Endpoint, Endpoint>,
}

impl LinkTable {
    /// True when `key` was already recorded pointing at `target`.
    fn points_to(&self, key: &Endpoint, target: &Endpoint) -> bool {
        self.targets.get(key) == Some(target)
    }

    fn insert(&mut self, source: Endpoint, destination: Endpoint) {
        if !self.targets.contains_key(&source) {
            self.order.push(source.clone());
        }
        self.targets.insert(source, destination);
    }

    fn into_links(mut self) -> Vec<Link> {
        self.order
            .into_iter()
            .filter_map(|source| {
                let destination = self.targets.remove(&source)?;
                Some(Link::new(
                    source.host,
                    source.interface,
                    destination.host,
                    destination.interface,
                ))
            })
            .collect()
    }
}

/// Aggregates per-device neighbor lists into one deduplicated snapshot.
#[derive(Debug, Default, Clone, Copy)]
pub struct TopologyBuilder;

impl TopologyBuilder {
    pub fn new() -> Self {
        Self
    }

    /// `inventory` fixes node order. Failed devices get no node, but links
    /// other devices report towards them are kept.
    pub fn build(&self, inventory: &[String], results: &CollectionResults) -> Snapshot {
        let mut failed: HashSet<&str> = HashSet::new();
        let mut routers: HashSet<&str> = HashSet::new();
        let mut links = LinkTable::default();

        for result in results.iter() {
            let neighbors = match &result.outcome {
                HostOutcome::Collected(neighbors) => neighbors,
                HostOutcome::Failed(_) => {
                    failed.insert(result.host.as_str());
                    continue;
                }
            };

            for neighbor in neighbors {
                if neighbor.is_router {
                    routers.insert(neighbor.hostname.as_str());
                }

                let source = Endpoint::new(&result.host, &neighbor.local_interface);
                let destination =
                    Endpoint::new(&neighbor.hostname, &neighbor.neighbor_interface);

                // Both ends of a cable report each other.
                if links.points_to(&destination, &source) {
                    continue;
                }

                links.insert(source, destination);
            }
        }

        // Hostnames stay unique even if the inventory lists a device twice.
        let mut seen: HashSet<&str> = HashSet::new();
        let nodes: Vec<Node> = inventory
            .iter()
            .filter(|host| !failed.contains(host.as_str()))
            .filter(|host| seen.insert(host.as_str()))
            .map(|host| {
                let node_type = if routers.contains(host.as_str()) {
                    NodeType::Router
                } else {
                    NodeType::Switch
                };
                Node::new(host.clone(), node_type)
            })
            .collect();

        let links = links.into_links();
        for link in links.iter().filter(|l| failed.contains(l.destination.as_str())) {
            debug!(
                source = %link.source,
                destination = %link.destination,
                "keeping link towards failed device"
            );
        }

        info!(
            nodes = nodes.len(),
            links = links.len(),
            failed = failed.len(),
            "topology assembled"
        );

        Snapshot::new(nodes, links)
    }
}
