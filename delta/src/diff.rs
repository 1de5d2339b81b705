use topomap_core::model::{DeltaColor, Link, Node, Snapshot};
use tracing::debug;

/// Entities that can be merged into a color-annotated snapshot.
trait Colored: Clone {
    fn same_entity(&self, other: &Self) -> bool;
    fn painted(&self, color: DeltaColor) -> Self;
}

impl Colored for Node {
    fn same_entity(&self, other: &Self) -> bool {
        Node::same_entity(self, other)
    }

    fn painted(&self, color: DeltaColor) -> Self {
        self.clone().with_color(color)
    }
}

impl Colored for Link {
    fn same_entity(&self, other: &Self) -> bool {
        Link::same_entity(self, other)
    }

    fn painted(&self, color: DeltaColor) -> Self {
        self.clone().with_color(color)
    }
}

/// Compares two snapshots and produces a merged one where every entity
/// carries a delta color. Neither input is modified.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiffEngine;

impl DiffEngine {
    pub fn new() -> Self {
        Self
    }

    /// Output order: added, removed, unchanged nodes; then added, removed,
    /// unchanged links. Consumers rely on this order staying stable.
    pub fn diff(&self, previous: &Snapshot, current: &Snapshot) -> Snapshot {
        let nodes = merge(&previous.nodes, &current.nodes);
        let links = merge(&previous.links, &current.links);

        debug!(
            nodes = nodes.len(),
            links = links.len(),
            "snapshot diff computed"
        );

        Snapshot::new(nodes, links)
    }
}

pub fn diff(previous: &Snapshot, current: &Snapshot) -> Snapshot {
    DiffEngine::new().diff(previous, current)
}

fn merge<T: Colored>(previous: &[T], current: &[T]) -> Vec<T> {
    let mut merged: Vec<T> = Vec::with_capacity(previous.len().max(current.len()));

    let added = current.iter().filter(|c| !contains(previous, c));
    append(&mut merged, added, DeltaColor::Added);

    let removed = previous.iter().filter(|p| !contains(current, p));
    append(&mut merged, removed, DeltaColor::Removed);

    let unchanged = current.iter().filter(|c| contains(previous, c));
    append(&mut merged, unchanged, DeltaColor::Unchanged);

    merged
}

fn append<'a, T: Colored + 'a>(
    merged: &mut Vec<T>,
    entities: impl Iterator<Item = &'a T>,
    color: DeltaColor,
) {
    for entity in entities {
        if !contains(merged.as_slice(), entity) {
            merged.push(entity.painted(color));
        }
    }
}

fn contains<T: Colored>(haystack: &[T], needle: &T) -> bool {
    haystack.iter().any(|e| e.same_entity(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use topomap_core::model::NodeType;

    #[test]
    fn test_duplicates_in_inputs_are_collapsed() {
        let previous = Snapshot::new(
            vec![
                Node::new("a", NodeType::Switch),
                Node::new("a", NodeType::Router),
            ],
            vec![],
        );
        let current = Snapshot::new(vec![Node::new("a", NodeType::Switch)], vec![]);

        let merged = diff(&previous, &current);
        assert_eq!(
            merged.nodes,
            vec![Node::new("a", NodeType::Switch).with_color(DeltaColor::Unchanged)]
        );
    }

    #[test]
    fn test_unchanged_node_takes_current_type() {
        let previous = Snapshot::new(vec![Node::new("a", NodeType::Switch)], vec![]);
        let current = Snapshot::new(vec![Node::new("a", NodeType::Router)], vec![]);

        let merged = diff(&previous, &current);
        assert_eq!(merged.nodes[0].node_type, NodeType::Router);
        assert_eq!(merged.nodes[0].color, Some(DeltaColor::Unchanged));
    }
}
