use serde::Serialize;
use topomap_core::model::{DeltaColor, Snapshot};

/// Per-color counts of a merged snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub nodes_added: usize,
    pub nodes_removed: usize,
    pub nodes_unchanged: usize,
    pub links_added: usize,
    pub links_removed: usize,
    pub links_unchanged: usize,
}

impl DiffSummary {
    pub fn of(merged: &Snapshot) -> Self {
        let mut summary = Self::default();

        for node in &merged.nodes {
            match node.color {
                Some(DeltaColor::Added) => summary.nodes_added += 1,
                Some(DeltaColor::Removed) => summary.nodes_removed += 1,
                Some(DeltaColor::Unchanged) => summary.nodes_unchanged += 1,
                None => {}
            }
        }

        for link in &merged.links {
            match link.color {
                Some(DeltaColor::Added) => summary.links_added += 1,
                Some(DeltaColor::Removed) => summary.links_removed += 1,
                Some(DeltaColor::Unchanged) => summary.links_unchanged += 1,
                None => {}
            }
        }

        summary
    }

    pub fn has_changes(&self) -> bool {
        self.nodes_added + self.nodes_removed + self.links_added + self.links_removed > 0
    }
}

impl std::fmt::Display for DiffSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "nodes +{} -{} ={}, links +{} -{} ={}",
            self.nodes_added,
            self.nodes_removed,
            self.nodes_unchanged,
            self.links_added,
            self.links_removed,
            self.links_unchanged
        )
    }
}
