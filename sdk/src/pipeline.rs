use delta::{DiffEngine, DiffSummary};
use discovery::TopologyBuilder;
use jobs::{CollectionPool, NeighborSource};
use std::path::PathBuf;
use std::sync::Arc;
use storage::{SavedSnapshot, SnapshotStore, StoreError};
use thiserror::Error;
use topomap_core::config::AppConfig;
use topomap_core::error::{ErrorCode, TopomapError};
use topomap_core::model::{Host, Snapshot};
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
    #[error("No topology has been published yet")]
    NoTopology,
}

impl TopomapError for PipelineError {
    fn error_code(&self) -> ErrorCode {
        match self {
            PipelineError::Store(e) => e.error_code(),
            PipelineError::NoTopology => ErrorCode::NotFound,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPaths {
    pub current: PathBuf,
    pub previous: PathBuf,
}

impl SnapshotPaths {
    pub fn new(current: impl Into<PathBuf>, previous: impl Into<PathBuf>) -> Self {
        Self {
            current: current.into(),
            previous: previous.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Published {
        summary: DiffSummary,
        saved: SavedSnapshot,
    },
    /// The run produced no nodes or no links; nothing on disk was touched.
    Skipped { nodes: usize, links: usize },
}

/// One full discovery run: collect, build, diff against the last run, persist.
pub struct DiscoveryPipeline {
    hosts: Vec<Host>,
    collector: CollectionPool,
    builder: TopologyBuilder,
    diff: DiffEngine,
    store: Arc<dyn SnapshotStore>,
    paths: SnapshotPaths,
}

impl DiscoveryPipeline {
    pub fn new(
        hosts: Vec<Host>,
        collector: CollectionPool,
        store: Arc<dyn SnapshotStore>,
        paths: SnapshotPaths,
    ) -> Self {
        Self {
            hosts,
            collector,
            builder: TopologyBuilder::new(),
            diff: DiffEngine::new(),
            store,
            paths,
        }
    }

    pub fn from_config(
        config: &AppConfig,
        source: Arc<dyn NeighborSource>,
        store: Arc<dyn SnapshotStore>,
    ) -> Self {
        Self::new(
            config.inventory.hosts.clone(),
            CollectionPool::from_config(source, &config.collection),
            store,
            SnapshotPaths::new(config.current_path(), config.previous_path()),
        )
    }

    pub fn store(&self) -> &Arc<dyn SnapshotStore> {
        &self.store
    }

    pub fn paths(&self) -> &SnapshotPaths {
        &self.paths
    }

    pub async fn run(&self) -> Result<RunOutcome, PipelineError> {
        info!("Starting topology discovery for {} devices", self.hosts.len());

        let results = self.collector.collect(&self.hosts).await;
        let inventory: Vec<String> = self.hosts.iter().map(|h| h.name.clone()).collect();
        let current = self.builder.build(&inventory, &results);

        self.publish(current).await
    }

    /// Diff `current` against the stored topology and persist the merged
    /// result. Empty topologies are refused so an outage cannot overwrite
    /// the last good snapshot.
    pub async fn publish(&self, current: Snapshot) -> Result<RunOutcome, PipelineError> {
        if !current.is_publishable() {
            warn!(
                nodes = current.nodes.len(),
                links = current.links.len(),
                "Discovered topology is empty, keeping the stored snapshot"
            );
            return Ok(RunOutcome::Skipped {
                nodes: current.nodes.len(),
                links: current.links.len(),
            });
        }

        self.store
            .rotate(&self.paths.current, &self.paths.previous)
            .await?;
        let previous = self.store.load(&self.paths.previous).await.observed();

        let merged = self.diff.diff(&previous, &current);
        let summary = DiffSummary::of(&merged);
        let saved = self.store.save(&merged, &self.paths.current).await?;

        info!("Topology published: {}", summary);
        Ok(RunOutcome::Published { summary, saved })
    }
}
