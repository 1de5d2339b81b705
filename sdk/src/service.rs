use crate::pipeline::{DiscoveryPipeline, PipelineError, RunOutcome};
use std::sync::Arc;
use tracing::info;

/// What a topology viewer talks to.
///
/// Requests are not serialized: two refreshes running at once both write
/// the same files and the last one wins.
#[derive(Clone)]
pub struct TopologyService {
    pipeline: Arc<DiscoveryPipeline>,
}

impl TopologyService {
    pub fn new(pipeline: Arc<DiscoveryPipeline>) -> Self {
        Self { pipeline }
    }

    /// Current snapshot file bytes, verbatim. Runs discovery first if
    /// nothing has been published yet.
    pub async fn fetch_current(&self) -> Result<Vec<u8>, PipelineError> {
        let store = self.pipeline.store();
        let current = &self.pipeline.paths().current;

        if let Some(bytes) = store.read_raw(current).await? {
            return Ok(bytes);
        }

        info!("No topology at {}, running discovery", current.display());
        self.pipeline.run().await?;

        store
            .read_raw(current)
            .await?
            .ok_or(PipelineError::NoTopology)
    }

    /// Runs discovery and returns once the result is persisted.
    pub async fn refresh(&self) -> Result<RunOutcome, PipelineError> {
        self.pipeline.run().await
    }
}
