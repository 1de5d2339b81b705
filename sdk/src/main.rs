use std::sync::Arc;

use jobs::CapturedOutputSource;
use storage::FileSnapshotStore;
use topomap_core::config::AppConfig;
use topomap_sdk::{DiscoveryPipeline, RunOutcome, TopologyService};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    topomap_core::init_tracing();

    let config = AppConfig::load()?;
    let source = Arc::new(CapturedOutputSource::new(&config.collection.capture_dir));
    let store = Arc::new(FileSnapshotStore::new());
    let pipeline = DiscoveryPipeline::from_config(&config, source, store);
    let service = TopologyService::new(Arc::new(pipeline));

    match service.refresh().await? {
        RunOutcome::Published { summary, saved } => {
            info!("{} ({})", saved.path.display(), summary);
        }
        RunOutcome::Skipped { nodes, links } => {
            warn!("Nothing published ({} nodes, {} links)", nodes, links);
        }
    }

    Ok(())
}
