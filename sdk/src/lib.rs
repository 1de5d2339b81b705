pub mod pipeline;
pub mod service;

pub use pipeline::{DiscoveryPipeline, PipelineError, RunOutcome, SnapshotPaths};
pub use service::TopologyService;
