use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use jobs::{CapturedOutputSource, CollectionPool, NeighborSource};
use storage::{Clock, FileSnapshotStore, MemorySnapshotStore, SnapshotStore, StoreError};
use tempfile::tempdir;
use topomap_core::config::AppConfig;
use topomap_core::error::{ErrorCode, TopomapError};
use topomap_core::model::{DeltaColor, Host, Link, NodeType};
use topomap_sdk::{DiscoveryPipeline, PipelineError, RunOutcome, SnapshotPaths, TopologyService};

const CURRENT: &str = "data/topology.json";
const PREVIOUS: &str = "data/topology_previous.json";

/// Devices answer with whatever output is currently scripted for them;
/// unscripted devices refuse the connection.
#[derive(Default)]
struct LabSource {
    outputs: Mutex<HashMap<String, String>>,
    fetches: AtomicUsize,
}

impl LabSource {
    fn script(&self, host: &str, output: &str) {
        self.outputs
            .lock()
            .unwrap()
            .insert(host.to_string(), output.to_string());
    }

    fn unplug(&self, host: &str) {
        self.outputs.lock().unwrap().remove(host);
    }
}

#[async_trait]
impl NeighborSource for LabSource {
    async fn fetch(&self, host: &Host, _command: &str) -> anyhow::Result<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.outputs
            .lock()
            .unwrap()
            .get(&host.name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("connection refused"))
    }
}

fn fixed_clock() -> Clock {
    Arc::new(|| {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap()
    })
}

fn hosts(names: &[&str]) -> Vec<Host> {
    names
        .iter()
        .map(|name| Host::new(*name, format!("{}.lab", name), 22))
        .collect()
}

fn lab(names: &[&str]) -> (Arc<LabSource>, Arc<MemorySnapshotStore>, DiscoveryPipeline) {
    let source = Arc::new(LabSource::default());
    let store = Arc::new(MemorySnapshotStore::with_clock(fixed_clock()));
    let pipeline = DiscoveryPipeline::new(
        hosts(names),
        CollectionPool::new(source.clone()).with_workers(4),
        store.clone(),
        SnapshotPaths::new(CURRENT, PREVIOUS),
    );
    (source, store, pipeline)
}

#[tokio::test]
async fn test_first_run_publishes_everything_as_added() {
    let (source, store, pipeline) = lab(&["A", "B", "C"]);
    source.script("A", "B  eth0  120  B  eth1\n");
    source.script("B", "A  eth1  120  B  eth0\n");

    let outcome = pipeline.run().await.unwrap();

    let RunOutcome::Published { summary, saved } = outcome else {
        panic!("expected a published run, got {:?}", outcome);
    };
    assert_eq!(summary.nodes_added, 2);
    assert_eq!(summary.links_added, 1);
    assert_eq!(summary.nodes_removed + summary.links_removed, 0);
    assert_eq!(saved.archive, Path::new("data/topology_2024_06_01_12_30.json"));

    let current = store.load(Path::new(CURRENT)).await;
    let names: Vec<&str> = current.nodes.iter().map(|n| n.hostname.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
    assert!(current.nodes.iter().all(|n| n.node_type == NodeType::Switch));
    assert_eq!(
        current.links,
        vec![Link::new("A", "eth0", "B", "eth1").with_color(DeltaColor::Added)]
    );
    assert!(!store.exists(Path::new(PREVIOUS)).await);
}

#[tokio::test]
async fn test_second_identical_run_is_unchanged() {
    let (source, store, pipeline) = lab(&["A", "B"]);
    source.script("A", "B  eth0  120  R  eth1\n");
    source.script("B", "A  eth1  120  B  eth0\n");

    pipeline.run().await.unwrap();
    let outcome = pipeline.run().await.unwrap();

    let RunOutcome::Published { summary, .. } = outcome else {
        panic!("expected a published run, got {:?}", outcome);
    };
    assert!(!summary.has_changes());
    assert_eq!(summary.nodes_unchanged, 2);
    assert_eq!(summary.links_unchanged, 1);

    let current = store.load(Path::new(CURRENT)).await;
    assert_eq!(current.node("B").unwrap().node_type, NodeType::Router);
    assert!(store.exists(Path::new(PREVIOUS)).await);
}

#[tokio::test]
async fn test_total_outage_touches_no_files() {
    let (source, store, pipeline) = lab(&["A", "B"]);
    source.script("A", "B  eth0  120  B  eth1\n");
    source.script("B", "A  eth1  120  B  eth0\n");
    pipeline.run().await.unwrap();
    let before = store.read_raw(Path::new(CURRENT)).await.unwrap();
    let paths_before = store.paths().await;

    source.unplug("A");
    source.unplug("B");
    let outcome = pipeline.run().await.unwrap();

    assert_eq!(outcome, RunOutcome::Skipped { nodes: 0, links: 0 });
    assert_eq!(store.read_raw(Path::new(CURRENT)).await.unwrap(), before);
    assert_eq!(store.paths().await, paths_before);
}

#[tokio::test]
async fn test_departed_device_is_reported_once_then_forgotten() {
    let (source, store, pipeline) = lab(&["A", "B", "C"]);
    source.script("A", "B  eth0  120  B  eth1\nC  eth2  120  B  eth0\n");
    source.script("B", "A  eth1  120  B  eth0\n");
    source.script("C", "A  eth0  120  B  eth2\n");
    pipeline.run().await.unwrap();

    source.script("A", "B  eth0  120  B  eth1\n");
    source.unplug("C");
    pipeline.run().await.unwrap();

    let current = store.load(Path::new(CURRENT)).await;
    assert_eq!(current.node("C").unwrap().color, Some(DeltaColor::Removed));
    assert!(current
        .links
        .iter()
        .any(|l| l.destination == "C" && l.color == Some(DeltaColor::Removed)));

    pipeline.run().await.unwrap();

    let current = store.load(Path::new(CURRENT)).await;
    assert!(current.node("C").is_none());
    assert!(current
        .nodes
        .iter()
        .all(|n| n.color == Some(DeltaColor::Unchanged)));
    assert_eq!(current.links.len(), 1);
}

#[tokio::test]
async fn test_fetch_current_generates_lazily_once() {
    let (source, _store, pipeline) = lab(&["A", "B"]);
    source.script("A", "B  eth0  120  B  eth1\n");
    source.script("B", "A  eth1  120  B  eth0\n");
    let service = TopologyService::new(Arc::new(pipeline));

    let first = service.fetch_current().await.unwrap();
    let fetches_after_first = source.fetches.load(Ordering::SeqCst);
    let second = service.fetch_current().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(fetches_after_first, 2);
    assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    let text = String::from_utf8(first).unwrap();
    assert!(text.starts_with("{\n    \"links\": ["));
}

#[tokio::test]
async fn test_fetch_current_without_any_topology_is_not_found() {
    let (_source, _store, pipeline) = lab(&["A", "B"]);
    let service = TopologyService::new(Arc::new(pipeline));

    let err = service.fetch_current().await.unwrap_err();
    assert!(matches!(err, PipelineError::NoTopology));
    assert_eq!(err.error_code(), ErrorCode::NotFound);
}

#[test]
fn test_store_failures_keep_their_code_through_the_pipeline() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only volume");
    let err = PipelineError::from(StoreError::from(io));
    assert_eq!(err.error_code(), ErrorCode::Unavailable);

    let bad_json = storage::decode_snapshot(b"{").unwrap_err();
    let err = PipelineError::from(StoreError::from(bad_json));
    assert_eq!(err.error_code(), ErrorCode::Internal);
}

#[tokio::test]
async fn test_configured_run_on_disk() {
    let dir = tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let capture_dir = dir.path().join("captures");
    std::fs::create_dir_all(&capture_dir).unwrap();
    std::fs::write(
        capture_dir.join("R1.txt"),
        "Device ID  Local Intf  Hold-time  Capability  Port ID\n\
         SW1        Gi0/1       120        B           Gi0/24\n",
    )
    .unwrap();
    std::fs::write(
        capture_dir.join("SW1.txt"),
        "Device ID  Local Intf  Hold-time  Capability  Port ID\n\
         R1         Gi0/24      120        R           Gi0/1\n",
    )
    .unwrap();

    let config_path = dir.path().join("topomap.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
[storage]
data_dir = "{}"

[collection]
capture_dir = "{}"

[[inventory.hosts]]
name = "R1"
hostname = "10.0.0.1"

[[inventory.hosts]]
name = "SW1"
hostname = "10.0.0.2"
"#,
            data_dir.display().to_string().replace('\\', "/"),
            capture_dir.display().to_string().replace('\\', "/")
        ),
    )
    .unwrap();
    let config = AppConfig::from_file(&config_path).unwrap();

    let pipeline = DiscoveryPipeline::from_config(
        &config,
        Arc::new(CapturedOutputSource::new(&config.collection.capture_dir)),
        Arc::new(FileSnapshotStore::with_clock(fixed_clock())),
    );
    let outcome = TopologyService::new(Arc::new(pipeline))
        .refresh()
        .await
        .unwrap();

    assert!(matches!(outcome, RunOutcome::Published { .. }));
    let store = FileSnapshotStore::new();
    let current = store.load(&config.current_path()).await;
    assert_eq!(current.node("R1").unwrap().node_type, NodeType::Router);
    assert_eq!(current.node("SW1").unwrap().node_type, NodeType::Switch);
    assert_eq!(
        current.links,
        vec![Link::new("R1", "Gi0/1", "SW1", "Gi0/24").with_color(DeltaColor::Added)]
    );
    assert!(data_dir.join("topology_2024_06_01_12_30.json").exists());
}
