use crate::queue::{ChannelJobQueue, Job, JobQueue};
use crate::source::NeighborSource;
use crate::worker::{CollectionContext, Worker};
use discovery::NeighborParser;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use topomap_core::config::CollectionConfig;
use topomap_core::model::{CollectionResults, Host, HostResult};
use tracing::{error, info};

const DEFAULT_WORKERS: usize = 20;
const DEFAULT_COMMAND: &str = "show lldp neighbors";

/// Fans neighbor collection out over a bounded set of workers and waits for
/// every device before returning.
pub struct CollectionPool {
    source: Arc<dyn NeighborSource>,
    workers: usize,
    command: String,
    timeout: Option<Duration>,
}

impl CollectionPool {
    pub fn new(source: Arc<dyn NeighborSource>) -> Self {
        Self {
            source,
            workers: DEFAULT_WORKERS,
            command: DEFAULT_COMMAND.to_string(),
            timeout: None,
        }
    }

    pub fn from_config(source: Arc<dyn NeighborSource>, config: &CollectionConfig) -> Self {
        let timeout = (config.timeout_ms > 0).then(|| Duration::from_millis(config.timeout_ms));
        Self::new(source)
            .with_workers(config.workers)
            .with_command(config.command.clone())
            .with_timeout(timeout)
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// One result per host, in the order given. A device that fails, times
    /// out or takes its worker down is reported as failed; the others are
    /// unaffected. Neighbors are filtered against the names in `hosts`.
    pub async fn collect(&self, hosts: &[Host]) -> CollectionResults {
        if hosts.is_empty() {
            return CollectionResults::new();
        }

        let ctx = Arc::new(CollectionContext {
            source: self.source.clone(),
            parser: NeighborParser::new(),
            known_hosts: hosts.iter().map(|h| h.name.clone()).collect(),
            command: self.command.clone(),
            timeout: self.timeout,
        });

        let (job_tx, job_rx) = mpsc::channel(hosts.len());
        let (result_tx, mut result_rx) = mpsc::channel(hosts.len());
        let job_rx = Arc::new(Mutex::new(job_rx));

        let worker_count = self.workers.min(hosts.len());
        let mut handles = Vec::with_capacity(worker_count);
        for id in 0..worker_count {
            let worker = Worker::new(id, job_rx.clone(), result_tx.clone(), ctx.clone());
            handles.push(tokio::spawn(worker.run()));
        }
        drop(result_tx);
        drop(job_rx);

        let queue = ChannelJobQueue::new(job_tx);
        for (index, host) in hosts.iter().enumerate() {
            let job = Job::CollectNeighbors {
                index,
                host: host.clone(),
            };
            if let Err(e) = queue.enqueue(job).await {
                error!("Failed to enqueue collection for {}: {}", host.name, e);
            }
        }
        drop(queue);

        let mut slots: Vec<Option<HostResult>> = vec![None; hosts.len()];
        while let Some((index, result)) = result_rx.recv().await {
            if let Some(slot) = slots.get_mut(index) {
                *slot = Some(result);
            }
        }

        for handle in handles {
            if let Err(e) = handle.await {
                error!("Collection worker crashed: {}", e);
            }
        }

        let results: CollectionResults = slots
            .into_iter()
            .zip(hosts)
            .map(|(slot, host)| {
                slot.unwrap_or_else(|| HostResult::failed(&host.name, "collection did not complete"))
            })
            .collect();

        info!(
            hosts = results.len(),
            failed = results.failed_hosts().count(),
            "neighbor collection finished"
        );
        results
    }
}
