use crate::queue::Job;
use crate::source::NeighborSource;
use discovery::NeighborParser;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use topomap_core::model::{Host, HostResult, NeighborRecord};
use tracing::{error, info};

/// What every worker of one collection run shares.
pub struct CollectionContext {
    pub source: Arc<dyn NeighborSource>,
    pub parser: NeighborParser,
    pub known_hosts: HashSet<String>,
    pub command: String,
    pub timeout: Option<Duration>,
}

pub struct Worker {
    id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<Job>>>,
    results: mpsc::Sender<(usize, HostResult)>,
    ctx: Arc<CollectionContext>,
}

impl Worker {
    pub fn new(
        id: usize,
        receiver: Arc<Mutex<mpsc::Receiver<Job>>>,
        results: mpsc::Sender<(usize, HostResult)>,
        ctx: Arc<CollectionContext>,
    ) -> Self {
        Self {
            id,
            receiver,
            results,
            ctx,
        }
    }

    pub async fn run(self) {
        info!("Worker {} started", self.id);
        loop {
            let job = { self.receiver.lock().await.recv().await };
            let Some(job) = job else {
                break;
            };

            match job {
                Job::CollectNeighbors { index, host } => {
                    info!("start collection on host {} {}", host.hostname, host.port);

                    // A panicking source must only cost this device, not the worker.
                    let ctx = self.ctx.clone();
                    let task_host = host.clone();
                    let task =
                        tokio::spawn(async move { process_collection(&ctx, &task_host).await });

                    let result = match task.await {
                        Ok(Ok(neighbors)) => {
                            info!("end collection on host {} {}", host.hostname, host.port);
                            HostResult::collected(host.name, neighbors)
                        }
                        Ok(Err(e)) => {
                            error!("Failed to collect neighbors from {}: {:#}", host.name, e);
                            HostResult::failed(host.name, format!("{:#}", e))
                        }
                        Err(e) => {
                            error!("Collection task for {} crashed: {}", host.name, e);
                            HostResult::failed(host.name, format!("collection task crashed: {}", e))
                        }
                    };

                    if self.results.send((index, result)).await.is_err() {
                        error!("Worker {}: result channel closed", self.id);
                        break;
                    }
                }
            }
        }
        info!("Worker {} stopped", self.id);
    }
}

async fn process_collection(
    ctx: &CollectionContext,
    host: &Host,
) -> anyhow::Result<Vec<NeighborRecord>> {
    let fetch = ctx.source.fetch(host, &ctx.command);
    let raw = match ctx.timeout {
        Some(limit) => tokio::time::timeout(limit, fetch)
            .await
            .map_err(|_| anyhow::anyhow!("timed out after {:?}", limit))??,
        None => fetch.await?,
    };

    Ok(ctx.parser.parse(&raw, &ctx.known_hosts))
}
