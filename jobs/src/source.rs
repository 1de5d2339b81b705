use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use topomap_core::model::Host;

/// Runs a command on a device and returns its raw text output.
#[async_trait]
pub trait NeighborSource: Send + Sync {
    async fn fetch(&self, host: &Host, command: &str) -> anyhow::Result<String>;
}

/// Reads previously captured command output from `<dir>/<host name>.txt`.
pub struct CapturedOutputSource {
    dir: PathBuf,
}

impl CapturedOutputSource {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn capture_path(&self, host: &Host) -> PathBuf {
        self.dir.join(format!("{}.txt", host.name))
    }
}

#[async_trait]
impl NeighborSource for CapturedOutputSource {
    async fn fetch(&self, host: &Host, _command: &str) -> anyhow::Result<String> {
        let path = self.capture_path(host);
        tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("no captured output for {} at {}", host.name, path.display()))
    }
}
