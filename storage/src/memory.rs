use crate::codec::{archive_path, decode_snapshot, encode_snapshot};
use crate::store::{local_clock, Clock, SavedSnapshot, SnapshotStore, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use topomap_core::model::Snapshot;

/// In-process store keyed by path. Holds the same encoded bytes the file
/// store would write, so `read_raw` and `load` behave identically.
pub struct MemorySnapshotStore {
    files: RwLock<HashMap<PathBuf, Vec<u8>>>,
    clock: Clock,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::with_clock(local_clock())
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Seed raw bytes, e.g. a corrupt file.
    pub async fn put_raw(&self, path: impl Into<PathBuf>, bytes: Vec<u8>) {
        self.files.write().await.insert(path.into(), bytes);
    }

    pub async fn paths(&self) -> Vec<PathBuf> {
        let files = self.files.read().await;
        let mut out: Vec<PathBuf> = files.keys().cloned().collect();
        out.sort();
        out
    }
}

impl Default for MemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self, path: &Path) -> Snapshot {
        let files = self.files.read().await;
        files
            .get(path)
            .and_then(|bytes| decode_snapshot(bytes).ok())
            .unwrap_or_default()
    }

    async fn save(&self, snapshot: &Snapshot, path: &Path) -> Result<SavedSnapshot, StoreError> {
        let bytes = encode_snapshot(snapshot)?;
        let archive = archive_path(path, (self.clock)());

        let mut files = self.files.write().await;
        files.insert(archive.clone(), bytes.clone());
        files.insert(path.to_path_buf(), bytes);

        Ok(SavedSnapshot {
            path: path.to_path_buf(),
            archive,
        })
    }

    async fn rotate(&self, current: &Path, previous: &Path) -> Result<(), StoreError> {
        let mut files = self.files.write().await;
        if let Some(bytes) = files.get(current).cloned() {
            files.insert(previous.to_path_buf(), bytes);
        }
        Ok(())
    }

    async fn read_raw(&self, path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.files.read().await.get(path).cloned())
    }

    async fn exists(&self, path: &Path) -> bool {
        self.files.read().await.contains_key(path)
    }
}
