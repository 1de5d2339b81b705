use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use topomap_core::error::{ErrorCode, TopomapError};
use topomap_core::model::Snapshot;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl TopomapError for StoreError {
    fn error_code(&self) -> ErrorCode {
        match self {
            StoreError::Io(_) => ErrorCode::Unavailable,
            StoreError::Encode(_) => ErrorCode::Internal,
        }
    }
}

/// Where a saved snapshot ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedSnapshot {
    pub path: PathBuf,
    pub archive: PathBuf,
}

/// Wall-clock source for archive names.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

pub fn local_clock() -> Clock {
    Arc::new(|| Local::now().naive_local())
}

/// Persistence for topology snapshots.
///
/// Nothing here serializes concurrent writers: two runs saving to the same
/// paths race and the last one wins.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Returns an empty snapshot when the file is missing, unreadable or
    /// not a valid snapshot. Callers cannot tell these cases apart.
    async fn load(&self, path: &Path) -> Snapshot;

    /// Writes `snapshot` to `path` and a timestamped copy next to it.
    async fn save(&self, snapshot: &Snapshot, path: &Path) -> Result<SavedSnapshot, StoreError>;

    /// Copies `current` over `previous`. Does nothing if `current` is missing.
    async fn rotate(&self, current: &Path, previous: &Path) -> Result<(), StoreError>;

    /// Stored bytes, verbatim.
    async fn read_raw(&self, path: &Path) -> Result<Option<Vec<u8>>, StoreError>;

    async fn exists(&self, path: &Path) -> bool;
}
