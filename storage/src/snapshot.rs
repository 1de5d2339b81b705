use crate::codec::{archive_path, decode_snapshot, encode_snapshot};
use crate::store::{local_clock, Clock, SavedSnapshot, SnapshotStore, StoreError};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use topomap_core::model::Snapshot;
use tracing::{debug, info, warn};

/// Snapshot files on the local filesystem.
pub struct FileSnapshotStore {
    clock: Clock,
}

impl FileSnapshotStore {
    pub fn new() -> Self {
        Self {
            clock: local_clock(),
        }
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self { clock }
    }
}

impl Default for FileSnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

async fn ensure_parent(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load(&self, path: &Path) -> Snapshot {
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No snapshot at {}", path.display());
                return Snapshot::empty();
            }
            Err(e) => {
                warn!("Failed to read snapshot {}: {}", path.display(), e);
                return Snapshot::empty();
            }
        };

        match decode_snapshot(&bytes) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Ignoring unparsable snapshot {}: {}", path.display(), e);
                Snapshot::empty()
            }
        }
    }

    /// Atomically writes to a temp file then renames, then copies the result
    /// to its archive name.
    async fn save(&self, snapshot: &Snapshot, path: &Path) -> Result<SavedSnapshot, StoreError> {
        ensure_parent(path).await?;

        let bytes = encode_snapshot(snapshot)?;
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, &bytes).await?;
        fs::rename(&tmp_path, path).await?;
        info!("Topology snapshot written to {}", path.display());

        let archive = archive_path(path, (self.clock)());
        fs::copy(path, &archive).await?;
        info!("Topology snapshot archived as {}", archive.display());

        Ok(SavedSnapshot {
            path: path.to_path_buf(),
            archive,
        })
    }

    async fn rotate(&self, current: &Path, previous: &Path) -> Result<(), StoreError> {
        if !fs::try_exists(current).await? {
            debug!("Nothing to rotate, {} does not exist", current.display());
            return Ok(());
        }

        ensure_parent(previous).await?;
        fs::copy(current, previous).await?;
        debug!("Rotated {} to {}", current.display(), previous.display());
        Ok(())
    }

    async fn read_raw(&self, path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }
}
