pub mod codec;
pub mod memory;
pub mod snapshot;
pub mod store;

pub use codec::{archive_path, decode_snapshot, encode_snapshot};
pub use memory::MemorySnapshotStore;
pub use snapshot::FileSnapshotStore;
pub use store::{local_clock, Clock, SavedSnapshot, SnapshotStore, StoreError};
