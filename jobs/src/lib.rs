pub mod pool;
pub mod queue;
pub mod source;
pub mod worker;

pub use pool::CollectionPool;
pub use queue::{ChannelJobQueue, Job, JobQueue};
pub use source::{CapturedOutputSource, NeighborSource};
