pub mod diff;
pub mod summary;

pub use diff::{diff, DiffEngine};
pub use summary::DiffSummary;
