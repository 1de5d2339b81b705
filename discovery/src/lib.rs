pub mod builder;
pub mod parser;

pub use builder::TopologyBuilder;
pub use parser::{parse_neighbors, NeighborParser};
