pub mod build;
pub mod reader;
pub mod shared;
pub mod stats;
pub mod types;
pub mod writer;

pub use build::ClosestMatch;
pub use shared::SharedIndex;
pub use stats::IndexStats;
pub use types::*;
