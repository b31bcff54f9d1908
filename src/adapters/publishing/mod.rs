//! Ranking Publisher Adapters
//!
//! Implementations of the RankingPublisher port.
//!
//! - **InMemoryRankingPublisher** - Keeps published results (testing/development)
//! - **FileRankingPublisher** - Writes each result as a JSON or YAML document

mod file;
mod in_memory;

pub use file::{FileRankingPublisher, OutputFormat};
pub use in_memory::InMemoryRankingPublisher;
