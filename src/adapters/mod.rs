//! Adapters - Implementations of the ports.
//!
//! - `candidates` - Where rooms to rank come from
//! - `publishing` - Where finished rankings go

pub mod candidates;
pub mod publishing;

pub use candidates::{CandidateFormat, FileCandidateSource, InMemoryCandidateSource};
pub use publishing::{FileRankingPublisher, InMemoryRankingPublisher, OutputFormat};
