//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the ranking core and the outside world. Adapters implement these ports.
//!
//! - `CandidateSource` - Supplies room snapshots to rank
//! - `RankingPublisher` - Receives finished rankings

mod candidate_source;
mod ranking_publisher;

pub use candidate_source::{CandidateSource, CandidateSourceError};
pub use ranking_publisher::{RankingPublisher, RankingPublisherError};
