//! Candidate Source Adapters
//!
//! Implementations of the CandidateSource port.
//!
//! ## Available Adapters
//!
//! - **FileCandidateSource** - Reads a JSON or YAML snapshot from disk
//! - **InMemoryCandidateSource** - Serves a fixed room list (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::candidates::{FileCandidateSource, InMemoryCandidateSource};
//!
//! let source = FileCandidateSource::new("./data/rooms.yaml");
//! let source = InMemoryCandidateSource::new(rooms);
//! ```

mod file;
mod in_memory;

pub use file::{CandidateFormat, FileCandidateSource};
pub use in_memory::InMemoryCandidateSource;
