//! Domain layer containing the ranking logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `ahp` - Criterion hierarchy, weight derivation, scoring and ranking

pub mod ahp;
pub mod foundation;
