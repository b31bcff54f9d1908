//! Room Ranker - Multi-criteria room selection
//!
//! This crate ranks candidate rooms with the Analytic Hierarchy Process:
//! pairwise-comparison matrices over comfort, health and usability criteria
//! yield priority weights, raw sensor and facility data are mapped to
//! suitability scores, and the scores are aggregated into a ranked result.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
