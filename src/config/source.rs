//! Candidate source and output configuration

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::error::ValidationError;
use crate::adapters::{CandidateFormat, OutputFormat};

/// Where candidates are read from and where rankings are written
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// JSON or YAML file holding the candidate rooms
    #[serde(default = "default_candidates_path")]
    pub candidates_path: PathBuf,

    /// Directory for published rankings; unset keeps results in memory only
    pub output_dir: Option<PathBuf>,

    /// Document format for published rankings
    #[serde(default)]
    pub output_format: OutputFormat,
}

impl SourceConfig {
    pub fn candidates_path(&self) -> &Path {
        &self.candidates_path
    }

    /// Validate source configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.candidates_path.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("source.candidates_path"));
        }
        CandidateFormat::from_path(&self.candidates_path).map_err(|_| {
            ValidationError::UnsupportedCandidateFormat(
                self.candidates_path.display().to_string(),
            )
        })?;
        Ok(())
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            candidates_path: default_candidates_path(),
            output_dir: None,
            output_format: OutputFormat::default(),
        }
    }
}

fn default_candidates_path() -> PathBuf {
    PathBuf::from("rooms.json")
}
