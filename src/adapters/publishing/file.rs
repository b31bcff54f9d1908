//! File-based Ranking Publisher
//!
//! Writes every evaluation result to `{output_dir}/{evaluation_id}.{ext}`.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::domain::ahp::AhpResult;
use crate::ports::{RankingPublisher, RankingPublisherError};

/// Document format for published results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }

    fn render(&self, result: &AhpResult) -> Result<String, RankingPublisherError> {
        match self {
            OutputFormat::Json => serde_json::to_string_pretty(result)
                .map_err(|e| RankingPublisherError::SerializationFailed(e.to_string())),
            OutputFormat::Yaml => serde_yaml::to_string(result)
                .map_err(|e| RankingPublisherError::SerializationFailed(e.to_string())),
        }
    }
}

/// File-based ranking publisher
#[derive(Debug, Clone)]
pub struct FileRankingPublisher {
    output_dir: PathBuf,
    format: OutputFormat,
}

impl FileRankingPublisher {
    pub fn new<P: AsRef<Path>>(output_dir: P, format: OutputFormat) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            format,
        }
    }

    /// Path the given result is written to
    pub fn path_for(&self, result: &AhpResult) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", result.evaluation_id, self.format.extension()))
    }
}

#[async_trait]
impl RankingPublisher for FileRankingPublisher {
    async fn publish(&self, result: &AhpResult) -> Result<(), RankingPublisherError> {
        let contents = self.format.render(result)?;

        fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| RankingPublisherError::PublishFailed(e.to_string()))?;

        let path = self.path_for(result);
        fs::write(&path, contents)
            .await
            .map_err(|e| RankingPublisherError::PublishFailed(e.to_string()))?;

        info!(
            evaluation_id = %result.evaluation_id,
            path = %path.display(),
            rooms = result.rankings.len(),
            "Published ranking"
        );
        Ok(())
    }
}
