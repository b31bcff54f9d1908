//! File-based Candidate Source Adapter
//!
//! Reads a snapshot of candidate rooms from a JSON or YAML file. The file
//! holds either a list of room records or an object with a `rooms` list;
//! records may use any of the shapes accepted by `RoomData::from_value`.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::domain::ahp::RoomData;
use crate::ports::{CandidateSource, CandidateSourceError};

/// Serialization format of a candidate file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateFormat {
    Json,
    Yaml,
}

impl CandidateFormat {
    /// Infer the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, CandidateSourceError> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Ok(CandidateFormat::Json),
            Some("yaml") | Some("yml") => Ok(CandidateFormat::Yaml),
            _ => Err(CandidateSourceError::UnsupportedFormat(
                path.display().to_string(),
            )),
        }
    }

    /// Parse file contents into room records
    pub fn parse(&self, contents: &str) -> Result<Vec<RoomData>, CandidateSourceError> {
        let document: Value = match self {
            CandidateFormat::Json => serde_json::from_str(contents)
                .map_err(|e| CandidateSourceError::ParseFailed(e.to_string()))?,
            CandidateFormat::Yaml => serde_yaml::from_str(contents)
                .map_err(|e| CandidateSourceError::ParseFailed(e.to_string()))?,
        };

        let records = match &document {
            Value::Array(records) => records,
            Value::Object(map) => map
                .get("rooms")
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    CandidateSourceError::ParseFailed("expected a 'rooms' list".to_string())
                })?,
            Value::Null => return Ok(Vec::new()),
            _ => {
                return Err(CandidateSourceError::ParseFailed(
                    "expected a list of rooms".to_string(),
                ))
            }
        };

        records
            .iter()
            .map(|record| RoomData::from_value(record).map_err(CandidateSourceError::from))
            .collect()
    }
}

/// File-based candidate source
#[derive(Debug, Clone)]
pub struct FileCandidateSource {
    path: PathBuf,
}

impl FileCandidateSource {
    /// Create a source reading from `path`
    ///
    /// # Example
    /// ```ignore
    /// let source = FileCandidateSource::new("./data/rooms.json");
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CandidateSource for FileCandidateSource {
    async fn fetch_candidates(&self) -> Result<Vec<RoomData>, CandidateSourceError> {
        let format = CandidateFormat::from_path(&self.path)?;

        if !self.path.exists() {
            return Err(CandidateSourceError::NotFound(
                self.path.display().to_string(),
            ));
        }

        let contents = fs::read_to_string(&self.path)
            .await
            .map_err(|e| CandidateSourceError::IoError(e.to_string()))?;

        let rooms = format.parse(&contents)?;
        debug!(
            path = %self.path.display(),
            rooms = rooms.len(),
            "Loaded candidate rooms"
        );
        Ok(rooms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).await.unwrap();
        path
    }

    #[tokio::test]
    async fn reads_json_list() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "rooms.json",
            r#"[{"id": "r1", "name": "Lab", "temperature": 21.5,
                 "facilities": {"seating_capacity": 30, "videoprojector": true}}]"#,
        )
        .await;

        let rooms = FileCandidateSource::new(&path).fetch_candidates().await.unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].room_name, "Lab");
        assert_eq!(rooms[0].seating_capacity, 30);
        assert!(rooms[0].has_projector);
    }

    #[tokio::test]
    async fn reads_yaml_rooms_key() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "rooms.yml",
            "rooms:\n  - room_id: B-204\n    co2: 720\n    computers: 12\n  - name: Aula\n    is_available: false\n",
        )
        .await;

        let rooms = FileCandidateSource::new(&path).fetch_candidates().await.unwrap();
        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[0].room_id, "B-204");
        assert_eq!(rooms[0].co2, Some(720.0));
        assert_eq!(rooms[0].computers, 12);
        assert!(!rooms[1].is_available);
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let source = FileCandidateSource::new(dir.path().join("absent.json"));
        assert!(matches!(
            source.fetch_candidates().await,
            Err(CandidateSourceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn unknown_extension_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "rooms.csv", "id,name\n").await;
        assert!(matches!(
            FileCandidateSource::new(&path).fetch_candidates().await,
            Err(CandidateSourceError::UnsupportedFormat(_))
        ));
    }

    #[tokio::test]
    async fn record_without_identifier_is_invalid() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "rooms.json", r#"[{"temperature": 20}]"#).await;
        assert!(matches!(
            FileCandidateSource::new(&path).fetch_candidates().await,
            Err(CandidateSourceError::InvalidRecord(_))
        ));
    }

    #[test]
    fn malformed_json_fails_to_parse() {
        assert!(matches!(
            CandidateFormat::Json.parse("[{"),
            Err(CandidateSourceError::ParseFailed(_))
        ));
    }
}
