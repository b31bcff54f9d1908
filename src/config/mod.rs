//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `ROOM_RANKER` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use room_ranker::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Ranking rooms from {}", config.source.candidates_path.display());
//! ```

mod engine;
mod error;
mod logging;
mod source;

pub use engine::EngineConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use source::SourceConfig;

use serde::Deserialize;

use crate::domain::ahp::{EngineSettings, ScoringPolicy};

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a usable
/// configuration. Load using [`AppConfig::load()`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Weight derivation, aggregation and consistency settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Facility scoring bands and fallbacks
    #[serde(default)]
    pub scoring: ScoringPolicy,

    /// Candidate input and ranking output
    #[serde(default)]
    pub source: SourceConfig,

    /// Log filter and format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `ROOM_RANKER` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `ROOM_RANKER__ENGINE__WEIGHT_METHOD=geometric_mean` -> `engine.weight_method`
    /// - `ROOM_RANKER__SOURCE__CANDIDATES_PATH=rooms.yaml` -> `source.candidates_path`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ROOM_RANKER")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.engine.validate()?;
        self.scoring
            .validate()
            .map_err(|e| ValidationError::InvalidScoringPolicy(e.to_string()))?;
        self.source.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Engine settings assembled from the engine and scoring sections
    pub fn engine_settings(&self) -> EngineSettings {
        self.engine.to_settings(self.scoring)
    }
}
