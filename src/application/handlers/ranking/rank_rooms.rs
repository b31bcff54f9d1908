//! RankRoomsHandler - Command handler for one ranking request.
//!
//! Pulls a candidate snapshot, runs it through a fresh engine and hands the
//! result to the publisher:
//!
//! 1. Fetch candidates and apply the hard facility filter
//! 2. Apply importance ratings, then explicit pairwise overrides
//! 3. Score, aggregate and rank; blend in calendar availability
//! 4. Publish

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::ahp::{
    blend_availability, AggregationMethod, AhpEngine, AhpResult, EngineSettings, FacilityFilter,
    ImportanceWeights, PreferenceRequest, UserRequirements,
};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{CandidateSource, RankingPublisher};

/// Command to rank the current candidate rooms.
#[derive(Debug, Clone, Default)]
pub struct RankRoomsCommand {
    /// Explicit pairwise overrides, applied after `importance`.
    pub preferences: Option<PreferenceRequest>,
    /// Coarse 1-9 ratings translated into overrides.
    pub importance: Option<ImportanceWeights>,
    /// Scoring requirements; derived from `filter` when absent.
    pub requirements: Option<UserRequirements>,
    pub filter: FacilityFilter,
    pub method: AggregationMethod,
}

/// Handler for ranking requests.
pub struct RankRoomsHandler {
    source: Arc<dyn CandidateSource>,
    publisher: Arc<dyn RankingPublisher>,
    settings: EngineSettings,
}

impl RankRoomsHandler {
    pub fn new(
        source: Arc<dyn CandidateSource>,
        publisher: Arc<dyn RankingPublisher>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            source,
            publisher,
            settings,
        }
    }

    pub async fn handle(&self, cmd: RankRoomsCommand) -> Result<AhpResult, DomainError> {
        let candidates = self.source.fetch_candidates().await?;
        let fetched = candidates.len();
        let rooms = cmd.filter.apply(candidates);

        debug!(
            fetched = fetched,
            eligible = rooms.len(),
            "Filtered candidate rooms"
        );

        if rooms.is_empty() {
            return Err(DomainError::new(
                ErrorCode::NoData,
                "No candidate rooms satisfy the facility filter",
            )
            .with_detail("fetched", fetched.to_string()));
        }

        let mut engine = AhpEngine::with_settings(self.settings)?;

        if let Some(importance) = &cmd.importance {
            engine.configure(&importance.to_request()?)?;
        }
        if let Some(preferences) = &cmd.preferences {
            engine.configure(preferences)?;
        }

        let requirements = cmd
            .requirements
            .clone()
            .unwrap_or_else(|| cmd.filter.to_requirements());
        engine.set_requirements(requirements);
        engine.load_room_data(rooms);

        let mut result = engine.evaluate_rooms(cmd.method)?;

        let share = cmd
            .importance
            .map(|importance| importance.availability_share())
            .unwrap_or(0.0);
        if share > 0.0 {
            result.rankings = blend_availability(result.rankings, engine.rooms(), share);
        }

        self.publisher.publish(&result).await?;

        info!(
            evaluation_id = %result.evaluation_id,
            rooms = result.rankings.len(),
            version = engine.version(),
            is_consistent = result.is_consistent,
            "Ranked rooms"
        );

        Ok(result)
    }
}
