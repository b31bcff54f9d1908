//! Room Ranker binary.
//!
//! Ranks the rooms in a candidate file with the configured engine settings
//! and prints the report. The candidate path comes from the first argument
//! or `ROOM_RANKER__SOURCE__CANDIDATES_PATH`.

use std::path::PathBuf;
use std::sync::Arc;

use room_ranker::adapters::{FileCandidateSource, FileRankingPublisher, InMemoryRankingPublisher};
use room_ranker::application::{RankRoomsCommand, RankRoomsHandler};
use room_ranker::config::{AppConfig, LoggingConfig};
use room_ranker::domain::ahp::AhpEngine;
use room_ranker::ports::RankingPublisher;
use tracing_subscriber::{fmt, prelude::*};

fn init_tracing(logging: &LoggingConfig) {
    let filter = logging.env_filter();
    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load()?;
    if let Some(path) = std::env::args().nth(1) {
        config.source.candidates_path = PathBuf::from(path);
    }
    config.validate()?;

    init_tracing(&config.logging);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        candidates = %config.source.candidates_path.display(),
        "Room ranker starting"
    );

    let settings = config.engine_settings();
    let source = Arc::new(FileCandidateSource::new(&config.source.candidates_path));
    let publisher: Arc<dyn RankingPublisher> = match &config.source.output_dir {
        Some(dir) => Arc::new(FileRankingPublisher::new(dir, config.source.output_format)),
        None => Arc::new(InMemoryRankingPublisher::new()),
    };

    let handler = RankRoomsHandler::new(source, publisher, settings);
    let result = handler
        .handle(RankRoomsCommand {
            method: config.engine.aggregation_method,
            ..RankRoomsCommand::default()
        })
        .await?;

    let engine = AhpEngine::with_settings(settings)?;
    println!("{}", engine.weights_summary());
    println!("{}", result.report(true));

    Ok(())
}
