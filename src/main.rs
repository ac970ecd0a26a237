use std::sync::Arc;
use std::time::Duration;
use anyhow::Context;
use clap::Parser;
use dotenv::dotenv;
use tracing::info;
use crate::config::Config;
use crate::controller::AppState;
use crate::repositories::google_places_repo::GooglePlacesRepo;
use crate::services::results_controller::ResultsController;
use crate::services::search_orchestrator::SearchOrchestrator;

pub mod config;
pub mod controller;
pub mod error;
pub mod helpers;
pub mod models;
pub mod repositories;
pub mod services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::parse();

    let provider = Arc::new(GooglePlacesRepo::new(&config)?);
    let orchestrator = SearchOrchestrator::initialize(
        provider,
        Duration::from_secs(config.provider_ready_timeout_secs),
    )
    .await
    .context("Places provider did not become available, reload once it is reachable")?;

    info!("Search radius set to {}m", config.search_radius_meters);
    let app_state = AppState {
        results_controller: Arc::new(ResultsController::new(
            Arc::new(orchestrator),
            config.search_radius_meters,
        )),
    };

    controller::serve(app_state, &config).await
}
