mod api;
mod config;
mod error;
mod geo;
mod models;
mod search;
mod store;

use anyhow::Context;
use api::AppState;
use clap::Parser;
use config::Config;
use geo::{DistanceEstimator, NominatimGeocoder};
use std::sync::Arc;
use store::Store;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::parse();

    let store = match &config.data_file {
        Some(path) => Store::open(path).await?,
        None => Store::in_memory(),
    };
    if let Some(seed) = &config.seed_file {
        store.seed_if_empty(seed).await?;
    }

    let snapshot = store.snapshot().await;
    tracing::info!(
        "Loaded {} buses, {} stops, {} favorites, {} feedback entries",
        snapshot.buses.len(),
        snapshot.stops.len(),
        snapshot.favorites.len(),
        snapshot.feedback.len()
    );

    let geocoder = NominatimGeocoder::new(
        config.geocoder_url.as_str(),
        config.geocoder_region.as_str(),
        &config.geocoder_user_agent,
        config.geocoder_timeout(),
    )
    .context("failed to build geocoding client")?;

    let state = AppState {
        store: Arc::new(store),
        estimator: DistanceEstimator::new(Arc::new(geocoder)),
    };
    let cors = api::server::cors_layer(config.cors_origins())?;

    api::server::run_server(state, cors, config.port).await
}
