// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weather Dashboard API Server
//!
//! Stores weather logs pushed by the collector, serves paginated listings,
//! exports and insights to the dashboard, and proxies the extras APIs.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use weather_dashboard::{
    config::Config,
    db::FirestoreDb,
    error,
    services::{GamesService, PokemonService, StarWarsService, WeatherService},
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };
    tracing::info!(
        port = config.port,
        environment = ?config.environment,
        "Starting Weather Dashboard API"
    );

    error::expose_internal_errors(!config.environment.is_production());

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id).await?;

    if config.rawg_api_key.is_none() {
        tracing::warn!("RAWG_API_KEY not configured; games endpoints will return 503");
    }

    let weather_service = WeatherService::new(db.clone());
    let pokemon_service = PokemonService::new(&config.pokeapi_base_url);
    let starwars_service = StarWarsService::new(&config.swapi_base_url);
    let games_service = GamesService::new(&config.rawg_base_url, config.rawg_api_key.clone());

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        weather_service,
        pokemon_service,
        starwars_service,
        games_service,
    });

    // Build router
    let app = weather_dashboard::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("weather_dashboard=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
