// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weather Dashboard: weather-log ingestion, analytics and extras API
//!
//! This crate provides the backend API for the weather dashboard: user
//! accounts, weather-log ingestion and reporting, and thin proxies to a few
//! public APIs used by the "extra content" pages.

pub mod config;
pub mod db;
pub mod error;
pub mod log_sanitizer;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{GamesService, PokemonService, StarWarsService, WeatherService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub weather_service: WeatherService,
    pub pokemon_service: PokemonService,
    pub starwars_service: StarWarsService,
    pub games_service: GamesService,
}
