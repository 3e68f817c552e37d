// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Proxies for the "extra content" pages: PokéAPI, SWAPI and RAWG.

use crate::error::{AppError, Result};
use crate::models::pagination::validate_page_params;
use crate::models::PaginatedResponse;
use crate::routes::extract::ApiQuery;
use crate::services::games::{GameDetails, GameSummary, Platform};
use crate::services::pokemon::{PokemonDetails, PokemonSummary};
use crate::services::starwars::{Person, Planet, Starship};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

const DEFAULT_POKEMON_LIMIT: u32 = 20;
const DEFAULT_STARWARS_LIMIT: u32 = 10;
const DEFAULT_GAMES_LIMIT: u32 = 20;

/// Extras routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/pokemon", get(list_pokemon))
        .route("/pokemon/{id}", get(get_pokemon))
        .route("/starwars/people", get(list_people))
        .route("/starwars/planets", get(list_planets))
        .route("/starwars/starships", get(list_starships))
        .route("/games", get(list_games))
        .route("/games/platforms", get(list_platforms))
        .route("/games/{id}", get(get_game))
}

#[derive(Debug, Default, Deserialize)]
struct SearchQuery {
    page: Option<u32>,
    limit: Option<u32>,
    search: Option<String>,
}

impl SearchQuery {
    fn page_params(&self, default_limit: u32) -> Result<(u32, u32)> {
        let page = self.page.unwrap_or(1);
        let limit = self.limit.unwrap_or(default_limit);
        validate_page_params(page, limit)?;
        Ok((page, limit))
    }
}

// No `#[serde(flatten)]` here: flattened numeric fields fail to parse from query strings.
#[derive(Debug, Default, Deserialize)]
struct GamesQuery {
    page: Option<u32>,
    limit: Option<u32>,
    search: Option<String>,
    platform: Option<String>,
}

fn parse_id<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid {} id: {}", what, raw)))
}

async fn list_pokemon(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<SearchQuery>,
) -> Result<Json<PaginatedResponse<PokemonSummary>>> {
    let (page, limit) = params.page_params(DEFAULT_POKEMON_LIMIT)?;
    let response = state
        .pokemon_service
        .list(page, limit, params.search.as_deref())
        .await?;
    Ok(Json(response))
}

async fn get_pokemon(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PokemonDetails>> {
    let id = parse_id(&id, "Pokemon")?;
    Ok(Json(state.pokemon_service.get(id).await?))
}

async fn list_people(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<SearchQuery>,
) -> Result<Json<PaginatedResponse<Person>>> {
    let (page, limit) = params.page_params(DEFAULT_STARWARS_LIMIT)?;
    let response = state
        .starwars_service
        .people(page, limit, params.search.as_deref())
        .await?;
    Ok(Json(response))
}

async fn list_planets(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<SearchQuery>,
) -> Result<Json<PaginatedResponse<Planet>>> {
    let (page, limit) = params.page_params(DEFAULT_STARWARS_LIMIT)?;
    let response = state
        .starwars_service
        .planets(page, limit, params.search.as_deref())
        .await?;
    Ok(Json(response))
}

async fn list_starships(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<SearchQuery>,
) -> Result<Json<PaginatedResponse<Starship>>> {
    let (page, limit) = params.page_params(DEFAULT_STARWARS_LIMIT)?;
    let response = state
        .starwars_service
        .starships(page, limit, params.search.as_deref())
        .await?;
    Ok(Json(response))
}

/// Games list. `limit` maps to RAWG's `page_size`.
async fn list_games(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<GamesQuery>,
) -> Result<Json<PaginatedResponse<GameSummary>>> {
    let page = params.page.unwrap_or(1);
    let page_size = params.limit.unwrap_or(DEFAULT_GAMES_LIMIT);
    validate_page_params(page, page_size)?;
    let response = state
        .games_service
        .list(
            page,
            page_size,
            params.platform.as_deref(),
            params.search.as_deref(),
        )
        .await?;
    Ok(Json(response))
}

async fn list_platforms(State(state): State<Arc<AppState>>) -> Json<Vec<Platform>> {
    Json(state.games_service.platforms())
}

async fn get_game(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<GameDetails>> {
    let id = parse_id(&id, "game")?;
    Ok(Json(state.games_service.get(id).await?))
}
