// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! PokéAPI client.
//!
//! Name search has no upstream endpoint, so it walks the full listing
//! sequentially with a fixed delay between calls and gives up at the first
//! 429, returning whatever matched so far.

use crate::error::AppError;
use crate::models::PaginatedResponse;
use crate::services::upstream::{self, UpstreamError};
use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::time::Duration;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const SEARCH_PAGE_SIZE: u32 = 50;
const SEARCH_MAX_PAGES: u32 = 20;
const SEARCH_DELAY: Duration = Duration::from_millis(200);
const DETAIL_MOVES: usize = 10;

const LIST_ERROR: &str = "Failed to fetch Pokemon list";
const DETAIL_ERROR: &str = "Failed to fetch Pokemon details";

/// PokéAPI client.
#[derive(Clone)]
pub struct PokemonService {
    http: reqwest::Client,
    base_url: String,
    search_delay: Duration,
}

/// Pokémon card shown in listings.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PokemonSummary {
    pub id: u32,
    pub name: String,
    pub image: Option<String>,
    pub types: Vec<String>,
    pub height: u32,
    pub weight: u32,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PokemonStat {
    pub name: String,
    pub value: u32,
}

/// Full Pokémon details.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PokemonDetails {
    pub id: u32,
    pub name: String,
    pub image: Option<String>,
    pub types: Vec<String>,
    pub height: u32,
    pub weight: u32,
    pub abilities: Vec<String>,
    pub stats: Vec<PokemonStat>,
    pub moves: Vec<String>,
}

// ─── Upstream payloads ───────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ResourceList {
    count: u64,
    #[serde(default)]
    results: Vec<NamedResource>,
}

#[derive(Debug, Deserialize)]
struct NamedResource {
    name: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct Sprites {
    front_default: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TypeSlot {
    #[serde(rename = "type")]
    kind: NamedResource,
}

#[derive(Debug, Deserialize)]
struct AbilitySlot {
    ability: NamedResource,
}

#[derive(Debug, Deserialize)]
struct StatSlot {
    base_stat: u32,
    stat: NamedResource,
}

#[derive(Debug, Deserialize)]
struct MoveSlot {
    #[serde(rename = "move")]
    kind: NamedResource,
}

#[derive(Debug, Deserialize)]
struct PokemonPayload {
    id: u32,
    name: String,
    sprites: Sprites,
    #[serde(default)]
    types: Vec<TypeSlot>,
    height: u32,
    weight: u32,
    #[serde(default)]
    abilities: Vec<AbilitySlot>,
    #[serde(default)]
    stats: Vec<StatSlot>,
    #[serde(default)]
    moves: Vec<MoveSlot>,
}

impl PokemonPayload {
    fn type_names(&self) -> Vec<String> {
        self.types.iter().map(|t| t.kind.name.clone()).collect()
    }

    fn into_summary(self, url: &str) -> PokemonSummary {
        PokemonSummary {
            types: self.type_names(),
            id: self.id,
            name: self.name,
            image: self.sprites.front_default,
            height: self.height,
            weight: self.weight,
            url: url.to_string(),
        }
    }

    fn into_details(self) -> PokemonDetails {
        PokemonDetails {
            types: self.type_names(),
            id: self.id,
            name: self.name,
            image: self.sprites.front_default,
            height: self.height,
            weight: self.weight,
            abilities: self.abilities.into_iter().map(|a| a.ability.name).collect(),
            stats: self
                .stats
                .into_iter()
                .map(|s| PokemonStat {
                    name: s.stat.name,
                    value: s.base_stat,
                })
                .collect(),
            moves: self
                .moves
                .into_iter()
                .take(DETAIL_MOVES)
                .map(|m| m.kind.name)
                .collect(),
        }
    }
}

impl PokemonService {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: upstream::http_client(),
            base_url: upstream::normalize_base_url(base_url),
            search_delay: SEARCH_DELAY,
        }
    }

    /// Override the pause between sequential search calls.
    pub fn with_search_delay(mut self, delay: Duration) -> Self {
        self.search_delay = delay;
        self
    }

    /// List Pokémon, optionally filtered by a case-insensitive name substring.
    pub async fn list(
        &self,
        page: u32,
        limit: u32,
        search: Option<&str>,
    ) -> Result<PaginatedResponse<PokemonSummary>, AppError> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        tracing::info!(operation = "pokemon_list", page, limit, search, "Fetching Pokemon list");

        let result = match search {
            Some(term) => self
                .search(&term.to_lowercase())
                .await
                .map(|found| PaginatedResponse::from_slice(&found, page, limit)),
            None => self.list_page(page, limit).await,
        };

        result.map_err(|e| {
            tracing::error!(error = %e, operation = "pokemon_list", "Error fetching Pokemon list");
            e.into_app_error(LIST_ERROR)
        })
    }

    /// Pokémon details by numeric ID.
    pub async fn get(&self, id: u32) -> Result<PokemonDetails, AppError> {
        tracing::info!(operation = "pokemon_get", id, "Fetching Pokemon details");

        let url = format!("{}/pokemon/{}", self.base_url, id);
        match upstream::fetch_json::<PokemonPayload>(self.http.get(&url)).await {
            Ok(payload) => Ok(payload.into_details()),
            Err(UpstreamError::NotFound) => Err(AppError::NotFound("Pokemon not found".to_string())),
            Err(e) => {
                tracing::error!(error = %e, id, "Error fetching Pokemon details");
                Err(e.into_app_error(DETAIL_ERROR))
            }
        }
    }

    async fn fetch_list(&self, offset: u32, limit: u32) -> Result<ResourceList, UpstreamError> {
        let url = format!("{}/pokemon", self.base_url);
        upstream::fetch_json(
            self.http
                .get(&url)
                .query(&[("offset", offset), ("limit", limit)]),
        )
        .await
    }

    async fn fetch_summary(&self, url: &str) -> Result<PokemonSummary, UpstreamError> {
        let payload: PokemonPayload = upstream::fetch_json(self.http.get(url)).await?;
        Ok(payload.into_summary(url))
    }

    /// One upstream page with details fetched concurrently.
    async fn list_page(
        &self,
        page: u32,
        limit: u32,
    ) -> Result<PaginatedResponse<PokemonSummary>, UpstreamError> {
        let offset = page.saturating_sub(1).saturating_mul(limit);
        let list = self.fetch_list(offset, limit).await?;

        let details =
            try_join_all(list.results.iter().map(|p| self.fetch_summary(&p.url))).await?;

        Ok(PaginatedResponse::new(details, page, limit, list.count))
    }

    /// Sequential scan of the listing for names containing `term`.
    async fn search(&self, term: &str) -> Result<Vec<PokemonSummary>, UpstreamError> {
        let mut found = Vec::new();

        'pages: for page_index in 0..SEARCH_MAX_PAGES {
            let list = match self
                .fetch_list(page_index * SEARCH_PAGE_SIZE, SEARCH_PAGE_SIZE)
                .await
            {
                Ok(list) => list,
                Err(UpstreamError::RateLimited) => {
                    tracing::warn!(page_index, found = found.len(), "Rate limit hit during Pokemon search");
                    break;
                }
                Err(e) => return Err(e),
            };

            for entry in list
                .results
                .iter()
                .filter(|p| p.name.to_lowercase().contains(term))
            {
                tokio::time::sleep(self.search_delay).await;
                match self.fetch_summary(&entry.url).await {
                    Ok(summary) => found.push(summary),
                    Err(UpstreamError::RateLimited) => {
                        tracing::warn!(
                            page_index,
                            found = found.len(),
                            "Rate limit hit during Pokemon search"
                        );
                        break 'pages;
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, name = %entry.name, "Skipping Pokemon detail");
                    }
                }
            }

            if list.results.len() < SEARCH_PAGE_SIZE as usize {
                break;
            }
            tokio::time::sleep(self.search_delay).await;
        }

        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_projection() {
        let payload: PokemonPayload = serde_json::from_value(serde_json::json!({
            "id": 25,
            "name": "pikachu",
            "sprites": { "front_default": "https://img/25.png" },
            "types": [{ "slot": 1, "type": { "name": "electric", "url": "u" } }],
            "height": 4,
            "weight": 60,
            "abilities": [{ "ability": { "name": "static", "url": "u" } }],
            "stats": [{ "base_stat": 35, "stat": { "name": "hp", "url": "u" } }],
            "moves": (0..15).map(|i| serde_json::json!({
                "move": { "name": format!("move-{}", i), "url": "u" }
            })).collect::<Vec<_>>()
        }))
        .unwrap();

        let details = payload.into_details();

        assert_eq!(details.types, vec!["electric"]);
        assert_eq!(details.abilities, vec!["static"]);
        assert_eq!(details.stats[0].name, "hp");
        assert_eq!(details.stats[0].value, 35);
        assert_eq!(details.moves.len(), DETAIL_MOVES);
        assert_eq!(details.moves[0], "move-0");
    }
}
