// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! RAWG games catalog client.

use crate::error::AppError;
use crate::models::PaginatedResponse;
use crate::services::upstream::{self, UpstreamError};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const LIST_ERROR: &str = "Failed to fetch games";
const DETAIL_ERROR: &str = "Failed to fetch game details";
const MISSING_KEY: &str = "RAWG API key not configured";

/// Platform filter names and their RAWG IDs.
pub const PLATFORMS: [(&str, u32); 4] = [("PS5", 187), ("Xbox", 186), ("Switch", 7), ("PC", 4)];

/// RAWG ID for a platform name (case-insensitive); unknown names yield `None`.
pub fn platform_id(name: &str) -> Option<u32> {
    PLATFORMS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name.trim()))
        .map(|(_, id)| *id)
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Platform {
    pub id: u32,
    pub name: String,
}

/// Game card shown in listings.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub id: u64,
    pub name: String,
    pub image: Option<String>,
    pub platforms: Vec<String>,
    pub genres: Vec<String>,
    pub rating: Option<f64>,
    pub rating_top: Option<u32>,
    pub ratings_count: Option<u64>,
    pub released: Option<String>,
    pub developers: Vec<String>,
    pub screenshots: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct GamePlatformRelease {
    pub name: String,
    pub released_at: Option<String>,
}

/// Full game details including screenshots.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct GameDetails {
    pub id: u64,
    pub name: String,
    pub image: Option<String>,
    pub description: String,
    pub platforms: Vec<GamePlatformRelease>,
    pub genres: Vec<String>,
    pub rating: Option<f64>,
    pub rating_top: Option<u32>,
    pub ratings_count: Option<u64>,
    pub released: Option<String>,
    pub developers: Vec<String>,
    pub publishers: Vec<String>,
    pub screenshots: Vec<String>,
    pub metacritic: Option<u32>,
    pub website: Option<String>,
    pub esrb_rating: Option<String>,
}

// ─── Upstream payloads ───────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PlatformEntry {
    platform: Named,
    #[serde(default)]
    released_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GamePayload {
    id: u64,
    name: String,
    background_image: Option<String>,
    #[serde(default)]
    description_raw: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    platforms: Option<Vec<PlatformEntry>>,
    #[serde(default)]
    genres: Option<Vec<Named>>,
    rating: Option<f64>,
    rating_top: Option<u32>,
    ratings_count: Option<u64>,
    released: Option<String>,
    #[serde(default)]
    developers: Option<Vec<Named>>,
    #[serde(default)]
    publishers: Option<Vec<Named>>,
    #[serde(default)]
    metacritic: Option<u32>,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    esrb_rating: Option<Named>,
}

fn names(list: Option<Vec<Named>>) -> Vec<String> {
    list.unwrap_or_default().into_iter().map(|n| n.name).collect()
}

impl GamePayload {
    fn into_summary(self) -> GameSummary {
        GameSummary {
            id: self.id,
            name: self.name,
            image: self.background_image,
            platforms: self
                .platforms
                .unwrap_or_default()
                .into_iter()
                .map(|p| p.platform.name)
                .collect(),
            genres: names(self.genres),
            rating: self.rating,
            rating_top: self.rating_top,
            ratings_count: self.ratings_count,
            released: self.released,
            developers: names(self.developers),
            screenshots: Vec::new(),
        }
    }

    fn into_details(self, screenshots: Vec<String>) -> GameDetails {
        GameDetails {
            id: self.id,
            name: self.name,
            image: self.background_image,
            description: self
                .description_raw
                .filter(|d| !d.is_empty())
                .or(self.description)
                .unwrap_or_default(),
            platforms: self
                .platforms
                .unwrap_or_default()
                .into_iter()
                .map(|p| GamePlatformRelease {
                    name: p.platform.name,
                    released_at: p.released_at,
                })
                .collect(),
            genres: names(self.genres),
            rating: self.rating,
            rating_top: self.rating_top,
            ratings_count: self.ratings_count,
            released: self.released,
            developers: names(self.developers),
            publishers: names(self.publishers),
            screenshots,
            metacritic: self.metacritic,
            website: self.website.filter(|w| !w.is_empty()),
            esrb_rating: self.esrb_rating.map(|r| r.name),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GameList {
    #[serde(default)]
    count: u64,
    #[serde(default)]
    results: Vec<GamePayload>,
}

#[derive(Debug, Deserialize)]
struct Screenshot {
    image: String,
}

#[derive(Debug, Deserialize)]
struct ScreenshotList {
    #[serde(default)]
    results: Vec<Screenshot>,
}

/// RAWG client. Every call needs the API key.
#[derive(Clone)]
pub struct GamesService {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GamesService {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self {
            http: upstream::http_client(),
            base_url: upstream::normalize_base_url(base_url),
            api_key,
        }
    }

    fn api_key(&self) -> Result<&str, AppError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| AppError::ServiceUnavailable(MISSING_KEY.to_string()))
    }

    /// List games, newest additions first.
    pub async fn list(
        &self,
        page: u32,
        page_size: u32,
        platform: Option<&str>,
        search: Option<&str>,
    ) -> Result<PaginatedResponse<GameSummary>, AppError> {
        let key = self.api_key()?;
        let platform_id = platform.and_then(platform_id);
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        tracing::info!(
            operation = "games_list",
            page,
            page_size,
            platform_id,
            search,
            "Fetching games list"
        );

        let mut query = vec![
            ("key", key.to_string()),
            ("page", page.to_string()),
            ("page_size", page_size.to_string()),
            ("ordering", "-added".to_string()),
        ];
        if let Some(id) = platform_id {
            query.push(("platforms", id.to_string()));
        }
        if let Some(term) = search {
            query.push(("search", term.to_string()));
        }

        let url = format!("{}/games", self.base_url);
        let list: GameList = upstream::fetch_json(self.http.get(&url).query(&query))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, operation = "games_list", "Error fetching games list");
                e.into_app_error(LIST_ERROR)
            })?;

        let data = list.results.into_iter().map(GamePayload::into_summary).collect();
        Ok(PaginatedResponse::new(data, page, page_size, list.count))
    }

    /// Game details; screenshot failures yield an empty list.
    pub async fn get(&self, id: u64) -> Result<GameDetails, AppError> {
        let key = self.api_key()?;
        tracing::info!(operation = "games_get", id, "Fetching game details");

        let url = format!("{}/games/{}", self.base_url, id);
        let request = self.http.get(&url).query(&[("key", key)]);
        let game: GamePayload = match upstream::fetch_json(request).await {
            Ok(game) => game,
            Err(UpstreamError::NotFound) => {
                return Err(AppError::NotFound("Game not found".to_string()))
            }
            Err(e) => {
                tracing::error!(error = %e, id, "Error fetching game details");
                return Err(e.into_app_error(DETAIL_ERROR));
            }
        };

        let screenshots_url = format!("{}/games/{}/screenshots", self.base_url, id);
        let request = self.http.get(&screenshots_url).query(&[("key", key)]);
        let screenshots = match upstream::fetch_json::<ScreenshotList>(request).await {
            Ok(list) => list.results.into_iter().map(|s| s.image).collect(),
            Err(e) => {
                tracing::warn!(error = %e, id, "Failed to fetch screenshots");
                Vec::new()
            }
        };

        Ok(game.into_details(screenshots))
    }

    /// The supported platform filters.
    pub fn platforms(&self) -> Vec<Platform> {
        PLATFORMS
            .iter()
            .map(|(name, id)| Platform {
                id: *id,
                name: name.to_string(),
            })
            .collect()
    }
}
