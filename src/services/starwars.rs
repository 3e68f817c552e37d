// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SWAPI client.
//!
//! SWAPI serves fixed pages of ten, so an arbitrary `page`/`limit` request
//! is answered by fetching the covering window of upstream pages and
//! slicing the concatenation.

use crate::error::AppError;
use crate::models::pagination::{page_offset, PaginatedResponse};
use crate::services::upstream::{self, UpstreamError};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// SWAPI's fixed page size.
pub const SWAPI_PAGE_SIZE: usize = 10;

/// Upstream pages covering items `[offset, offset + limit)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// First upstream page (1-indexed)
    pub first_page: u64,
    /// Last upstream page (inclusive)
    pub last_page: u64,
    /// Index of the first wanted item within `first_page`
    pub start_index: usize,
}

/// Compute the upstream page window for an offset and limit (`limit >= 1`).
///
/// Returns `None` when the window cannot be addressed; no upstream page
/// that far out exists.
pub fn page_window(offset: usize, limit: usize) -> Option<PageWindow> {
    let offset = u64::try_from(offset).ok()?;
    let last_item = offset.checked_add(u64::try_from(limit.max(1)).ok()? - 1)?;
    let page_size = SWAPI_PAGE_SIZE as u64;
    Some(PageWindow {
        first_page: (offset / page_size).checked_add(1)?,
        last_page: (last_item / page_size).checked_add(1)?,
        start_index: (offset % page_size) as usize,
    })
}

/// Star Wars resource collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    People,
    Planets,
    Starships,
}

impl Resource {
    fn path(self) -> &'static str {
        match self {
            Resource::People => "people",
            Resource::Planets => "planets",
            Resource::Starships => "starships",
        }
    }

    fn error_message(self) -> &'static str {
        match self {
            Resource::People => "Failed to fetch Star Wars people",
            Resource::Planets => "Failed to fetch Star Wars planets",
            Resource::Starships => "Failed to fetch Star Wars starships",
        }
    }
}

/// Projection of a SWAPI person.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Person {
    pub name: String,
    pub height: String,
    pub mass: String,
    pub hair_color: String,
    pub skin_color: String,
    pub eye_color: String,
    pub birth_year: String,
    pub gender: String,
    pub url: String,
}

/// Projection of a SWAPI planet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Planet {
    pub name: String,
    pub rotation_period: String,
    pub orbital_period: String,
    pub diameter: String,
    pub climate: String,
    pub gravity: String,
    pub terrain: String,
    pub surface_water: String,
    pub population: String,
    pub url: String,
}

/// Projection of a SWAPI starship.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Starship {
    pub name: String,
    pub model: String,
    pub manufacturer: String,
    pub cost_in_credits: String,
    pub length: String,
    pub max_atmosphering_speed: String,
    pub crew: String,
    pub passengers: String,
    pub cargo_capacity: String,
    pub starship_class: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct SwapiPage<T> {
    #[serde(default)]
    count: u64,
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

/// SWAPI client.
#[derive(Clone)]
pub struct StarWarsService {
    http: reqwest::Client,
    base_url: String,
}

impl StarWarsService {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: upstream::http_client(),
            base_url: upstream::normalize_base_url(base_url),
        }
    }

    pub async fn people(
        &self,
        page: u32,
        limit: u32,
        search: Option<&str>,
    ) -> Result<PaginatedResponse<Person>, AppError> {
        self.list(Resource::People, page, limit, search).await
    }

    pub async fn planets(
        &self,
        page: u32,
        limit: u32,
        search: Option<&str>,
    ) -> Result<PaginatedResponse<Planet>, AppError> {
        self.list(Resource::Planets, page, limit, search).await
    }

    pub async fn starships(
        &self,
        page: u32,
        limit: u32,
        search: Option<&str>,
    ) -> Result<PaginatedResponse<Starship>, AppError> {
        self.list(Resource::Starships, page, limit, search).await
    }

    async fn list<T: DeserializeOwned + Clone>(
        &self,
        resource: Resource,
        page: u32,
        limit: u32,
        search: Option<&str>,
    ) -> Result<PaginatedResponse<T>, AppError> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        tracing::info!(
            operation = "starwars_list",
            resource = resource.path(),
            page,
            limit,
            search,
            "Fetching Star Wars resources"
        );

        let result = match search {
            Some(term) => self.search(resource, term, page, limit).await,
            None => self.window(resource, page, limit).await,
        };

        result.map_err(|e| {
            tracing::error!(error = %e, resource = resource.path(), "Error fetching Star Wars resources");
            e.into_app_error(resource.error_message())
        })
    }

    async fn fetch_page<T: DeserializeOwned>(
        &self,
        resource: Resource,
        query: &[(&str, String)],
    ) -> Result<SwapiPage<T>, UpstreamError> {
        let url = format!("{}/{}/", self.base_url, resource.path());
        upstream::fetch_json(self.http.get(&url).query(query)).await
    }

    /// Single upstream search call, paginated in memory.
    async fn search<T: DeserializeOwned + Clone>(
        &self,
        resource: Resource,
        term: &str,
        page: u32,
        limit: u32,
    ) -> Result<PaginatedResponse<T>, UpstreamError> {
        let found: SwapiPage<T> = self
            .fetch_page(resource, &[("search", term.to_string())])
            .await?;

        let data = crate::models::pagination::paginate_slice(&found.results, page, limit).to_vec();
        Ok(PaginatedResponse::new(data, page, limit, found.count))
    }

    /// Fetch the upstream pages covering the request and slice them.
    async fn window<T: DeserializeOwned>(
        &self,
        resource: Resource,
        page: u32,
        limit: u32,
    ) -> Result<PaginatedResponse<T>, UpstreamError> {
        let offset = page_offset(page, limit);
        let Some(window) = page_window(offset, limit as usize) else {
            let total = self.total(resource).await?;
            return Ok(PaginatedResponse::new(Vec::new(), page, limit, total));
        };

        let mut total = None;
        let mut items = Vec::new();

        for swapi_page in window.first_page..=window.last_page {
            let fetched: SwapiPage<T> = match self
                .fetch_page(resource, &[("page", swapi_page.to_string())])
                .await
            {
                Ok(p) => p,
                // Past the last page.
                Err(UpstreamError::NotFound) => break,
                Err(e) => return Err(e),
            };

            total.get_or_insert(fetched.count);
            items.extend(fetched.results);
        }

        let total = match total {
            Some(total) => total,
            None => self.total(resource).await?,
        };

        let data: Vec<T> = items
            .into_iter()
            .skip(window.start_index)
            .take(limit as usize)
            .collect();

        Ok(PaginatedResponse::new(data, page, limit, total))
    }

    /// Collection size as reported on the first upstream page.
    async fn total(&self, resource: Resource) -> Result<u64, UpstreamError> {
        let first: SwapiPage<serde_json::Value> = self
            .fetch_page(resource, &[("page", "1".to_string())])
            .await?;
        Ok(first.count)
    }
}
