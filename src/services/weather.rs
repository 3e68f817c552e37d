// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weather log ingestion and reporting.
//!
//! Timestamp bounds, paging and counting are pushed to Firestore. The
//! case-insensitive city substring match has no Firestore equivalent, so
//! city-filtered reads stream the range and keep only what they return.

use crate::db::firestore::TimestampRange;
use crate::db::FirestoreDb;
use crate::error::Result;
use crate::log_sanitizer::sanitized;
use crate::models::weather::CreateWeatherLogRequest;
use crate::models::pagination::page_offset;
use crate::models::{PaginatedResponse, WeatherLog};
use crate::services::insights::{self, Insights, INSIGHTS_WINDOW};
use crate::time_utils::now_rfc3339;
use futures_util::StreamExt;
use serde::Serialize;

/// Filters for listing weather logs.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub city: Option<String>,
    pub range: TimestampRange,
}

/// Insights endpoint payload.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum InsightsResponse {
    Report(Box<Insights>),
    Insufficient { message: String, summary: String },
}

/// Case-insensitive substring match on the log's city.
pub fn matches_city(log: &WeatherLog, city: &str) -> bool {
    let needle = city.to_lowercase();
    log.city
        .as_deref()
        .is_some_and(|c| c.to_lowercase().contains(&needle))
}

/// Distinct non-empty cities, sorted case-insensitively.
pub fn distinct_cities<I>(names: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut cities: Vec<String> = names
        .into_iter()
        .map(|c| c.as_ref().trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    cities.sort_by(|a, b| {
        a.to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b))
    });
    cities.dedup();
    cities
}

fn normalized_city(city: Option<&str>) -> Option<&str> {
    city.map(str::trim).filter(|c| !c.is_empty())
}

/// Weather log operations on top of Firestore.
#[derive(Clone)]
pub struct WeatherService {
    db: FirestoreDb,
}

impl WeatherService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Store a validated ingestion payload.
    pub async fn create(&self, request: CreateWeatherLogRequest) -> Result<WeatherLog> {
        tracing::info!(
            operation = "weather_create",
            payload = %sanitized(&request),
            "Creating weather log"
        );

        let log = request.into_log(uuid::Uuid::new_v4().to_string(), now_rfc3339());
        self.db.insert_weather_log(&log).await?;

        tracing::info!(operation = "weather_create", log_id = %log.id, "Weather log created");
        Ok(log)
    }

    /// All logs matching `filter`, newest first.
    pub async fn find(&self, filter: &LogFilter) -> Result<Vec<WeatherLog>> {
        let logs = self.db.list_weather_logs(&filter.range).await?;

        Ok(match normalized_city(filter.city.as_deref()) {
            Some(city) => logs.into_iter().filter(|l| matches_city(l, city)).collect(),
            None => logs,
        })
    }

    /// One page of logs matching `filter`.
    pub async fn find_paginated(
        &self,
        filter: &LogFilter,
        page: u32,
        limit: u32,
    ) -> Result<PaginatedResponse<WeatherLog>> {
        tracing::info!(
            operation = "weather_list",
            page,
            limit,
            city = ?filter.city,
            start = ?filter.range.start,
            end = ?filter.range.end,
            "Fetching paginated weather logs"
        );

        let offset = page_offset(page, limit);

        let Some(city) = normalized_city(filter.city.as_deref()) else {
            let total = self.db.count_weather_logs(&filter.range).await?;
            // Past the last page.
            let data = match u32::try_from(offset) {
                Ok(offset) if u64::from(offset) < total => {
                    self.db
                        .list_weather_logs_page(&filter.range, offset, Some(limit))
                        .await?
                }
                _ => Vec::new(),
            };
            return Ok(PaginatedResponse::new(data, page, limit, total));
        };

        let mut logs = self.db.stream_weather_logs(&filter.range).await?;
        let mut data = Vec::new();
        let mut total: u64 = 0;
        while let Some(log) = logs.next().await {
            let log = log?;
            if !matches_city(&log, city) {
                continue;
            }
            if total >= offset as u64 && data.len() < limit as usize {
                data.push(log);
            }
            total += 1;
        }

        Ok(PaginatedResponse::new(data, page, limit, total))
    }

    /// The `limit` most recent logs, optionally restricted to a city.
    pub async fn recent(&self, limit: u32, city: Option<&str>) -> Result<Vec<WeatherLog>> {
        let Some(city) = normalized_city(city) else {
            return self.db.recent_weather_logs(limit).await;
        };

        let mut logs = self
            .db
            .stream_weather_logs(&TimestampRange::default())
            .await?;
        let mut recent = Vec::new();
        while recent.len() < limit as usize {
            let Some(log) = logs.next().await else {
                break;
            };
            let log = log?;
            if matches_city(&log, city) {
                recent.push(log);
            }
        }
        Ok(recent)
    }

    /// Insights over the most recent logs.
    pub async fn insights(&self, city: Option<&str>) -> Result<InsightsResponse> {
        let city = normalized_city(city);
        tracing::info!(operation = "weather_insights", city, "Generating insights");

        let logs = self.recent(INSIGHTS_WINDOW, city).await?;

        Ok(match insights::generate_insights(&logs) {
            Some(report) => {
                tracing::info!(
                    operation = "weather_insights",
                    data_points = report.data_points,
                    city,
                    "Insights generated"
                );
                InsightsResponse::Report(Box::new(report))
            }
            None => InsightsResponse::Insufficient {
                message: "Insufficient data to generate insights".to_string(),
                summary: match city {
                    Some(city) => format!("No weather data available yet for {}.", city),
                    None => "No weather data available yet.".to_string(),
                },
            },
        })
    }

    /// Distinct cities that have at least one log.
    pub async fn cities(&self) -> Result<Vec<String>> {
        let cities = distinct_cities(self.db.list_cities().await?);
        tracing::info!(operation = "weather_cities", count = cities.len(), "Available cities fetched");
        Ok(cities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(city: Option<&str>) -> WeatherLog {
        WeatherLog {
            id: "id".to_string(),
            timestamp: "2025-01-24T10:00:00Z".to_string(),
            temperature: 20.0,
            humidity: 50.0,
            city: city.map(str::to_string),
            created_at: "2025-01-24T10:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_matches_city_case_insensitive_substring() {
        assert!(matches_city(&log(Some("São Paulo")), "paulo"));
        assert!(matches_city(&log(Some("São Paulo")), "SÃO"));
        assert!(!matches_city(&log(Some("Recife")), "paulo"));
        assert!(!matches_city(&log(None), "paulo"));
    }

    #[test]
    fn test_distinct_cities() {
        let logs = vec![
            log(Some("recife")),
            log(Some("Lima")),
            log(None),
            log(Some("")),
            log(Some("Lima")),
            log(Some("Berlin")),
        ];

        let names = logs.iter().filter_map(|l| l.city.as_deref());
        assert_eq!(distinct_cities(names), vec!["Berlin", "Lima", "recife"]);
    }

    #[test]
    fn test_insufficient_data_shape() {
        let response = InsightsResponse::Insufficient {
            message: "Insufficient data to generate insights".to_string(),
            summary: "No weather data available yet.".to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["message"], "Insufficient data to generate insights");
        assert!(json.get("statistics").is_none());
    }

    #[tokio::test]
    async fn test_offline_database_propagates() {
        let service = WeatherService::new(FirestoreDb::new_mock());
        assert!(service.cities().await.is_err());
        assert!(service.insights(None).await.is_err());
        assert!(service
            .find_paginated(&LogFilter::default(), 1, 10)
            .await
            .is_err());
    }
}
