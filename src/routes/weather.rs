// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weather log routes: ingestion, listing, exports, insights.

use crate::db::firestore::TimestampRange;
use crate::error::{AppError, Result};
use crate::models::pagination::validate_page_params;
use crate::models::weather::CreateWeatherLogRequest;
use crate::models::{PaginatedResponse, WeatherLog};
use crate::routes::extract::{ApiQuery, ValidatedJson};
use crate::services::export;
use crate::services::weather::{InsightsResponse, LogFilter};
use crate::time_utils::{normalize_date_bound, DayBound};
use crate::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_LIMIT: u32 = 10;

/// Unauthenticated ingestion route (used by the collector).
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/weather/logs", post(create_log))
}

/// Reporting routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/weather/logs", get(list_logs))
        .route("/weather/export.csv", get(export_csv))
        .route("/weather/export.xlsx", get(export_xlsx))
        .route("/weather/insights", get(insights))
        .route("/weather/cities", get(cities))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogsQuery {
    page: Option<u32>,
    limit: Option<u32>,
    city: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct InsightsQuery {
    city: Option<String>,
}

fn parse_bound(raw: Option<&str>, bound: DayBound, param: &str) -> Result<Option<String>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => normalize_date_bound(value, bound).map(Some).ok_or_else(|| {
            AppError::BadRequest(format!("{} must be an ISO 8601 date or date-time", param))
        }),
    }
}

impl LogsQuery {
    fn filter(&self) -> Result<LogFilter> {
        Ok(LogFilter {
            city: self.city.clone(),
            range: TimestampRange {
                start: parse_bound(self.start_date.as_deref(), DayBound::Start, "startDate")?,
                end: parse_bound(self.end_date.as_deref(), DayBound::End, "endDate")?,
            },
        })
    }
}

/// Ingest a weather observation.
async fn create_log(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<CreateWeatherLogRequest>,
) -> Result<(StatusCode, Json<WeatherLog>)> {
    let log = state.weather_service.create(body).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

/// Paginated, filtered weather logs, newest first.
async fn list_logs(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<LogsQuery>,
) -> Result<Json<PaginatedResponse<WeatherLog>>> {
    let page = params.page.unwrap_or(DEFAULT_PAGE);
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    validate_page_params(page, limit)?;
    let filter = params.filter()?;

    let response = state
        .weather_service
        .find_paginated(&filter, page, limit)
        .await?;
    Ok(Json(response))
}

fn attachment(content_type: &'static str, filename: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

async fn export_csv(State(state): State<Arc<AppState>>) -> Result<Response> {
    tracing::info!(operation = "export_csv", "Exporting weather logs to CSV");
    let logs = state.weather_service.find(&LogFilter::default()).await?;
    let body = export::export_csv(&logs)?;
    tracing::info!(operation = "export_csv", rows = logs.len(), "CSV export completed");

    Ok(attachment(export::CSV_CONTENT_TYPE, export::CSV_FILENAME, body))
}

async fn export_xlsx(State(state): State<Arc<AppState>>) -> Result<Response> {
    tracing::info!(operation = "export_xlsx", "Exporting weather logs to XLSX");
    let logs = state.weather_service.find(&LogFilter::default()).await?;

    // Workbook assembly is CPU-bound.
    let rows = logs.len();
    let body = tokio::task::spawn_blocking(move || export::export_xlsx(&logs))
        .await
        .map_err(|e| AppError::Export {
            format: "XLSX",
            reason: e.to_string(),
        })??;
    tracing::info!(operation = "export_xlsx", rows, "XLSX export completed");

    Ok(attachment(export::XLSX_CONTENT_TYPE, export::XLSX_FILENAME, body))
}

async fn insights(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<InsightsQuery>,
) -> Result<Json<InsightsResponse>> {
    let response = state
        .weather_service
        .insights(params.city.as_deref())
        .await?;
    Ok(Json(response))
}

async fn cities(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>> {
    Ok(Json(state.weather_service.cities().await?))
}
