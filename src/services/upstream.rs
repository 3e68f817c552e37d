// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared plumbing for the third-party JSON APIs.

use crate::error::AppError;
use serde::de::DeserializeOwned;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Failure categories of an upstream call.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// HTTP 429 from the upstream API.
    #[error("upstream rate limit hit")]
    RateLimited,
    /// HTTP 404 from the upstream API.
    #[error("upstream resource not found")]
    NotFound,
    #[error("upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("upstream request failed: {0}")]
    Transport(String),
    #[error("invalid upstream JSON: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// Map to an API error: 429 stays 429, anything else becomes a 500
    /// carrying `context`.
    pub fn into_app_error(self, context: &str) -> AppError {
        match self {
            UpstreamError::RateLimited => AppError::TooManyRequests,
            other => {
                tracing::debug!(error = %other, context, "Upstream call failed");
                AppError::Upstream(context.to_string())
            }
        }
    }
}

/// Build the pooled HTTP client shared by an API wrapper.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("weather-dashboard/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to default HTTP client");
            reqwest::Client::new()
        })
}

/// Strip a trailing slash so paths can be appended with `/`.
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Send a request and decode a JSON body from a successful response.
///
/// Error messages never include the request URL, which may carry an API key.
pub async fn fetch_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, UpstreamError> {
    let response = request
        .send()
        .await
        .map_err(|e| UpstreamError::Transport(e.without_url().to_string()))?;

    check_response_json(response).await
}

/// Check response status and parse JSON body.
pub async fn check_response_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, UpstreamError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();

        return Err(match status.as_u16() {
            429 => {
                tracing::warn!("Upstream rate limit hit (429)");
                UpstreamError::RateLimited
            }
            404 => UpstreamError::NotFound,
            code => UpstreamError::Status { status: code, body },
        });
    }

    response
        .json()
        .await
        .map_err(|e| UpstreamError::Decode(e.without_url().to_string()))
}
