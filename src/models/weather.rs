// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weather log model.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A single weather observation. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct WeatherLog {
    /// UUID (also used as document ID)
    pub id: String,
    /// Observation time, RFC3339 UTC
    pub timestamp: String,
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity, percent
    pub humidity: f64,
    #[serde(default)]
    pub city: Option<String>,
    pub created_at: String,
}

impl WeatherLog {
    /// City name, or empty when unknown.
    pub fn city_or_empty(&self) -> &str {
        self.city.as_deref().unwrap_or("")
    }
}

/// Body accepted by the ingestion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateWeatherLogRequest {
    #[validate(custom(function = "rfc3339_timestamp"))]
    pub timestamp: String,
    pub temperature: f64,
    pub humidity: f64,
    #[serde(default)]
    pub city: Option<String>,
}

fn rfc3339_timestamp(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required")
            .with_message(Cow::Borrowed("timestamp must not be empty")));
    }
    if !crate::time_utils::is_valid_iso_timestamp(value) {
        return Err(ValidationError::new("rfc3339")
            .with_message(Cow::Borrowed("timestamp must be an ISO 8601 date-time")));
    }
    Ok(())
}

impl CreateWeatherLogRequest {
    /// Build the stored log, normalizing the timestamp to UTC.
    pub fn into_log(self, id: String, created_at: String) -> WeatherLog {
        let timestamp = crate::time_utils::parse_rfc3339(&self.timestamp)
            .map(crate::time_utils::format_utc_rfc3339)
            .unwrap_or(self.timestamp);

        WeatherLog {
            id,
            timestamp,
            temperature: self.temperature,
            humidity: self.humidity,
            city: self
                .city
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            created_at,
        }
    }
}
