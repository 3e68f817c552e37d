// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weather insights: statistics, trend, comfort score and alerts.
//!
//! Everything here is pure and works on logs ordered newest first.

use crate::models::WeatherLog;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Number of recent logs the insights endpoint analyses.
pub const INSIGHTS_WINDOW: u32 = 30;

/// Samples in each half of the trend comparison.
const TREND_WINDOW: usize = 10;

const IDEAL_TEMP_MIN: f64 = 20.0;
const IDEAL_TEMP_MAX: f64 = 26.0;
const IDEAL_HUMIDITY_MIN: f64 = 40.0;
const IDEAL_HUMIDITY_MAX: f64 = 70.0;
const TEMP_PENALTY_PER_DEGREE: f64 = 2.0;
const HUMIDITY_PENALTY_PER_POINT: f64 = 0.5;

pub const NO_ALERTS_MESSAGE: &str = "No alerts at the moment";

/// Direction of the recent temperature movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Falling,
    Stable,
}

impl Trend {
    pub fn as_str(self) -> &'static str {
        match self {
            Trend::Rising => "rising",
            Trend::Falling => "falling",
            Trend::Stable => "stable",
        }
    }
}

/// Overall feel of the period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum DayClass {
    Cold,
    Hot,
    Humid,
    Pleasant,
}

impl DayClass {
    pub fn as_str(self) -> &'static str {
        match self {
            DayClass::Cold => "cold",
            DayClass::Hot => "hot",
            DayClass::Humid => "humid",
            DayClass::Pleasant => "pleasant",
        }
    }
}

/// Aggregate temperature and humidity figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub average_temperature: f64,
    pub average_humidity: f64,
    pub max_temperature: f64,
    pub min_temperature: f64,
    pub max_humidity: f64,
    pub min_humidity: f64,
}

/// Statistics plus the detected trend, as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct InsightStatistics {
    #[serde(flatten)]
    pub statistics: Statistics,
    pub temperature_trend: Trend,
}

/// Full insights report.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub summary: String,
    pub statistics: InsightStatistics,
    pub comfort_score: u32,
    pub day_classification: DayClass,
    pub alerts: Vec<String>,
    pub data_points: usize,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Average, minimum and maximum of temperature and humidity.
///
/// Averages are rounded to one decimal (and kept within `[min, max]`).
/// Empty input yields all zeros.
pub fn calculate_statistics(logs: &[WeatherLog]) -> Statistics {
    if logs.is_empty() {
        return Statistics::default();
    }

    let temps: Vec<f64> = logs.iter().map(|l| l.temperature).collect();
    let hums: Vec<f64> = logs.iter().map(|l| l.humidity).collect();

    let max_temperature = temps.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min_temperature = temps.iter().copied().fold(f64::INFINITY, f64::min);
    let max_humidity = hums.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min_humidity = hums.iter().copied().fold(f64::INFINITY, f64::min);

    Statistics {
        average_temperature: round1(mean(&temps)).clamp(min_temperature, max_temperature),
        average_humidity: round1(mean(&hums)).clamp(min_humidity, max_humidity),
        max_temperature,
        min_temperature,
        max_humidity,
        min_humidity,
    }
}

/// Compare the latest ten readings with the ten before them.
///
/// `temperatures` must be newest first. Fewer than 20 samples is `Stable`.
pub fn detect_temperature_trend(temperatures: &[f64]) -> Trend {
    if temperatures.len() < 2 * TREND_WINDOW {
        return Trend::Stable;
    }

    let latest = mean(&temperatures[..TREND_WINDOW]);
    let previous = mean(&temperatures[TREND_WINDOW..2 * TREND_WINDOW]);

    if latest > previous {
        Trend::Rising
    } else if latest < previous {
        Trend::Falling
    } else {
        Trend::Stable
    }
}

fn distance_outside(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min - value
    } else if value > max {
        value - max
    } else {
        0.0
    }
}

/// 0 to 100 rating; 100 inside 20 to 26 °C and 40 to 70 % humidity.
pub fn calculate_comfort_score(avg_temp: f64, avg_humidity: f64) -> f64 {
    let temp_penalty =
        distance_outside(avg_temp, IDEAL_TEMP_MIN, IDEAL_TEMP_MAX) * TEMP_PENALTY_PER_DEGREE;
    let humidity_penalty = distance_outside(avg_humidity, IDEAL_HUMIDITY_MIN, IDEAL_HUMIDITY_MAX)
        * HUMIDITY_PENALTY_PER_POINT;

    (100.0 - temp_penalty - humidity_penalty).clamp(0.0, 100.0)
}

pub fn classify_day(avg_temp: f64, avg_humidity: f64) -> DayClass {
    if avg_temp < 15.0 {
        DayClass::Cold
    } else if avg_temp > 30.0 {
        DayClass::Hot
    } else if avg_humidity > 80.0 {
        DayClass::Humid
    } else {
        DayClass::Pleasant
    }
}

/// Threshold alerts; never empty.
pub fn generate_alerts(stats: &Statistics, trend: Trend) -> Vec<String> {
    let mut alerts = Vec::new();

    if stats.max_temperature > 35.0 {
        alerts.push("Extreme heat detected".to_string());
    }
    if stats.min_temperature < 10.0 {
        alerts.push("Intense cold detected".to_string());
    }
    if stats.average_humidity > 85.0 {
        alerts.push("High humidity - chance of rain".to_string());
    }
    if trend == Trend::Rising && stats.average_temperature > 25.0 {
        alerts.push("Temperature trending upward".to_string());
    }

    if alerts.is_empty() {
        alerts.push(NO_ALERTS_MESSAGE.to_string());
    }
    alerts
}

fn summarize(
    data_points: usize,
    stats: &Statistics,
    trend: Trend,
    class: DayClass,
    comfort: u32,
) -> String {
    format!(
        "Over the last {} readings the average temperature was {:.1}°C \
         (range {:.1}°C to {:.1}°C) with average humidity of {:.1}% \
         (range {:.1}% to {:.1}%). Temperature is {}. Conditions are {} \
         with a comfort score of {}/100.",
        data_points,
        stats.average_temperature,
        stats.min_temperature,
        stats.max_temperature,
        stats.average_humidity,
        stats.min_humidity,
        stats.max_humidity,
        trend.as_str(),
        class.as_str(),
        comfort,
    )
}

/// Build the insights report for logs ordered newest first.
///
/// Returns `None` when there are no logs.
pub fn generate_insights(logs: &[WeatherLog]) -> Option<Insights> {
    if logs.is_empty() {
        return None;
    }

    let stats = calculate_statistics(logs);
    let temperatures: Vec<f64> = logs.iter().map(|l| l.temperature).collect();
    let trend = detect_temperature_trend(&temperatures);
    let comfort_score =
        calculate_comfort_score(stats.average_temperature, stats.average_humidity).round() as u32;
    let day_classification = classify_day(stats.average_temperature, stats.average_humidity);
    let alerts = generate_alerts(&stats, trend);

    Some(Insights {
        summary: summarize(logs.len(), &stats, trend, day_classification, comfort_score),
        statistics: InsightStatistics {
            statistics: stats,
            temperature_trend: trend,
        },
        comfort_score,
        day_classification,
        alerts,
        data_points: logs.len(),
    })
}
