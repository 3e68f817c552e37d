// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod pagination;
pub mod user;
pub mod weather;

pub use pagination::PaginatedResponse;
pub use user::{Role, Theme, User, UserResponse};
pub use weather::WeatherLog;
