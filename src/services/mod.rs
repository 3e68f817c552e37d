// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod export;
pub mod games;
pub mod insights;
pub mod password;
pub mod pokemon;
pub mod starwars;
pub mod upstream;
pub mod weather;

pub use games::GamesService;
pub use pokemon::PokemonService;
pub use starwars::StarWarsService;
pub use upstream::UpstreamError;
pub use weather::WeatherService;
