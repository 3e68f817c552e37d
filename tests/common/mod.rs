// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use std::sync::Arc;
use weather_dashboard::config::Config;
use weather_dashboard::db::FirestoreDb;
use weather_dashboard::middleware::auth::create_jwt;
use weather_dashboard::routes::create_router;
use weather_dashboard::services::{GamesService, PokemonService, StarWarsService, WeatherService};
use weather_dashboard::AppState;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Database in a fresh emulator project, empty on first use.
#[allow(dead_code)]
pub async fn isolated_db() -> FirestoreDb {
    let project = format!("test-{}", &uuid::Uuid::new_v4().simple().to_string()[..12]);
    FirestoreDb::new(&project)
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Build shared state around the given config and database.
#[allow(dead_code)]
pub fn test_state(config: Config, db: FirestoreDb) -> Arc<AppState> {
    let weather_service = WeatherService::new(db.clone());
    let pokemon_service = PokemonService::new(&config.pokeapi_base_url);
    let starwars_service = StarWarsService::new(&config.swapi_base_url);
    let games_service = GamesService::new(&config.rawg_base_url, config.rawg_api_key.clone());

    Arc::new(AppState {
        config,
        db,
        weather_service,
        pokemon_service,
        starwars_service,
        games_service,
    })
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = test_state(Config::test_default(), test_db_offline());
    (create_router(state.clone()), state)
}

/// Session token for an arbitrary user, signed with the test key.
#[allow(dead_code)]
pub fn test_token(state: &AppState, user_id: &str) -> String {
    create_jwt(
        user_id,
        &format!("{}@example.com", user_id),
        &state.config.jwt_signing_key,
    )
    .expect("Failed to create test JWT")
}

/// GET request, optionally authenticated.
#[allow(dead_code)]
pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

/// JSON request with the given method, optionally authenticated.
#[allow(dead_code)]
pub fn json_request(
    method: &str,
    uri: &str,
    body: serde_json::Value,
    token: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).expect("Response body is not JSON")
}

/// Serve a stub upstream API on an ephemeral local port.
/// Returns its base URL.
#[allow(dead_code)]
pub async fn spawn_stub(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}
