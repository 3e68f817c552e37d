// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Pagination parameter handling on list endpoints.

use axum::http::StatusCode;
use tower::ServiceExt;

mod common;
use common::{body_json, create_test_app, get, test_token};

const LIST_ROUTES: [&str; 4] = ["/weather/logs", "/pokemon", "/starwars/planets", "/games"];

#[tokio::test]
async fn test_page_zero_rejected() {
    for route in LIST_ROUTES {
        let (app, state) = create_test_app();
        let token = test_token(&state, "user-1");

        let response = app
            .oneshot(get(&format!("{}?page=0", route), Some(&token)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", route);
        let body = body_json(response).await;
        assert_eq!(body["messages"][0], "page must be at least 1");
    }
}

#[tokio::test]
async fn test_limit_over_maximum_rejected() {
    for route in LIST_ROUTES {
        let (app, state) = create_test_app();
        let token = test_token(&state, "user-1");

        let response = app
            .oneshot(get(&format!("{}?limit=101", route), Some(&token)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", route);
        let body = body_json(response).await;
        assert_eq!(body["messages"][0], "limit must be between 1 and 100");
    }
}

#[tokio::test]
async fn test_limit_zero_rejected() {
    let (app, state) = create_test_app();
    let token = test_token(&state, "user-1");

    let response = app
        .oneshot(get("/weather/logs?page=1&limit=0", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_valid_params_reach_database() {
    let (app, state) = create_test_app();
    let token = test_token(&state, "user-1");

    let response = app
        .oneshot(get(
            "/weather/logs?page=2&limit=5&city=recife&startDate=2025-01-01&endDate=2025-01-31",
            Some(&token),
        ))
        .await
        .unwrap();

    // Parameters pass validation; the offline mock database then fails.
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"], "database_error");
}
