// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User management (admin only) and theme preferences.

use crate::error::{AppError, Result};
use crate::log_sanitizer::sanitized;
use crate::middleware::auth::{require_admin, require_auth, AuthUser, CurrentUser};
use crate::models::{Role, Theme, User, UserResponse};
use crate::routes::auth::{check_user_write, create_account, normalize_email};
use crate::routes::extract::ValidatedJson;
use crate::services::password::{hash_password, strong_password};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

const LAST_ADMIN_ROLE_CHANGE: &str =
    "Cannot change the role of the last administrator. At least one admin must exist.";
const LAST_ADMIN_DELETE: &str =
    "Cannot delete the last administrator. At least one admin must exist.";

/// User routes. Management needs an admin; theme needs self or admin.
pub fn routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let admin = Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .route(
            "/users/{id}/password",
            axum::routing::patch(change_password),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    let theme = Router::new().route("/users/{id}/theme", get(get_theme).put(update_theme));

    admin
        .merge(theme)
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(custom(function = "strong_password"))]
    pub password: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(custom(function = "strong_password"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateThemeRequest {
    pub theme: Theme,
}

#[derive(Debug, Serialize)]
pub struct ThemeResponse {
    pub theme: Option<Theme>,
}

async fn load_user(state: &AppState, id: &str) -> Result<User> {
    state
        .db
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Allow the user themself or any admin.
async fn authorize_self_or_admin(state: &AppState, auth: &AuthUser, id: &str) -> Result<()> {
    if auth.user_id == id {
        return Ok(());
    }
    match state.db.get_user(&auth.user_id).await? {
        Some(caller) if caller.is_admin() => Ok(()),
        Some(_) => Err(AppError::Forbidden(
            "You can only access your own theme".to_string(),
        )),
        None => Err(AppError::Unauthorized),
    }
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    ValidatedJson(body): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    tracing::info!(admin_id = %admin.id, body = %sanitized(&body), "Admin creating user");

    let user = create_account(
        &state,
        &body.email,
        &body.password,
        &body.name,
        body.role.unwrap_or(Role::User),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<UserResponse>>> {
    let users = state.db.list_users().await?;
    tracing::debug!(count = users.len(), "Listing users");
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>> {
    let user = load_user(&state, &id).await?;
    Ok(Json(UserResponse::from(&user)))
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>> {
    tracing::info!(user_id = %id, body = %sanitized(&body), "Updating user");
    let mut user = load_user(&state, &id).await?;

    if let Some(email) = body.email.as_deref() {
        user.email = normalize_email(email);
    }
    if let Some(name) = body.name {
        user.name = name.trim().to_string();
    }
    if let Some(role) = body.role {
        user.role = role;
    }
    user.updated_at = now_rfc3339();

    check_user_write(state.db.update_user(&user).await?, LAST_ADMIN_ROLE_CHANGE)?;
    Ok(Json(UserResponse::from(&user)))
}

async fn change_password(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<ChangePasswordRequest>,
) -> Result<StatusCode> {
    let mut user = load_user(&state, &id).await?;

    user.password_hash = hash_password(&body.password)?;
    user.updated_at = now_rfc3339();
    check_user_write(state.db.update_user(&user).await?, LAST_ADMIN_ROLE_CHANGE)?;

    tracing::info!(user_id = %id, "Password changed");
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    check_user_write(state.db.delete_user(&id).await?, LAST_ADMIN_DELETE)?;
    tracing::info!(user_id = %id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn get_theme(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<ThemeResponse>> {
    authorize_self_or_admin(&state, &auth, &id).await?;
    let user = load_user(&state, &id).await?;
    Ok(Json(ThemeResponse { theme: user.theme }))
}

async fn update_theme(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateThemeRequest>,
) -> Result<Json<ThemeResponse>> {
    authorize_self_or_admin(&state, &auth, &id).await?;
    let mut user = load_user(&state, &id).await?;

    user.theme = Some(body.theme);
    user.updated_at = now_rfc3339();
    check_user_write(state.db.update_user(&user).await?, LAST_ADMIN_ROLE_CHANGE)?;

    tracing::info!(user_id = %id, theme = ?body.theme, "Theme updated");
    Ok(Json(ThemeResponse { theme: user.theme }))
}
