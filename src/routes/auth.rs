// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration and login.

use crate::db::firestore::UserWrite;
use crate::error::{AppError, Result};
use crate::middleware::auth::create_jwt;
use crate::models::{Role, User};
use crate::routes::extract::ValidatedJson;
use crate::services::password::{hash_password, strong_password, verify_password};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(custom(function = "strong_password"))]
    pub password: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// User summary embedded in the auth response.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: SessionUser,
}

/// Emails are compared case-insensitively.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn session_for(state: &AppState, user: &User) -> Result<AuthResponse> {
    let access_token = create_jwt(&user.id, &user.email, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(e.context("Failed to sign session token")))?;

    Ok(AuthResponse {
        access_token,
        user: SessionUser {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        },
    })
}

/// Build and store a new account.
///
/// Shared by self-registration and admin user creation.
pub async fn create_account(
    state: &AppState,
    email: &str,
    password: &str,
    name: &str,
    role: Role,
) -> Result<User> {
    let email = normalize_email(email);
    let now = now_rfc3339();
    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        email,
        password_hash: hash_password(password)?,
        name: name.trim().to_string(),
        role,
        theme: None,
        created_at: now.clone(),
        updated_at: now,
    };

    check_user_write(state.db.create_user(&user).await?, "")?;
    tracing::info!(user_id = %user.id, role = ?user.role, "User created");
    Ok(user)
}

/// Turn a guarded user write outcome into a handler result.
///
/// `last_admin_message` is the 400 message when the write would have left
/// no admin.
pub fn check_user_write(outcome: UserWrite, last_admin_message: &str) -> Result<()> {
    match outcome {
        UserWrite::Applied => Ok(()),
        UserWrite::Missing => Err(AppError::NotFound("User not found".to_string())),
        UserWrite::EmailTaken => Err(AppError::Conflict("Email already in use".to_string())),
        UserWrite::LastAdmin => Err(AppError::BadRequest(last_admin_message.to_string())),
    }
}

/// Register a new account. The very first account becomes an admin.
async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let first_account = !state.db.has_users().await?;
    let role = if first_account {
        Role::Admin
    } else {
        Role::User
    };
    tracing::info!(first_account, role = ?role, "Registering user");

    let user = create_account(&state, &body.email, &body.password, &body.name, role).await?;

    Ok((StatusCode::CREATED, Json(session_for(&state, &user)?)))
}

/// Exchange credentials for a session token.
async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let email = normalize_email(&body.email);
    let user = state
        .db
        .find_user_by_email(&email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&body.password, &user.password_hash)? {
        tracing::info!(user_id = %user.id, "Login failed: wrong password");
        return Err(AppError::InvalidCredentials);
    }

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Json(session_for(&state, &user)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_validation() {
        let valid = RegisterRequest {
            email: "ana@example.com".to_string(),
            password: "Password123!".to_string(),
            name: "Ana".to_string(),
        };
        assert!(valid.validate().is_ok());

        let weak = RegisterRequest {
            password: "password".to_string(),
            ..valid
        };
        let err = AppError::from(weak.validate().unwrap_err());
        match err {
            AppError::Validation(messages) => {
                assert_eq!(messages.len(), 1);
                assert!(messages[0].contains("uppercase"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ana@Example.COM "), "ana@example.com");
    }

    #[test]
    fn test_check_user_write() {
        assert!(check_user_write(UserWrite::Applied, "").is_ok());
        assert!(matches!(
            check_user_write(UserWrite::Missing, ""),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            check_user_write(UserWrite::EmailTaken, ""),
            Err(AppError::Conflict(_))
        ));
        match check_user_write(UserWrite::LastAdmin, "keep one admin") {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "keep one admin"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
