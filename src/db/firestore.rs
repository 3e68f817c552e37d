// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (accounts and roles)
//! - Weather logs (ingested observations)
//! - The registry of cities seen in weather logs
//!
//! Emails are reserved through `user_emails` documents keyed by the
//! encoded email. User writes read the reservation and the admin set
//! inside the same transaction as the write, so concurrent requests
//! cannot both pass a uniqueness or last-admin check.

use crate::db::collections;
use crate::error::AppError;
use crate::models::{User, WeatherLog};
use firestore::errors::{BackoffError, FirestoreError};
use firestore::{FirestoreResult, FirestoreWritePrecondition};
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};

/// Inclusive timestamp bounds for weather log queries (RFC3339 strings).
#[derive(Debug, Clone, Default)]
pub struct TimestampRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Outcome of a user write guarded by the email and admin rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserWrite {
    Applied,
    /// No user document with that ID.
    Missing,
    /// Another account already holds the email.
    EmailTaken,
    /// The write would leave no admin.
    LastAdmin,
}

/// Reservation of a normalized email.
#[derive(Debug, Serialize, Deserialize)]
struct EmailClaim {
    user_id: String,
}

/// Registry entry for a city that appears in at least one log.
#[derive(Debug, Serialize, Deserialize)]
struct CityEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct CountResult {
    count: usize,
}

/// Document ID of the reservation for `email`.
fn email_claim_id(email: &str) -> String {
    urlencoding::encode(email).into_owned()
}

/// Document ID of the registry entry for `city`. Exact spelling matters.
fn city_entry_id(city: &str) -> String {
    uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_OID, city.as_bytes()).to_string()
}

/// Whether `email` belongs to an account other than `user_id`.
///
/// `db` must be the transaction-bound client so the reads take part in
/// conflict detection.
async fn email_held_by_other(
    db: &firestore::FirestoreDb,
    email: &str,
    user_id: &str,
) -> FirestoreResult<bool> {
    let claim: Option<EmailClaim> = db
        .fluent()
        .select()
        .by_id_in(collections::USER_EMAILS)
        .obj()
        .one(email_claim_id(email))
        .await?;
    if let Some(claim) = claim {
        return Ok(claim.user_id != user_id);
    }

    // Accounts stored without a reservation.
    let email = email.to_string();
    let holders: Vec<User> = db
        .fluent()
        .select()
        .from(collections::USERS)
        .filter(move |q| q.for_all([q.field("email").eq(email.clone())]))
        .limit(1)
        .obj()
        .query()
        .await?;
    Ok(holders.iter().any(|u| u.id != user_id))
}

/// Number of admins, read through the transaction-bound client.
async fn admin_count(db: &firestore::FirestoreDb) -> FirestoreResult<usize> {
    let admins: Vec<User> = db
        .fluent()
        .select()
        .from(collections::USERS)
        .filter(|q| q.for_all([q.field("role").eq("admin")]))
        .obj()
        .query()
        .await?;
    Ok(admins.len())
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // The emulator needs an unauthenticated connection.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by ID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by (normalized) email.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = email.to_string();
        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.for_all([q.field("email").eq(email.clone())]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.into_iter().next())
    }

    /// List all users, ordered by creation time.
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .order_by([("created_at", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Whether any account exists.
    pub async fn has_users(&self) -> Result<bool, AppError> {
        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(!users.is_empty())
    }

    /// Store a new user and reserve its email atomically.
    ///
    /// Returns [`UserWrite::EmailTaken`] without writing when another
    /// account holds the email.
    pub async fn create_user(&self, user: &User) -> Result<UserWrite, AppError> {
        let outcome = self
            .get_client()?
            .run_transaction(|db, transaction| {
                let user = user.clone();
                Box::pin(async move {
                    // 1. Check the reservation within the transaction
                    if email_held_by_other(&db, &user.email, &user.id).await? {
                        return Ok(UserWrite::EmailTaken);
                    }

                    // 2. Reserve the email and store the user together
                    db.fluent()
                        .update()
                        .in_col(collections::USER_EMAILS)
                        .precondition(FirestoreWritePrecondition::Exists(false))
                        .document_id(email_claim_id(&user.email))
                        .object(&EmailClaim {
                            user_id: user.id.clone(),
                        })
                        .add_to_transaction(transaction)?;

                    db.fluent()
                        .update()
                        .in_col(collections::USERS)
                        .precondition(FirestoreWritePrecondition::Exists(false))
                        .document_id(&user.id)
                        .object(&user)
                        .add_to_transaction(transaction)?;

                    Ok::<_, BackoffError<FirestoreError>>(UserWrite::Applied)
                })
            })
            .await
            .map_err(|e| AppError::Database(format!("User create transaction failed: {}", e)))?;

        tracing::debug!(user_id = %user.id, outcome = ?outcome, "User create finished");
        Ok(outcome)
    }

    /// Overwrite an existing user document.
    ///
    /// Moves the email reservation when the email changes and refuses to
    /// demote the last admin.
    pub async fn update_user(&self, user: &User) -> Result<UserWrite, AppError> {
        let outcome = self
            .get_client()?
            .run_transaction(|db, transaction| {
                let user = user.clone();
                Box::pin(async move {
                    let stored: Option<User> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::USERS)
                        .obj()
                        .one(&user.id)
                        .await?;
                    let Some(stored) = stored else {
                        return Ok(UserWrite::Missing);
                    };

                    if stored.is_admin() && !user.is_admin() && admin_count(&db).await? <= 1 {
                        return Ok(UserWrite::LastAdmin);
                    }

                    if stored.email != user.email {
                        if email_held_by_other(&db, &user.email, &user.id).await? {
                            return Ok(UserWrite::EmailTaken);
                        }

                        db.fluent()
                            .delete()
                            .from(collections::USER_EMAILS)
                            .document_id(email_claim_id(&stored.email))
                            .add_to_transaction(transaction)?;

                        db.fluent()
                            .update()
                            .in_col(collections::USER_EMAILS)
                            .document_id(email_claim_id(&user.email))
                            .object(&EmailClaim {
                                user_id: user.id.clone(),
                            })
                            .add_to_transaction(transaction)?;
                    }

                    db.fluent()
                        .update()
                        .in_col(collections::USERS)
                        .document_id(&user.id)
                        .object(&user)
                        .add_to_transaction(transaction)?;

                    Ok::<_, BackoffError<FirestoreError>>(UserWrite::Applied)
                })
            })
            .await
            .map_err(|e| AppError::Database(format!("User update transaction failed: {}", e)))?;

        tracing::debug!(user_id = %user.id, outcome = ?outcome, "User update finished");
        Ok(outcome)
    }

    /// Delete a user document and release its email.
    ///
    /// Refuses to delete the last admin.
    pub async fn delete_user(&self, user_id: &str) -> Result<UserWrite, AppError> {
        let outcome = self
            .get_client()?
            .run_transaction(|db, transaction| {
                let user_id = user_id.to_string();
                Box::pin(async move {
                    let stored: Option<User> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::USERS)
                        .obj()
                        .one(&user_id)
                        .await?;
                    let Some(stored) = stored else {
                        return Ok(UserWrite::Missing);
                    };

                    if stored.is_admin() && admin_count(&db).await? <= 1 {
                        return Ok(UserWrite::LastAdmin);
                    }

                    db.fluent()
                        .delete()
                        .from(collections::USERS)
                        .document_id(&user_id)
                        .add_to_transaction(transaction)?;

                    db.fluent()
                        .delete()
                        .from(collections::USER_EMAILS)
                        .document_id(email_claim_id(&stored.email))
                        .add_to_transaction(transaction)?;

                    Ok::<_, BackoffError<FirestoreError>>(UserWrite::Applied)
                })
            })
            .await
            .map_err(|e| AppError::Database(format!("User delete transaction failed: {}", e)))?;

        tracing::debug!(user_id, outcome = ?outcome, "User delete finished");
        Ok(outcome)
    }

    // ─── Weather Log Operations ──────────────────────────────────

    /// Store a new weather log and register its city.
    pub async fn insert_weather_log(&self, log: &WeatherLog) -> Result<(), AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        client
            .fluent()
            .update()
            .in_col(collections::WEATHER_LOGS)
            .precondition(FirestoreWritePrecondition::Exists(false))
            .document_id(&log.id)
            .object(log)
            .add_to_transaction(&mut transaction)
            .map_err(|e| AppError::Database(format!("Failed to add log to transaction: {}", e)))?;

        if let Some(city) = log.city.as_deref() {
            client
                .fluent()
                .update()
                .in_col(collections::WEATHER_CITIES)
                .document_id(city_entry_id(city))
                .object(&CityEntry {
                    name: city.to_string(),
                })
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add city to transaction: {}", e))
                })?;
        }

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;
        Ok(())
    }

    /// Weather logs within an inclusive timestamp range, newest first.
    ///
    /// Timestamps are stored as normalized RFC3339 UTC strings, so string
    /// comparison orders them chronologically.
    pub async fn list_weather_logs(
        &self,
        range: &TimestampRange,
    ) -> Result<Vec<WeatherLog>, AppError> {
        self.list_weather_logs_page(range, 0, None).await
    }

    /// Up to `limit` logs in the range after skipping `offset`, newest first.
    pub async fn list_weather_logs_page(
        &self,
        range: &TimestampRange,
        offset: u32,
        limit: Option<u32>,
    ) -> Result<Vec<WeatherLog>, AppError> {
        let start = range.start.clone();
        let end = range.end.clone();

        let mut query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::WEATHER_LOGS)
            .filter(move |q| {
                q.for_all([
                    start
                        .clone()
                        .and_then(|s| q.field("timestamp").greater_than_or_equal(s)),
                    end.clone()
                        .and_then(|e| q.field("timestamp").less_than_or_equal(e)),
                ])
            })
            .order_by([("timestamp", firestore::FirestoreQueryDirection::Descending)]);

        if offset > 0 {
            query = query.offset(offset);
        }
        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        query
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Stream the logs in a range, newest first.
    pub async fn stream_weather_logs(
        &self,
        range: &TimestampRange,
    ) -> Result<BoxStream<'static, Result<WeatherLog, AppError>>, AppError> {
        let start = range.start.clone();
        let end = range.end.clone();

        let stream = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::WEATHER_LOGS)
            .filter(move |q| {
                q.for_all([
                    start
                        .clone()
                        .and_then(|s| q.field("timestamp").greater_than_or_equal(s)),
                    end.clone()
                        .and_then(|e| q.field("timestamp").less_than_or_equal(e)),
                ])
            })
            .order_by([("timestamp", firestore::FirestoreQueryDirection::Descending)])
            .obj::<WeatherLog>()
            .stream_query_with_errors()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(stream
            .map(|item| item.map_err(|e| AppError::Database(e.to_string())))
            .boxed())
    }

    /// Number of logs in a range, counted by Firestore.
    pub async fn count_weather_logs(&self, range: &TimestampRange) -> Result<u64, AppError> {
        let start = range.start.clone();
        let end = range.end.clone();

        let counts: Vec<CountResult> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::WEATHER_LOGS)
            .filter(move |q| {
                q.for_all([
                    start
                        .clone()
                        .and_then(|s| q.field("timestamp").greater_than_or_equal(s)),
                    end.clone()
                        .and_then(|e| q.field("timestamp").less_than_or_equal(e)),
                ])
            })
            .aggregate(|a| a.fields([a.field("count").count()]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(counts.first().map_or(0, |c| c.count as u64))
    }

    /// Every city registered by an ingested log, unordered.
    pub async fn list_cities(&self) -> Result<Vec<String>, AppError> {
        let entries: Vec<CityEntry> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::WEATHER_CITIES)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(entries.into_iter().map(|e| e.name).collect())
    }

    /// The `limit` most recent weather logs, newest first.
    pub async fn recent_weather_logs(&self, limit: u32) -> Result<Vec<WeatherLog>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::WEATHER_LOGS)
            .order_by([("timestamp", firestore::FirestoreQueryDirection::Descending)])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
