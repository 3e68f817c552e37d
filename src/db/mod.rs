//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const USER_EMAILS: &str = "user_emails";
    pub const WEATHER_LOGS: &str = "weather_logs";
    pub const WEATHER_CITIES: &str = "weather_cities";
}
