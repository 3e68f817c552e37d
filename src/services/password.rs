//! Password hashing (argon2) and strength rules.

use crate::error::AppError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::borrow::Cow;
use validator::ValidationError;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Every strength rule the password fails, in a fixed order.
pub fn validate_password_strength(password: &str) -> Vec<&'static str> {
    let mut failures = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        failures.push("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        failures.push("Password must contain an uppercase letter");
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        failures.push("Password must contain a lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        failures.push("Password must contain a number");
    }
    if !password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace()) {
        failures.push("Password must contain a special character");
    }

    failures
}

/// `validator` hook for request bodies carrying a new password.
pub fn strong_password(password: &str) -> Result<(), ValidationError> {
    let failures = validate_password_strength(password);
    if failures.is_empty() {
        return Ok(());
    }
    Err(ValidationError::new("weak_password").with_message(Cow::Owned(failures.join("; "))))
}

pub fn hash_password(plain: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!(error = %e, "argon2 hash_password error");
            AppError::Internal(anyhow::anyhow!("Failed to hash password: {}", e))
        })
}

/// `false` on mismatch; errors only when the stored hash is malformed.
pub fn verify_password(plain: &str, hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        tracing::error!(error = %e, "argon2 parse hash error");
        AppError::Internal(anyhow::anyhow!("Stored password hash is invalid: {}", e))
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strong_password_passes() {
        assert!(validate_password_strength("Password123!").is_empty());
        assert!(strong_password("Sup3r$ecret").is_ok());
    }

    #[test]
    fn test_each_rule_reported() {
        assert_eq!(validate_password_strength("Pa1!").len(), 1);
        assert_eq!(
            validate_password_strength("password123!"),
            vec!["Password must contain an uppercase letter"]
        );
        assert_eq!(
            validate_password_strength("PASSWORD123!"),
            vec!["Password must contain a lowercase letter"]
        );
        assert_eq!(
            validate_password_strength("Password!!"),
            vec!["Password must contain a number"]
        );
        assert_eq!(
            validate_password_strength("Password123"),
            vec!["Password must contain a special character"]
        );
        assert_eq!(validate_password_strength("").len(), 5);
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("Secur3P@ssw0rd!").expect("hashing should succeed");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Secur3P@ssw0rd!", &hash).unwrap());
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn test_verify_errors_on_malformed_hash() {
        assert!(verify_password("anything", "not-a-valid-hash").is_err());
    }
}
