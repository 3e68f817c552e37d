//! Application configuration loaded from environment variables.
//!
//! Read once at startup. A `.env` file is honoured for local development.

use std::env;
use std::str::FromStr;

const DEFAULT_POKEAPI_BASE_URL: &str = "https://pokeapi.co/api/v2";
const DEFAULT_SWAPI_BASE_URL: &str = "https://swapi.dev/api";
const DEFAULT_RAWG_BASE_URL: &str = "https://api.rawg.io/api";

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            other => Err(ConfigError::Invalid("APP_ENV", other.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Deployment environment (controls error verbosity and CORS)
    pub environment: Environment,
    /// Server port
    pub port: u16,
    /// GCP project ID holding the Firestore database
    pub gcp_project_id: String,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// RAWG API key; games endpoints are unavailable without it
    pub rawg_api_key: Option<String>,
    pub pokeapi_base_url: String,
    pub swapi_base_url: String,
    pub rawg_base_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let environment = match env::var("APP_ENV") {
            Ok(raw) => raw.parse()?,
            Err(_) => Environment::Development,
        };

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());
        if !frontend_url.starts_with("http://") && !frontend_url.starts_with("https://") {
            tracing::warn!(frontend_url = %frontend_url, "FRONTEND_URL does not look like a full URL");
        }

        Ok(Self {
            environment,
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            frontend_url,
            jwt_signing_key: env::var("JWT_SECRET")
                .map_err(|_| ConfigError::Missing("JWT_SECRET"))?
                .into_bytes(),
            rawg_api_key: env::var("RAWG_API_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            pokeapi_base_url: env::var("POKEAPI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_POKEAPI_BASE_URL.to_string()),
            swapi_base_url: env::var("SWAPI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_SWAPI_BASE_URL.to_string()),
            rawg_base_url: env::var("RAWG_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_RAWG_BASE_URL.to_string()),
        })
    }

    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            environment: Environment::Test,
            port: 3000,
            gcp_project_id: "test-project".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            rawg_api_key: None,
            pokeapi_base_url: DEFAULT_POKEAPI_BASE_URL.to_string(),
            swapi_base_url: DEFAULT_SWAPI_BASE_URL.to_string(),
            rawg_base_url: DEFAULT_RAWG_BASE_URL.to_string(),
        }
    }

    /// Origins accepted by CORS.
    ///
    /// Outside production the usual local dev servers are allowed too.
    pub fn allowed_origins(&self) -> Vec<String> {
        let mut origins = vec![self.frontend_url.clone()];
        if !self.environment.is_production() {
            for local in [
                "http://localhost:5173",
                "http://localhost:3000",
                "http://127.0.0.1:5173",
            ] {
                if !origins.iter().any(|o| o == local) {
                    origins.push(local.to_string());
                }
            }
        }
        origins
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("JWT_SECRET", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("RAWG_API_KEY", "  ");
        env::remove_var("APP_ENV");
        env::remove_var("PORT");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.jwt_signing_key, b"test_jwt_key_32_bytes_minimum!!");
        assert_eq!(config.port, 3000);
        assert_eq!(config.environment, Environment::Development);
        assert!(config.rawg_api_key.is_none());
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            "production".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert_eq!("DEV".parse::<Environment>().unwrap(), Environment::Development);
        assert!(matches!(
            "staging".parse::<Environment>(),
            Err(ConfigError::Invalid("APP_ENV", _))
        ));
    }

    #[test]
    fn test_allowed_origins_by_environment() {
        let mut config = Config::test_default();
        config.frontend_url = "https://weather.example.com".to_string();

        let dev = config.allowed_origins();
        assert_eq!(dev.len(), 4);
        assert_eq!(dev[0], "https://weather.example.com");

        config.environment = Environment::Production;
        assert_eq!(config.allowed_origins(), vec!["https://weather.example.com"]);
    }
}
