// Application configuration
// Read once at startup and handed to every component that needs it

use std::str::FromStr;
use std::time::Duration;

/// Default trivia endpoint returning a single question
const DEFAULT_TRIVIA_API_URL: &str = "https://the-trivia-api.com/api/questions?limit=1";

/// Errors raised while building the configuration from the environment
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Process-wide settings
///
/// Built once by [`AppConfig::from_env`] and passed into service constructors.
/// Business logic never reads environment variables directly.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub trivia_api_url: String,
    /// Upper bound on a single trivia question fetch
    pub trivia_timeout: Duration,
    /// Attempts restored to every user by the daily reset
    pub daily_game_attempts: i32,
    /// Check submitted option selections against the catalog on plain orders.
    /// Promotion orders always check.
    pub validate_plain_order_options: bool,
    /// Reject answers submitted by a user who does not own the game
    pub enforce_game_ownership: bool,
}

impl AppConfig {
    /// Build the configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            host: optional("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parsed("PORT", 8080)?,
            jwt_secret: required("JWT_SECRET")?,
            trivia_api_url: optional("TRIVIA_API_URL")
                .unwrap_or_else(|| DEFAULT_TRIVIA_API_URL.to_string()),
            trivia_timeout: Duration::from_secs(parsed("TRIVIA_TIMEOUT_SECS", 5)?),
            daily_game_attempts: parsed("DAILY_GAME_ATTEMPTS", 3)?,
            validate_plain_order_options: parsed("VALIDATE_PLAIN_ORDER_OPTIONS", false)?,
            enforce_game_ownership: parsed("ENFORCE_GAME_OWNERSHIP", false)?,
        })
    }

    /// Socket address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: String::new(),
            trivia_api_url: DEFAULT_TRIVIA_API_URL.to_string(),
            trivia_timeout: Duration::from_secs(5),
            daily_game_attempts: 3,
            validate_plain_order_options: false,
            enforce_game_ownership: false,
        }
    }
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    optional(key).ok_or(ConfigError::Missing(key))
}

fn parsed<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
