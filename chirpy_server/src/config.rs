//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use chirpy::db::DatabaseConfig;
use std::net::SocketAddr;

/// Default bind address when neither `--bind` nor `SERVER_BIND` is given
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Minimum accepted `JWT_SECRET` length
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Security configuration
    pub security: SecurityConfig,
    /// Deployment platform
    pub platform: Platform,
    /// Access token lifetime in seconds
    pub access_token_ttl_secs: i64,
}

/// Security-related configuration
#[derive(Clone)]
pub struct SecurityConfig {
    /// JWT signing secret (required)
    pub jwt_secret: String,
    /// Shared key for payment provider webhooks (required)
    pub polka_key: String,
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .field("polka_key", &"<redacted>")
            .finish()
    }
}

/// Deployment platform. Only `dev` unlocks destructive admin endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Dev,
    Production,
}

impl Platform {
    /// Any value other than exactly `dev` is treated as production
    pub fn from_env_value(value: &str) -> Self {
        if value == "dev" {
            Platform::Dev
        } else {
            Platform::Production
        }
    }

    pub fn is_dev(self) -> bool {
        self == Platform::Dev
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => {
                let raw = std::env::var("SERVER_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
                raw.parse().map_err(|_| ConfigError::Invalid {
                    var: "SERVER_BIND".to_string(),
                    reason: format!("'{raw}' is not a socket address"),
                })?
            }
        };

        let database_url = database_url_override
            .or_else(|| std::env::var("DATABASE_URL").ok())
            .ok_or_else(|| ConfigError::MissingRequired {
                var: "DATABASE_URL".to_string(),
                hint: "e.g. postgres://postgres@localhost/chirpy".to_string(),
            })?;

        let defaults = DatabaseConfig::new(database_url);
        let database = DatabaseConfig {
            max_connections: parse_env_or("DB_MAX_CONNECTIONS", defaults.max_connections),
            min_connections: parse_env_or("DB_MIN_CONNECTIONS", defaults.min_connections),
            connection_timeout_secs: parse_env_or(
                "DB_CONNECTION_TIMEOUT_SECS",
                defaults.connection_timeout_secs,
            ),
            idle_timeout_secs: parse_env_or("DB_IDLE_TIMEOUT_SECS", defaults.idle_timeout_secs),
            max_lifetime_secs: parse_env_or("DB_MAX_LIFETIME_SECS", defaults.max_lifetime_secs),
            ..defaults
        };

        // Security configuration (REQUIRED)
        let jwt_secret = required_env("JWT_SECRET", "Generate with: openssl rand -base64 64")?;
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::Invalid {
                var: "JWT_SECRET".to_string(),
                reason: format!("Must be at least {MIN_JWT_SECRET_LEN} characters"),
            });
        }

        let polka_key = required_env("POLKA_KEY", "Copy the API key from the Polka dashboard")?;

        let platform = Platform::from_env_value(&required_env(
            "PLATFORM",
            "Set to 'dev' for local development",
        )?);

        let config = ServerConfig {
            bind,
            database,
            security: SecurityConfig {
                jwt_secret,
                polka_key,
            },
            platform,
            access_token_ttl_secs: parse_env_or("ACCESS_TOKEN_TTL_SECS", 3600),
        };
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_token_ttl_secs <= 0 {
            return Err(ConfigError::Invalid {
                var: "ACCESS_TOKEN_TTL_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid {
                var: "DB_MIN_CONNECTIONS".to_string(),
                reason: format!(
                    "Cannot exceed DB_MAX_CONNECTIONS ({})",
                    self.database.max_connections
                ),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Read a variable that must be present and non-empty
fn required_env(key: &str, hint: &str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingRequired {
            var: key.to_string(),
            hint: hint.to_string(),
        })
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
