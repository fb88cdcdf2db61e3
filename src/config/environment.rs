// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses ports, database, auth, TMDb, Google and CORS settings from environment variables
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Environment-based configuration management for production deployment

use crate::auth::generate_jwt_secret;
use crate::constants::{auth, endpoints, ports, timeouts};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};
use url::Url;

/// Environment type for security and other configurations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Deployed service
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Type-safe database configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// `SQLite` database with file path
    SQLite {
        /// Database file location
        path: PathBuf,
    },
    /// In-memory `SQLite` (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from string with validation
    ///
    /// # Errors
    ///
    /// Returns an error for URLs naming a database engine other than `SQLite`
    pub fn parse_url(s: &str) -> Result<Self> {
        if let Some(path_str) = s.strip_prefix("sqlite:") {
            let path_str = path_str.trim_start_matches("//");
            if path_str == ":memory:" || path_str.is_empty() {
                Ok(Self::Memory)
            } else {
                Ok(Self::SQLite {
                    path: PathBuf::from(path_str),
                })
            }
        } else if s.contains("://") {
            bail!("Unsupported database URL scheme: only sqlite: URLs are supported")
        } else {
            // Fallback: treat as SQLite file path
            Ok(Self::SQLite {
                path: PathBuf::from(s),
            })
        }
    }

    /// Convert to connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from("./data/movie_explorer.db"),
        }
    }
}

impl std::fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Server configuration loaded from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// HTTP API port
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// TMDb API configuration
    pub tmdb: TmdbConfig,
    /// Google sign-in configuration
    pub google: GoogleAuthConfig,
    /// CORS configuration
    pub cors: CorsConfig,
}

/// Database settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: DatabaseUrl,
}

/// Password and session token settings
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret for session tokens
    pub jwt_secret: Option<String>,
    /// Session token lifetime in hours
    pub jwt_expiry_hours: i64,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
    /// Minimum password length at registration
    pub min_password_length: usize,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[REDACTED]"))
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("min_password_length", &self.min_password_length)
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            jwt_expiry_hours: auth::DEFAULT_JWT_EXPIRY_HOURS,
            bcrypt_cost: auth::DEFAULT_BCRYPT_COST,
            min_password_length: auth::DEFAULT_MIN_PASSWORD_LENGTH,
        }
    }
}

/// TMDb API settings
#[derive(Clone)]
pub struct TmdbConfig {
    /// v3 API key
    pub api_key: String,
    /// API root URL
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl std::fmt::Debug for TmdbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: endpoints::TMDB_BASE_URL.to_owned(),
            timeout_secs: timeouts::TMDB_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Google ID token verification settings
#[derive(Debug, Clone)]
pub struct GoogleAuthConfig {
    /// OAuth client id tokens must be issued for
    pub client_id: Option<String>,
    /// JWKS endpoint
    pub certs_url: String,
    /// Fallback signing-key cache lifetime in seconds
    pub key_cache_ttl_secs: u64,
}

impl GoogleAuthConfig {
    /// Whether Google sign-in can be used
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.client_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

impl Default for GoogleAuthConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            certs_url: endpoints::GOOGLE_CERTS_URL.to_owned(),
            key_cache_ttl_secs: timeouts::GOOGLE_KEY_CACHE_TTL_SECS,
        }
    }
}

/// Cross-origin settings
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Allowed origins; `*` allows any, `*.suffix` matches subdomains
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_owned()],
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: ports::DEFAULT_HOST.to_owned(),
            http_port: ports::DEFAULT_HTTP_PORT,
            environment: Environment::Development,
            database: DatabaseConfig {
                url: DatabaseUrl::default(),
            },
            auth: AuthConfig::default(),
            tmdb: TmdbConfig::default(),
            google: GoogleAuthConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is present but malformed, or if the
    /// resulting configuration fails [`Self::validate`]
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        // Load .env file if it exists
        if let Err(e) = dotenvy::dotenv() {
            warn!("No .env file found or failed to load: {}", e);
        }

        let http_port = match env::var("PORT").or_else(|_| env::var("HTTP_PORT")) {
            Ok(port) => port.parse().context("Invalid PORT value")?,
            Err(_) => ports::DEFAULT_HTTP_PORT,
        };

        let environment = Environment::from_str_or_default(
            &env::var("ENVIRONMENT")
                .or_else(|_| env::var("NODE_ENV"))
                .unwrap_or_default(),
        );

        let config = Self {
            host: env_var_or("HOST", ports::DEFAULT_HOST),
            http_port,
            environment,
            database: DatabaseConfig {
                url: match env::var("DATABASE_URL") {
                    Ok(url) => DatabaseUrl::parse_url(&url).context("Invalid DATABASE_URL")?,
                    Err(_) => DatabaseUrl::default(),
                },
            },
            auth: AuthConfig {
                jwt_secret: env::var("JWT_SECRET").ok().filter(|s| !s.is_empty()),
                jwt_expiry_hours: env_var_or(
                    "JWT_EXPIRY_HOURS",
                    &auth::DEFAULT_JWT_EXPIRY_HOURS.to_string(),
                )
                .parse()
                .context("Invalid JWT_EXPIRY_HOURS value")?,
                bcrypt_cost: env_var_or("BCRYPT_COST", &auth::DEFAULT_BCRYPT_COST.to_string())
                    .parse()
                    .context("Invalid BCRYPT_COST value")?,
                min_password_length: env_var_or(
                    "MIN_PASSWORD_LENGTH",
                    &auth::DEFAULT_MIN_PASSWORD_LENGTH.to_string(),
                )
                .parse()
                .context("Invalid MIN_PASSWORD_LENGTH value")?,
            },
            tmdb: TmdbConfig {
                api_key: env::var("TMDB_API_KEY").unwrap_or_default(),
                base_url: env_var_or("TMDB_BASE_URL", endpoints::TMDB_BASE_URL),
                timeout_secs: env_var_or(
                    "TMDB_TIMEOUT_SECS",
                    &timeouts::TMDB_REQUEST_TIMEOUT_SECS.to_string(),
                )
                .parse()
                .context("Invalid TMDB_TIMEOUT_SECS value")?,
            },
            google: GoogleAuthConfig {
                client_id: env::var("GOOGLE_CLIENT_ID").ok().filter(|s| !s.is_empty()),
                certs_url: env_var_or("GOOGLE_CERTS_URL", endpoints::GOOGLE_CERTS_URL),
                key_cache_ttl_secs: env_var_or(
                    "GOOGLE_KEY_CACHE_TTL_SECS",
                    &timeouts::GOOGLE_KEY_CACHE_TTL_SECS.to_string(),
                )
                .parse()
                .context("Invalid GOOGLE_KEY_CACHE_TTL_SECS value")?,
            },
            cors: CorsConfig {
                allowed_origins: parse_origins(&env_var_or("CORS_ALLOWED_ORIGINS", "*")),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.tmdb.base_url).context("TMDB_BASE_URL is not a valid URL")?;
        Url::parse(&self.google.certs_url).context("GOOGLE_CERTS_URL is not a valid URL")?;

        if !(1..=auth::MAX_JWT_EXPIRY_HOURS).contains(&self.auth.jwt_expiry_hours) {
            bail!(
                "JWT_EXPIRY_HOURS must be between 1 and {}",
                auth::MAX_JWT_EXPIRY_HOURS
            );
        }

        if !(auth::MIN_BCRYPT_COST..=auth::MAX_BCRYPT_COST).contains(&self.auth.bcrypt_cost) {
            bail!(
                "BCRYPT_COST must be between {} and {}",
                auth::MIN_BCRYPT_COST,
                auth::MAX_BCRYPT_COST
            );
        }

        if self.environment.is_production() && self.auth.jwt_secret.is_none() {
            bail!("JWT_SECRET must be set in production");
        }

        if self.tmdb.api_key.is_empty() {
            warn!("TMDB_API_KEY is not set; movie endpoints will fail upstream");
        }

        Ok(())
    }

    /// Signing secret for session tokens
    ///
    /// Outside production a missing secret is replaced by a random one, which
    /// invalidates every issued token when the process restarts.
    ///
    /// # Errors
    ///
    /// Returns an error in production when `JWT_SECRET` is absent
    pub fn resolve_jwt_secret(&self) -> Result<Vec<u8>> {
        match &self.auth.jwt_secret {
            Some(secret) => Ok(secret.as_bytes().to_vec()),
            None if self.environment.is_production() => {
                bail!("JWT_SECRET must be set in production")
            }
            None => {
                warn!("JWT_SECRET not set; generated an ephemeral secret, sessions end on restart");
                Ok(generate_jwt_secret().to_vec())
            }
        }
    }

    /// Socket address string to bind
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }

    /// Human readable configuration summary without secrets
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Movie Explorer Server Configuration:\n\
             - Environment: {}\n\
             - Listen: {}\n\
             - Database: {}\n\
             - TMDb: {} (API key {})\n\
             - Google Sign-In: {}\n\
             - Session Lifetime: {}h\n\
             - CORS Origins: {}",
            self.environment,
            self.bind_address(),
            self.database.url,
            self.tmdb.base_url,
            if self.tmdb.api_key.is_empty() {
                "missing"
            } else {
                "set"
            },
            if self.google.is_configured() {
                "Enabled"
            } else {
                "Disabled"
            },
            self.auth.jwt_expiry_hours,
            self.cors.allowed_origins.join(", "),
        )
    }
}

/// Read an environment variable with a default
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse comma-separated CORS origins
fn parse_origins(origins_str: &str) -> Vec<String> {
    if origins_str.trim() == "*" {
        vec!["*".to_owned()]
    } else {
        origins_str
            .split(',')
            .map(|s| s.trim().trim_end_matches('/').to_owned())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_database_urls() {
        assert_eq!(
            DatabaseUrl::parse_url("sqlite::memory:").unwrap(),
            DatabaseUrl::Memory
        );
        assert_eq!(
            DatabaseUrl::parse_url("sqlite:./data/app.db").unwrap(),
            DatabaseUrl::SQLite {
                path: PathBuf::from("./data/app.db")
            }
        );
        assert_eq!(
            DatabaseUrl::parse_url("movies.db").unwrap(),
            DatabaseUrl::SQLite {
                path: PathBuf::from("movies.db")
            }
        );
        assert!(DatabaseUrl::parse_url("mongodb://localhost:27017/movies").is_err());
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(parse_origins("*"), vec!["*"]);
        assert_eq!(
            parse_origins("http://localhost:3000/, *.vercel.app ,"),
            vec!["http://localhost:3000", "*.vercel.app"]
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ServerConfig::default();
        assert!(config.validate().is_ok());

        config.auth.bcrypt_cost = 2;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.tmdb.base_url = "not a url".to_owned();
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.environment = Environment::Production;
        assert!(config.validate().is_err());
        config.auth.jwt_secret = Some("prod-secret".to_owned());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_resolve_jwt_secret() {
        let mut config = ServerConfig::default();
        let generated = config.resolve_jwt_secret().unwrap();
        assert_eq!(generated.len(), auth::JWT_SECRET_LENGTH);

        config.auth.jwt_secret = Some("configured".to_owned());
        assert_eq!(config.resolve_jwt_secret().unwrap(), b"configured".to_vec());
    }

    #[test]
    fn test_summary_hides_secrets() {
        let mut config = ServerConfig::default();
        config.auth.jwt_secret = Some("super-secret-value".to_owned());
        config.tmdb.api_key = "tmdb-key-value".to_owned();
        let summary = config.summary();
        assert!(!summary.contains("super-secret-value"));
        assert!(!summary.contains("tmdb-key-value"));
        assert!(summary.contains("5001"));
    }
}
