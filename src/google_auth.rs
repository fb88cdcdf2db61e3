// ABOUTME: Google Sign-In ID token validation against Google's published signing keys
// ABOUTME: Fetches and caches the Google JWKS, then checks signature, audience, issuer and expiry
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Google ID Token Validation
//!
//! The front-end obtains an ID token from Google Identity Services and posts it
//! to `/api/auth/google`. This module:
//! - Fetches RSA signing keys from Google's JWKS endpoint
//! - Caches them for the `Cache-Control: max-age` Google advertises
//! - Validates signature (RS256), issuer, audience and expiry
//! - Requires a verified email address
//!
//! ## Usage
//!
//! ```rust,no_run
//! use movie_explorer_server::config::GoogleAuthConfig;
//! use movie_explorer_server::google_auth::GoogleAuth;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let google = GoogleAuth::new(GoogleAuthConfig {
//!     client_id: Some("1234.apps.googleusercontent.com".to_owned()),
//!     ..GoogleAuthConfig::default()
//! });
//! let claims = google.validate_id_token("eyJ...").await?;
//! println!("Signed in as {}", claims.email.unwrap_or_default());
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::GoogleAuthConfig;
use crate::constants::{endpoints::GOOGLE_ISSUERS, messages, service_names, timeouts};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::utils::http_client::google_certs_client;

/// A public key from Google's JWKS document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonWebKey {
    /// Key type, `RSA` for Google
    pub kty: String,
    /// Intended use, `sig`
    #[serde(rename = "use", default)]
    pub key_use: Option<String>,
    /// Key id referenced by token headers
    pub kid: String,
    /// Signing algorithm
    #[serde(default)]
    pub alg: Option<String>,
    /// RSA modulus, base64url
    pub n: String,
    /// RSA exponent, base64url
    pub e: String,
}

/// Google's JWKS document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonWebKeySet {
    /// Published keys
    pub keys: Vec<JsonWebKey>,
}

/// Cached Google public keys
struct CachedKeys {
    /// Key ID to key material
    keys: HashMap<String, JsonWebKey>,
    /// When the cache expires
    expires_at: DateTime<Utc>,
}

/// Google ID token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleClaims {
    /// Issuer (`accounts.google.com` or `https://accounts.google.com`)
    pub iss: String,
    /// Audience (our OAuth client id)
    pub aud: String,
    /// Subject (stable Google account id)
    pub sub: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Account email
    #[serde(default)]
    pub email: Option<String>,
    /// Whether Google verified the email
    #[serde(default)]
    pub email_verified: Option<bool>,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Profile picture URL
    #[serde(default)]
    pub picture: Option<String>,
}

/// Google ID token validator
///
/// Thread-safe via `Arc<RwLock<_>>` for concurrent access.
pub struct GoogleAuth {
    config: GoogleAuthConfig,
    http_client: Client,
    cached_keys: Arc<RwLock<Option<CachedKeys>>>,
}

impl GoogleAuth {
    /// Create a new validator
    #[must_use]
    pub fn new(config: GoogleAuthConfig) -> Self {
        Self {
            config,
            http_client: google_certs_client(),
            cached_keys: Arc::new(RwLock::new(None)),
        }
    }

    /// Check if Google sign-in is configured
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.config.is_configured()
    }

    /// Validate a Google ID token
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No client id is configured
    /// - Token header cannot be decoded or lacks a key id
    /// - Signing keys cannot be fetched or do not contain the key id
    /// - Signature, expiry, issuer or audience checks fail
    /// - The account email is missing or unverified
    pub async fn validate_id_token(&self, token: &str) -> AppResult<GoogleClaims> {
        let client_id = self
            .config
            .client_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                AppError::new(ErrorCode::ConfigMissing, messages::GOOGLE_NOT_CONFIGURED)
            })?;

        let header = decode_header(token).map_err(|e| {
            debug!(error = %e, "Failed to decode Google token header");
            AppError::auth_invalid("Invalid Google credential")
        })?;

        let kid = header.kid.ok_or_else(|| {
            debug!("Google token missing key ID (kid) in header");
            AppError::auth_invalid("Google credential missing key ID")
        })?;

        let jwk = self.get_public_key(&kid).await?;
        let decoding_key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e).map_err(|e| {
            warn!(error = %e, kid = %kid, "Failed to build decoding key from JWK");
            AppError::external_service(service_names::GOOGLE_OAUTH, "Invalid signing key")
        })?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[client_id]);
        validation.set_issuer(&GOOGLE_ISSUERS);

        let claims = decode::<GoogleClaims>(token, &decoding_key, &validation)
            .map_err(|e| {
                debug!(error = %e, "Google token validation failed");
                match e.kind() {
                    ErrorKind::ExpiredSignature => AppError::auth_expired(),
                    ErrorKind::InvalidAudience => {
                        AppError::auth_invalid("Google credential issued for another client")
                    }
                    ErrorKind::InvalidIssuer => {
                        AppError::auth_invalid("Google credential has an invalid issuer")
                    }
                    _ => AppError::auth_invalid("Invalid Google credential"),
                }
            })?
            .claims;

        if !claims.email.as_deref().is_some_and(|email| !email.is_empty()) {
            return Err(AppError::auth_invalid("Google account has no email address"));
        }
        if claims.email_verified != Some(true) {
            return Err(AppError::auth_invalid("Google account email is not verified"));
        }

        info!(google.sub = %claims.sub, "Google ID token validated");
        Ok(claims)
    }

    /// Get the public key for a key ID, refreshing the cache when needed
    async fn get_public_key(&self, kid: &str) -> AppResult<JsonWebKey> {
        if let Some(key) = self.try_get_cached_key(kid).await {
            return Ok(key);
        }

        // Google rotates keys; an unknown kid means the cache may be stale
        self.refresh_keys().await?;

        let cache = self.cached_keys.read().await;
        cache
            .as_ref()
            .and_then(|cached| cached.keys.get(kid).cloned())
            .ok_or_else(|| {
                debug!(kid = %kid, "Google public key not found for kid");
                AppError::auth_invalid("Unknown token signing key")
            })
    }

    async fn try_get_cached_key(&self, kid: &str) -> Option<JsonWebKey> {
        let cache = self.cached_keys.read().await;
        cache.as_ref().and_then(|cached| {
            if cached.expires_at > Utc::now() {
                cached.keys.get(kid).cloned()
            } else {
                None
            }
        })
    }

    /// Refresh the public key cache from Google's endpoint
    async fn refresh_keys(&self) -> AppResult<()> {
        info!(url = %self.config.certs_url, "Fetching Google public keys");

        let response = self
            .http_client
            .get(&self.config.certs_url)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to fetch Google public keys");
                AppError::external_unavailable(service_names::GOOGLE_OAUTH, e.to_string())
            })?;

        if !response.status().is_success() {
            return Err(AppError::external_service(
                service_names::GOOGLE_OAUTH,
                format!("Signing key endpoint returned {}", response.status()),
            ));
        }

        let default_ttl = i64::try_from(self.config.key_cache_ttl_secs).unwrap_or(i64::MAX);
        let min_ttl = i64::try_from(timeouts::GOOGLE_KEY_CACHE_MIN_TTL_SECS).unwrap_or(0);
        let cache_ttl = response
            .headers()
            .get(reqwest::header::CACHE_CONTROL)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_max_age)
            .unwrap_or(default_ttl)
            .max(min_ttl);

        let jwks: JsonWebKeySet = response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to parse Google public keys response");
            AppError::external_service(service_names::GOOGLE_OAUTH, "Malformed signing key set")
        })?;

        let keys: HashMap<String, JsonWebKey> = jwks
            .keys
            .into_iter()
            .filter(|key| key.kty == "RSA")
            .map(|key| (key.kid.clone(), key))
            .collect();

        if keys.is_empty() {
            return Err(AppError::external_service(
                service_names::GOOGLE_OAUTH,
                "No RSA signing keys published",
            ));
        }

        let expires_at = Utc::now() + Duration::seconds(cache_ttl);
        info!(
            num_keys = keys.len(),
            cache_ttl_secs = cache_ttl,
            expires_at = %expires_at,
            "Google public keys cached"
        );

        *self.cached_keys.write().await = Some(CachedKeys { keys, expires_at });
        Ok(())
    }
}

/// Parse max-age value from Cache-Control header
///
/// Example: "public, max-age=3600, must-revalidate" -> 3600
fn parse_max_age(cache_control: &str) -> Option<i64> {
    cache_control
        .split(',')
        .map(str::trim)
        .find_map(|s| s.strip_prefix("max-age="))
        .and_then(|s| s.parse().ok())
}
