// ABOUTME: Authentication route handlers for registration, login, token validation and Google sign-in
// ABOUTME: Issues session JWTs and keeps password and Google accounts in one user table
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Authentication routes
//!
//! Every successful sign-in path answers with the same `{token, user}` body.

use crate::auth::{hash_password, verify_password};
use crate::constants::{auth::MAX_USERNAME_LENGTH, messages};
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{AuthTokenResponse, User, UserInfo};
use crate::resources::ServerResources;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Registration request
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    /// Desired username
    pub username: Option<String>,
    /// Plain-text password
    pub password: Option<String>,
    /// Optional email address
    pub email: Option<String>,
}

/// Login request
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    /// Username
    pub username: Option<String>,
    /// Plain-text password
    pub password: Option<String>,
}

/// Google sign-in request carrying the ID token from Google Identity Services
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GoogleSignInRequest {
    /// Google ID token
    pub credential: Option<String>,
}

/// Response for `GET /api/auth/validate`
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateResponse {
    /// Authenticated user
    pub user: UserInfo,
}

/// Authentication business logic, independent of HTTP
#[derive(Clone)]
pub struct AuthService {
    resources: Arc<ServerResources>,
}

impl AuthService {
    /// Create the service
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Create a password account and sign it in
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for missing or malformed fields and
    /// `ResourceAlreadyExists` for a taken username or email
    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthTokenResponse> {
        let username = request.username.as_deref().map(str::trim).unwrap_or_default();
        let password = request.password.as_deref().unwrap_or_default();
        if username.is_empty() || password.is_empty() {
            return Err(AppError::invalid_input(messages::CREDENTIALS_REQUIRED));
        }

        if username.chars().count() > MAX_USERNAME_LENGTH {
            return Err(AppError::invalid_input(format!(
                "Username must be at most {MAX_USERNAME_LENGTH} characters"
            )));
        }

        let min_length = self.resources.config.auth.min_password_length;
        if password.chars().count() < min_length {
            return Err(AppError::invalid_input(format!(
                "Password must be at least {min_length} characters"
            )));
        }

        let email = normalize_email(request.email.as_deref());
        if let Some(email) = &email {
            if !Self::is_valid_email(email) {
                return Err(AppError::invalid_input("Invalid email format"));
            }
        }

        let password_hash =
            hash_password(password, self.resources.config.auth.bcrypt_cost).await?;
        let user = User::new(username.to_owned(), email, password_hash);
        self.resources.database.create_user(&user).await?;

        info!(user.id = %user.id, username = %user.username, "User registered");
        AppLogger::log_auth_event(&user.id.to_string(), "register", true, None);

        self.resources.auth_manager.create_session(&user)
    }

    /// Verify a username and password
    ///
    /// # Errors
    ///
    /// Returns `AuthInvalid` "Invalid username or password" for an unknown user,
    /// a Google-only account or a wrong password
    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthTokenResponse> {
        let username = request.username.as_deref().map(str::trim).unwrap_or_default();
        let password = request.password.as_deref().unwrap_or_default();
        if username.is_empty() || password.is_empty() {
            return Err(AppError::invalid_input(messages::CREDENTIALS_REQUIRED));
        }

        let Some(user) = self.resources.database.get_user_by_username(username).await? else {
            AppLogger::log_auth_event(username, "login", false, Some("unknown user"));
            return Err(AppError::auth_invalid(messages::INVALID_CREDENTIALS));
        };

        let Some(password_hash) = user.password_hash.as_deref() else {
            AppLogger::log_auth_event(
                &user.id.to_string(),
                "login",
                false,
                Some("account has no password"),
            );
            return Err(AppError::auth_invalid(messages::INVALID_CREDENTIALS));
        };

        if !verify_password(password, password_hash).await? {
            AppLogger::log_auth_event(&user.id.to_string(), "login", false, Some("bad password"));
            return Err(AppError::auth_invalid(messages::INVALID_CREDENTIALS));
        }

        AppLogger::log_auth_event(&user.id.to_string(), "login", true, None);
        self.resources.auth_manager.create_session(&user)
    }

    /// Resolve a bearer token to its user
    ///
    /// # Errors
    ///
    /// Returns an auth error for a missing, invalid or expired token, or when
    /// the user no longer exists
    pub async fn validate(&self, auth_header: Option<&str>) -> AppResult<ValidateResponse> {
        let auth = self
            .resources
            .auth_middleware
            .authenticate_request(auth_header)?;

        let user = self
            .resources
            .database
            .get_user(auth.user_id)
            .await?
            .ok_or_else(|| AppError::auth_invalid(messages::INVALID_TOKEN))?;

        Ok(ValidateResponse { user: user.info() })
    }

    /// Sign in with a Google ID token
    ///
    /// Looks the account up by Google subject and otherwise creates a new
    /// account. An email already held by another account is never linked.
    ///
    /// # Errors
    ///
    /// Returns an auth error for a rejected token, `ConfigMissing` when Google
    /// sign-in is not configured, `ResourceAlreadyExists` when the email is
    /// taken, or a storage error
    pub async fn google_sign_in(
        &self,
        request: GoogleSignInRequest,
    ) -> AppResult<AuthTokenResponse> {
        let credential = request
            .credential
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::invalid_input("Google credential is required"))?;

        let claims = self.resources.google_auth.validate_id_token(credential).await?;
        let email = normalize_email(claims.email.as_deref())
            .ok_or_else(|| AppError::auth_invalid("Google account has no email"))?;
        let database = &self.resources.database;

        let user = if let Some(user) = database.get_user_by_google_id(&claims.sub).await? {
            user
        } else if let Some(existing) = database.get_user_by_email(&email).await? {
            // Registered emails are unverified
            AppLogger::log_security_event(
                "google_email_conflict",
                "medium",
                "Google sign-in email belongs to another account",
                Some(&existing.id.to_string()),
            );
            return Err(AppError::already_exists(messages::EMAIL_TAKEN));
        } else {
            let username = self.available_username(&email, &claims.sub).await?;
            let user = User::new_google(username, email, claims.sub.clone());
            database.create_user(&user).await?;
            info!(user.id = %user.id, username = %user.username, "User registered via Google");
            user
        };

        AppLogger::log_auth_event(&user.id.to_string(), "google_sign_in", true, None);
        self.resources.auth_manager.create_session(&user)
    }

    /// Pick a free username derived from an email address
    async fn available_username(&self, email: &str, google_sub: &str) -> AppResult<String> {
        let base = username_from_email(email);
        let short_suffix: String = google_sub.chars().take(6).collect();

        for candidate in [
            base.clone(),
            format!("{base}_{short_suffix}"),
            format!("{base}_{google_sub}"),
        ] {
            if !self.resources.database.username_exists(&candidate).await? {
                return Ok(candidate);
            }
        }

        warn!(username = %base, "No free username derived from Google account");
        Err(AppError::already_exists(messages::USERNAME_TAKEN))
    }

    /// Validate email format
    #[must_use]
    pub fn is_valid_email(email: &str) -> bool {
        if email.len() <= 5 || email.chars().any(char::is_whitespace) {
            return false;
        }
        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };
        !local.is_empty()
            && !domain.contains('@')
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
    }
}

/// Trimmed, lower-cased email; blank means none
fn normalize_email(email: Option<&str>) -> Option<String> {
    email
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_lowercase)
}

/// Email local part reduced to username-safe characters
fn username_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let sanitized: String = local
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .take(MAX_USERNAME_LENGTH / 2)
        .collect();

    if sanitized.is_empty() {
        "user".to_owned()
    } else {
        sanitized
    }
}

/// Authentication routes
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/register", post(Self::handle_register))
            .route("/api/auth/login", post(Self::handle_login))
            .route("/api/auth/validate", get(Self::handle_validate))
            .route("/api/auth/google", post(Self::handle_google))
            .with_state(resources)
    }

    /// Handle POST /api/auth/register
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        body: Result<Json<RegisterRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let Json(request) = body?;
        let response = AuthService::new(resources).register(request).await?;
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle POST /api/auth/login
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        body: Result<Json<LoginRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let Json(request) = body?;
        let response = AuthService::new(resources).login(request).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/auth/validate
    async fn handle_validate(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth_header = headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());
        let response = AuthService::new(resources).validate(auth_header).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/auth/google
    async fn handle_google(
        State(resources): State<Arc<ServerResources>>,
        body: Result<Json<GoogleSignInRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let Json(request) = body?;
        let response = AuthService::new(resources).google_sign_in(request).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
