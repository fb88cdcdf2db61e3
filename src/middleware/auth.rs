// ABOUTME: Bearer token authentication for protected API routes
// ABOUTME: Parses the Authorization header and validates the session JWT it carries
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::auth::{AuthManager, JwtValidationError};
use crate::constants::{auth::BEARER_PREFIX, messages};
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResult {
    /// User id from the token subject
    pub user_id: Uuid,
    /// Username at token issue time
    pub username: String,
}

/// Session authentication shared by all protected routes
#[derive(Clone)]
pub struct AuthMiddleware {
    auth_manager: Arc<AuthManager>,
}

impl AuthMiddleware {
    /// Create middleware over an auth manager
    #[must_use]
    pub const fn new(auth_manager: Arc<AuthManager>) -> Self {
        Self { auth_manager }
    }

    /// Authenticate an `Authorization` header value
    ///
    /// Accepts `Bearer <token>` and, for older clients, a bare token.
    ///
    /// # Errors
    ///
    /// - `AuthRequired` "No token provided" when the header is absent or empty
    /// - `AuthExpired` "Token expired" for an expired token
    /// - `AuthInvalid` "Invalid token" for anything else
    pub fn authenticate_request(&self, auth_header: Option<&str>) -> AppResult<AuthResult> {
        let token = auth_header
            .map(|value| value.strip_prefix(BEARER_PREFIX).unwrap_or(value).trim())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::auth_required(messages::NO_TOKEN))?;

        debug!(
            token.prefix = %token.chars().take(8).collect::<String>(),
            "Authenticating bearer token"
        );

        let claims = self.auth_manager.validate_token(token).map_err(|e| {
            if !matches!(e, JwtValidationError::TokenExpired { .. }) {
                AppLogger::log_security_event("invalid_token", "low", &e.to_string(), None);
            }
            AppError::from(e)
        })?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::auth_invalid(messages::INVALID_TOKEN))?;

        Ok(AuthResult {
            user_id,
            username: claims.username,
        })
    }
}
