// ABOUTME: CORS middleware configuration for HTTP API endpoints
// ABOUTME: Allows the single-page front-end to call the API from its own origin
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::config::ServerConfig;
use http::{header, request::Parts, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// One entry of the allowed-origin list
#[derive(Debug, Clone, PartialEq, Eq)]
enum OriginRule {
    /// Exact origin, e.g. `https://movies.example.com`
    Exact(String),
    /// Any subdomain of a host suffix, written `*.vercel.app`
    Subdomain(String),
}

impl OriginRule {
    fn parse(entry: &str) -> Self {
        entry.strip_prefix("*.").map_or_else(
            || Self::Exact(entry.to_owned()),
            |suffix| Self::Subdomain(format!(".{suffix}")),
        )
    }

    fn matches(&self, origin: &str) -> bool {
        match self {
            Self::Exact(allowed) => allowed == origin,
            Self::Subdomain(suffix) => origin
                .strip_prefix("https://")
                .or_else(|| origin.strip_prefix("http://"))
                .is_some_and(|host| host.ends_with(suffix.as_str()) && host.len() > suffix.len()),
        }
    }
}

/// Whether an `Origin` header value is allowed by the configured list
#[must_use]
pub fn origin_allowed(allowed_origins: &[String], origin: &str) -> bool {
    allowed_origins
        .iter()
        .map(|entry| OriginRule::parse(entry))
        .any(|rule| rule.matches(origin))
}

/// Configure CORS settings for the API
///
/// Configures cross-origin requests based on `CORS_ALLOWED_ORIGINS`.
///
/// - `*` or an empty list allows any origin without credentials
/// - Otherwise each comma-separated entry is an exact origin or a
///   `*.domain` wildcard matching any subdomain; credentials are allowed
///
/// # Examples
///
/// ```bash
/// # Allow all origins (development)
/// export CORS_ALLOWED_ORIGINS="*"
///
/// # Production front-end plus preview deployments
/// export CORS_ALLOWED_ORIGINS="https://movies.example.com,*.vercel.app"
/// ```
pub fn setup_cors(config: &ServerConfig) -> CorsLayer {
    let origins = &config.cors.allowed_origins;
    let allow_any = origins.is_empty() || origins.iter().any(|o| o == "*");

    let layer = CorsLayer::new()
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::HeaderName::from_static("x-request-id"),
        ])
        .expose_headers([header::HeaderName::from_static("x-request-id")])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]);

    if allow_any {
        return layer.allow_origin(AllowOrigin::any());
    }

    let allowed = origins.clone();
    layer
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin
                    .to_str()
                    .is_ok_and(|origin| origin_allowed(&allowed, origin))
            },
        ))
        .allow_credentials(true)
}
