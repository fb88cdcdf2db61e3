// ABOUTME: Shared HTTP client construction with timeout configuration for upstream APIs
// ABOUTME: Builds the reqwest clients used for TMDb and Google signing-key requests
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::constants::{service_names, timeouts};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Create a new HTTP client with custom timeout settings
///
/// Falls back to a default client if the builder rejects the settings.
#[must_use]
pub fn create_client_with_timeout(timeout_secs: u64, connect_timeout_secs: u64) -> Client {
    ClientBuilder::new()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .user_agent(concat!("movie-explorer-server/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Client for TMDb API calls
#[must_use]
pub fn tmdb_client(timeout_secs: u64) -> Client {
    tracing::debug!(
        service = service_names::TMDB_API,
        timeout_secs,
        "Creating upstream HTTP client"
    );
    create_client_with_timeout(timeout_secs, timeouts::HTTP_CONNECT_TIMEOUT_SECS)
}

/// Client for fetching Google signing keys
#[must_use]
pub fn google_certs_client() -> Client {
    create_client_with_timeout(
        timeouts::GOOGLE_CERTS_TIMEOUT_SECS,
        timeouts::HTTP_CONNECT_TIMEOUT_SECS,
    )
}
