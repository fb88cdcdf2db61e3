// ABOUTME: TMDb (The Movie Database) v3 API client for movie metadata retrieval
// ABOUTME: Implements trending, search, discover, details and genre lookups without caching
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! TMDb API Client
//!
//! Thin proxy over the TMDb v3 REST API. Responses are not cached; every
//! request to this server results in one upstream request (or one per
//! favorite when hydrating a favorites list).
//!
//! # API Reference
//! TMDb API: <https://developer.themoviedb.org/reference/intro/getting-started>
//!
//! # Example
//! ```rust,no_run
//! use movie_explorer_server::external::{MovieCatalog, TmdbClient, TmdbClientConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = TmdbClient::new(TmdbClientConfig {
//!     api_key: "your_api_key".to_owned(),
//!     ..TmdbClientConfig::default()
//! });
//! let trending = client.trending().await?;
//! # Ok(())
//! # }
//! ```

use super::catalog::{DiscoverQuery, MovieCatalog};
use crate::config::TmdbConfig;
use crate::constants::{endpoints, messages, service_names::TMDB_API, timeouts};
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{Genre, MoviePage, MovieSummary};
use crate::utils::http_client::tmdb_client;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Instant;
use tracing::warn;

/// TMDb API client configuration
#[derive(Clone)]
pub struct TmdbClientConfig {
    /// TMDb v3 API key
    pub api_key: String,
    /// Base URL for TMDb API (default: <https://api.themoviedb.org/3>)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl std::fmt::Debug for TmdbClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbClientConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for TmdbClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: endpoints::TMDB_BASE_URL.to_owned(),
            timeout_secs: timeouts::TMDB_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl From<&TmdbConfig> for TmdbClientConfig {
    fn from(config: &TmdbConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            timeout_secs: config.timeout_secs,
        }
    }
}

/// `/trending` response
#[derive(Debug, Deserialize)]
struct TrendingResponse {
    #[serde(default)]
    results: Vec<MovieSummary>,
}

/// `/genre/movie/list` response
#[derive(Debug, Deserialize)]
struct GenreListResponse {
    #[serde(default)]
    genres: Vec<Genre>,
}

/// TMDb v3 API client
pub struct TmdbClient {
    config: TmdbClientConfig,
    http_client: reqwest::Client,
}

impl TmdbClient {
    /// Create a new TMDb API client
    #[must_use]
    pub fn new(config: TmdbClientConfig) -> Self {
        let http_client = tmdb_client(config.timeout_secs);
        Self {
            config,
            http_client,
        }
    }

    /// GET a TMDb path and decode the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> AppResult<T> {
        let url = format!("{}{path}", self.config.base_url.trim_end_matches('/'));
        let started = Instant::now();

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.config.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| {
                // reqwest errors include the URL, which carries the API key
                warn!(endpoint = %path, "TMDb request failed: {}", e.without_url());
                AppError::external_unavailable(TMDB_API, "Request failed")
            })?;

        let status = response.status();
        AppLogger::log_external_call(
            TMDB_API,
            path,
            status.as_u16(),
            u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(endpoint = %path, status = %status, body = %body, "TMDb returned an error");
            return Err(match status {
                StatusCode::NOT_FOUND => AppError::not_found(messages::MOVIE_NOT_FOUND),
                StatusCode::UNAUTHORIZED => {
                    AppError::external_service(TMDB_API, "API key rejected")
                }
                _ => AppError::external_service(TMDB_API, format!("HTTP {status}")),
            });
        }

        response.json::<T>().await.map_err(|e| {
            AppError::external_service(TMDB_API, format!("JSON parse error: {}", e.without_url()))
        })
    }
}

#[async_trait]
impl MovieCatalog for TmdbClient {
    async fn trending(&self) -> AppResult<Vec<MovieSummary>> {
        let response: TrendingResponse = self.get_json("/trending/movie/week", &[]).await?;
        Ok(response.results)
    }

    async fn search(&self, query: &str, page: u32) -> AppResult<MoviePage> {
        self.get_json(
            "/search/movie",
            &[
                ("query", query.to_owned()),
                ("page", page.to_string()),
                ("include_adult", "false".to_owned()),
            ],
        )
        .await
    }

    async fn discover(&self, query: &DiscoverQuery) -> AppResult<MoviePage> {
        let mut params = vec![
            ("page", query.page.to_string()),
            ("include_adult", "false".to_owned()),
            ("sort_by", query.sort_by.clone()),
        ];
        if let Some(genres) = &query.with_genres {
            params.push(("with_genres", genres.clone()));
        }
        if let Some(year) = &query.primary_release_year {
            params.push(("primary_release_year", year.clone()));
        }

        self.get_json("/discover/movie", &params).await
    }

    async fn movie_details(&self, movie_id: u64, append: &[&str]) -> AppResult<Value> {
        let params: Vec<(&str, String)> = if append.is_empty() {
            Vec::new()
        } else {
            vec![("append_to_response", append.join(","))]
        };
        self.get_json(&format!("/movie/{movie_id}"), &params).await
    }

    async fn genres(&self) -> AppResult<Vec<Genre>> {
        let response: GenreListResponse = self.get_json("/genre/movie/list", &[]).await?;
        Ok(response.genres)
    }
}
