// ABOUTME: Movie catalog abstraction over the upstream movie metadata provider
// ABOUTME: Defines the async trait routes and services call for trending, search, discover and details
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::errors::AppResult;
use crate::models::{Genre, MoviePage, MovieSummary};
use async_trait::async_trait;
use serde_json::Value;

/// Parameters for browsing without a text query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverQuery {
    /// Page number, 1-based
    pub page: u32,
    /// Genre id filter, forwarded as `with_genres`
    pub with_genres: Option<String>,
    /// Release year filter, forwarded as `primary_release_year`
    pub primary_release_year: Option<String>,
    /// Upstream sort expression such as `popularity.desc`
    pub sort_by: String,
}

/// Read-only access to movie metadata
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Movies trending this week
    async fn trending(&self) -> AppResult<Vec<MovieSummary>>;

    /// Text search, one upstream page
    async fn search(&self, query: &str, page: u32) -> AppResult<MoviePage>;

    /// Filtered browsing
    async fn discover(&self, query: &DiscoverQuery) -> AppResult<MoviePage>;

    /// Full movie record, optionally with appended sub-resources such as `credits`
    async fn movie_details(&self, movie_id: u64, append: &[&str]) -> AppResult<Value>;

    /// Movie genre list
    async fn genres(&self) -> AppResult<Vec<Genre>>;
}
