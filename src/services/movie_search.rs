// ABOUTME: Movie search service combining TMDb search or discover with local filtering and sorting
// ABOUTME: Applies genre, year and sort options TMDb text search does not support, and drops art-less movies
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Movie Search
//!
//! TMDb's `/search/movie` endpoint only matches on text. When a query is
//! present the genre, year and sort options are applied here to the single
//! page TMDb returns, which is why such responses always report one page.
//! Without a query everything is delegated to `/discover/movie`.

use crate::constants::tmdb::DEFAULT_DISCOVER_SORT;
use crate::errors::{AppError, AppResult};
use crate::external::{DiscoverQuery, MovieCatalog};
use crate::models::{MovieSummary, SearchResponse};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// Query string accepted by `GET /api/movies/search`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    /// Free-text title query
    pub query: Option<String>,
    /// Page number, defaults to 1
    pub page: Option<u32>,
    /// Genre id
    pub with_genres: Option<String>,
    /// Release year, matched as a prefix of `release_date`
    pub primary_release_year: Option<String>,
    /// `field.order`, e.g. `vote_average.desc`
    pub sort_by: Option<String>,
}

impl SearchParams {
    /// Trimmed, non-empty text query
    #[must_use]
    pub fn text_query(&self) -> Option<&str> {
        self.query.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    fn non_empty(value: Option<&String>) -> Option<String> {
        value
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    }

    /// Requested page, validated
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for page 0
    pub fn page(&self) -> AppResult<u32> {
        match self.page {
            None => Ok(1),
            Some(0) => Err(AppError::invalid_input("page must be at least 1")),
            Some(page) => Ok(page),
        }
    }

    /// Genre filter parsed as a TMDb genre id
    ///
    /// A comma or pipe separated list uses its first id.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the value is not numeric
    pub fn genre_id(&self) -> AppResult<Option<u64>> {
        Self::non_empty(self.with_genres.as_ref())
            .map(|raw| {
                let first = raw.split([',', '|']).next().unwrap_or_default().trim();
                first
                    .parse::<u64>()
                    .map_err(|_| AppError::invalid_input(format!("Invalid genre id: {raw}")))
            })
            .transpose()
    }
}

/// Field a search result list can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    /// TMDb popularity score
    Popularity,
    /// Mean rating
    VoteAverage,
    /// Release date
    ReleaseDate,
}

/// Parsed `field.order` sort expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    /// Field to compare
    pub field: SortField,
    /// Largest first
    pub descending: bool,
}

impl SortSpec {
    /// Parse a `field.order` expression. Unknown fields yield `None`, which
    /// leaves the upstream order untouched; any order other than `desc` is ascending.
    #[must_use]
    pub fn parse(expression: &str) -> Option<Self> {
        let mut parts = expression.trim().splitn(2, '.');
        let field = match parts.next()? {
            "popularity" => SortField::Popularity,
            "vote_average" => SortField::VoteAverage,
            "release_date" => SortField::ReleaseDate,
            _ => return None,
        };
        let descending = parts.next() == Some("desc");
        Some(Self { field, descending })
    }

    /// Sort movies in place. The sort is stable, so ties keep upstream order.
    pub fn apply(self, movies: &mut [MovieSummary]) {
        movies.sort_by(|a, b| {
            let ordering = self.key(a).total_cmp(&self.key(b));
            if self.descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
    }

    fn key(self, movie: &MovieSummary) -> f64 {
        match self.field {
            SortField::Popularity => movie.popularity.unwrap_or(0.0),
            SortField::VoteAverage => movie.vote_average.unwrap_or(0.0),
            SortField::ReleaseDate => release_timestamp(movie.release_date.as_deref()) as f64,
        }
    }
}

/// Release date as Unix seconds; missing or unparseable dates count as 0
fn release_timestamp(release_date: Option<&str>) -> i64 {
    release_date
        .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map_or(0, |datetime| datetime.and_utc().timestamp())
}

/// Apply genre and year filters, sort, then drop movies without artwork
#[must_use]
pub fn refine_search_results(
    mut movies: Vec<MovieSummary>,
    genre_id: Option<u64>,
    year: Option<&str>,
    sort: Option<SortSpec>,
) -> Vec<MovieSummary> {
    if let Some(genre_id) = genre_id {
        movies.retain(|movie| movie.genre_ids.contains(&genre_id));
    }

    if let Some(year) = year {
        movies.retain(|movie| {
            movie
                .release_date
                .as_deref()
                .is_some_and(|date| !date.is_empty() && date.starts_with(year))
        });
    }

    if let Some(sort) = sort {
        sort.apply(&mut movies);
    }

    movies.retain(MovieSummary::has_artwork);
    movies
}

/// Search and browse over a movie catalog
#[derive(Clone)]
pub struct MovieSearchService {
    catalog: Arc<dyn MovieCatalog>,
}

impl MovieSearchService {
    /// Create a service over a catalog
    #[must_use]
    pub fn new(catalog: Arc<dyn MovieCatalog>) -> Self {
        Self { catalog }
    }

    /// Trending movies that have artwork
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog request fails
    pub async fn trending(&self) -> AppResult<Vec<MovieSummary>> {
        let mut movies = self.catalog.trending().await?;
        movies.retain(MovieSummary::has_artwork);
        debug!(count = movies.len(), "Trending movies");
        Ok(movies)
    }

    /// Run a search or discover request
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for bad parameters or an upstream error
    pub async fn search(&self, params: &SearchParams) -> AppResult<SearchResponse> {
        let page = params.page()?;
        let year = SearchParams::non_empty(params.primary_release_year.as_ref());
        let sort_by = SearchParams::non_empty(params.sort_by.as_ref());

        if let Some(query) = params.text_query() {
            let genre_id = params.genre_id()?;
            let upstream = self.catalog.search(query, page).await?;
            let results = refine_search_results(
                upstream.results,
                genre_id,
                year.as_deref(),
                sort_by.as_deref().and_then(SortSpec::parse),
            );
            debug!(count = results.len(), "Filtered search results");

            Ok(SearchResponse {
                total_pages: 1,
                total_results: results.len() as u64,
                results,
            })
        } else {
            let discover = DiscoverQuery {
                page,
                with_genres: SearchParams::non_empty(params.with_genres.as_ref()),
                primary_release_year: year,
                sort_by: sort_by.unwrap_or_else(|| DEFAULT_DISCOVER_SORT.to_owned()),
            };
            let upstream = self.catalog.discover(&discover).await?;
            let mut results = upstream.results;
            results.retain(MovieSummary::has_artwork);
            debug!(count = results.len(), "Filtered discover results");

            Ok(SearchResponse {
                results,
                total_pages: upstream.total_pages,
                total_results: upstream.total_results,
            })
        }
    }
}
