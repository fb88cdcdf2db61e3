// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides in-memory database, test configuration, a fake movie catalog and user helpers
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `movie_explorer_server`

use anyhow::Result;
use async_trait::async_trait;
use movie_explorer_server::{
    auth::hash_password,
    config::{DatabaseUrl, Environment, ServerConfig},
    constants::messages,
    database::Database,
    errors::{AppError, AppResult},
    external::{DiscoverQuery, MovieCatalog},
    models::{Genre, MoviePage, MovieSummary, User},
    resources::ServerResources,
};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Password used by [`create_test_user`]
pub const TEST_PASSWORD: &str = "correct-horse";

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // TEST_LOG raises verbosity for debugging a failing test
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Configuration for tests: in-memory database, fixed secret, cheap bcrypt
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig {
        environment: Environment::Testing,
        ..ServerConfig::default()
    };
    config.database.url = DatabaseUrl::Memory;
    config.auth.jwt_secret = Some("integration-test-secret".to_owned());
    config.auth.bcrypt_cost = 4;
    config.tmdb.api_key = "test-api-key".to_owned();
    config
}

/// Standard test database setup
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    Ok(Database::new(&DatabaseUrl::Memory).await?)
}

/// Server resources over an in-memory database and the given catalog
pub async fn create_test_server_resources_with(
    config: ServerConfig,
    catalog: Arc<FakeCatalog>,
) -> Result<Arc<ServerResources>> {
    let database = create_test_database().await?;
    Ok(Arc::new(ServerResources::new(config, database, catalog)?))
}

/// Server resources with a default fake catalog
pub async fn create_test_server_resources() -> Result<(Arc<ServerResources>, Arc<FakeCatalog>)> {
    let catalog = Arc::new(FakeCatalog::with_sample_movies());
    let resources = create_test_server_resources_with(test_config(), catalog.clone()).await?;
    Ok((resources, catalog))
}

/// Create a password user and return it with its session token
pub async fn create_test_user(
    resources: &ServerResources,
    username: &str,
) -> Result<(User, String)> {
    let hash = hash_password(TEST_PASSWORD, 4).await?;
    let user = User::new(username.to_owned(), None, hash);
    resources.database.create_user(&user).await?;
    let token = resources.auth_manager.generate_token(&user)?;
    Ok((user, token))
}

/// Build a list movie with artwork
pub fn sample_movie(
    id: u64,
    title: &str,
    release_date: &str,
    genres: &[u64],
    popularity: f64,
) -> MovieSummary {
    serde_json::from_value(json!({
        "id": id,
        "title": title,
        "poster_path": format!("/poster-{id}.jpg"),
        "backdrop_path": format!("/backdrop-{id}.jpg"),
        "genre_ids": genres,
        "release_date": release_date,
        "popularity": popularity,
        "vote_average": 7.0,
    }))
    .unwrap()
}

/// Build a list movie without a backdrop
pub fn movie_without_artwork(id: u64, title: &str) -> MovieSummary {
    let mut movie = sample_movie(id, title, "2000-01-01", &[], 1.0);
    movie.backdrop_path = None;
    movie
}

/// In-memory movie catalog with call recording
#[derive(Default)]
pub struct FakeCatalog {
    pub trending: Vec<MovieSummary>,
    pub search_results: Vec<MovieSummary>,
    pub discover_page: Option<MoviePage>,
    pub details: HashMap<u64, Value>,
    pub failing_ids: HashSet<u64>,
    pub genres: Vec<Genre>,
    pub detail_calls: AtomicUsize,
    pub details_in_flight: AtomicUsize,
    pub max_details_in_flight: AtomicUsize,
    pub last_search: Mutex<Option<(String, u32)>>,
    pub last_discover: Mutex<Option<DiscoverQuery>>,
    pub last_append: Mutex<Vec<String>>,
}

impl FakeCatalog {
    /// Catalog with a small fixed set of movies
    pub fn with_sample_movies() -> Self {
        let movies = vec![
            sample_movie(550, "Fight Club", "1999-10-15", &[18], 60.0),
            sample_movie(603, "The Matrix", "1999-03-30", &[28, 878], 80.0),
            sample_movie(155, "The Dark Knight", "2008-07-16", &[28, 80], 90.0),
            movie_without_artwork(999, "Lost Reel"),
        ];

        let details = movies
            .iter()
            .map(|movie| {
                let title = movie.extra.get("title").cloned().unwrap_or(Value::Null);
                (movie.id, json!({ "id": movie.id, "title": title, "runtime": 120 }))
            })
            .collect();

        Self {
            trending: movies.clone(),
            search_results: movies.clone(),
            discover_page: Some(MoviePage {
                page: 1,
                results: movies,
                total_pages: 42,
                total_results: 840,
            }),
            details,
            genres: vec![
                Genre {
                    id: 28,
                    name: "Action".to_owned(),
                },
                Genre {
                    id: 18,
                    name: "Drama".to_owned(),
                },
            ],
            ..Self::default()
        }
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MovieCatalog for FakeCatalog {
    async fn trending(&self) -> AppResult<Vec<MovieSummary>> {
        Ok(self.trending.clone())
    }

    async fn search(&self, query: &str, page: u32) -> AppResult<MoviePage> {
        *self.last_search.lock().unwrap() = Some((query.to_owned(), page));
        Ok(MoviePage {
            page,
            results: self.search_results.clone(),
            total_pages: 7,
            total_results: 130,
        })
    }

    async fn discover(&self, query: &DiscoverQuery) -> AppResult<MoviePage> {
        *self.last_discover.lock().unwrap() = Some(query.clone());
        self.discover_page
            .clone()
            .ok_or_else(|| AppError::external_service("TMDB API", "HTTP 500 Internal Server Error"))
    }

    async fn movie_details(&self, movie_id: u64, append: &[&str]) -> AppResult<Value> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_append.lock().unwrap() = append.iter().map(|s| (*s).to_owned()).collect();

        let in_flight = self.details_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_details_in_flight.fetch_max(in_flight, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.details_in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_ids.contains(&movie_id) {
            return Err(AppError::external_service("TMDB API", "HTTP 503 Service Unavailable"));
        }
        self.details
            .get(&movie_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(messages::MOVIE_NOT_FOUND))
    }

    async fn genres(&self) -> AppResult<Vec<Genre>> {
        Ok(self.genres.clone())
    }
}

/// Ids of a JSON array of movie objects
pub fn movie_ids(movies: &Value) -> Vec<u64> {
    movies
        .as_array()
        .expect("expected an array")
        .iter()
        .map(|movie| movie["id"].as_u64().expect("movie without id"))
        .collect()
}

/// Random unused id, for tokens naming users that do not exist
pub fn unknown_user_id() -> Uuid {
    Uuid::new_v4()
}
