// ABOUTME: Public movie route handlers proxying TMDb trending, search, genres and details
// ABOUTME: Keeps the TMDb API key server-side and shapes search results for the front-end
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::constants::tmdb::DETAIL_APPENDS;
use crate::errors::AppError;
use crate::models::Genre;
use crate::resources::ServerResources;
use crate::services::SearchParams;
use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Response for `GET /api/movies/genres`
#[derive(Debug, Serialize, Deserialize)]
pub struct GenreListResponse {
    /// TMDb movie genres
    pub genres: Vec<Genre>,
}

/// Movie routes
pub struct MovieRoutes;

impl MovieRoutes {
    /// Create all movie routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/movies/trending", get(Self::handle_trending))
            .route("/api/movies/search", get(Self::handle_search))
            .route("/api/movies/genres", get(Self::handle_genres))
            .route("/api/movies/:id", get(Self::handle_details))
            .with_state(resources)
    }

    /// Handle GET /api/movies/trending
    async fn handle_trending(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let movies = resources.movie_search.trending().await?;
        Ok((StatusCode::OK, Json(movies)).into_response())
    }

    /// Handle GET /api/movies/search
    async fn handle_search(
        State(resources): State<Arc<ServerResources>>,
        params: Result<Query<SearchParams>, QueryRejection>,
    ) -> Result<Response, AppError> {
        let Query(params) = params?;
        let response = resources.movie_search.search(&params).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/movies/genres
    async fn handle_genres(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let genres = resources.catalog.genres().await?;
        Ok((StatusCode::OK, Json(GenreListResponse { genres })).into_response())
    }

    /// Handle GET /api/movies/:id
    async fn handle_details(
        State(resources): State<Arc<ServerResources>>,
        movie_id: Result<Path<u64>, PathRejection>,
    ) -> Result<Response, AppError> {
        let Path(movie_id) =
            movie_id.map_err(|_| AppError::invalid_input("Movie id must be a positive integer"))?;
        let movie = resources
            .catalog
            .movie_details(movie_id, &DETAIL_APPENDS)
            .await?;
        Ok((StatusCode::OK, Json(movie)).into_response())
    }
}
