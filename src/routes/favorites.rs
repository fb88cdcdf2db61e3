// ABOUTME: Favorites route handlers for listing, adding and removing a user's favorite movies
// ABOUTME: All endpoints require a bearer token and answer with the hydrated favorites list
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Favorites routes
//!
//! The stored list only holds TMDb ids; every response re-fetches the full
//! movie records so clients always see current metadata.

use crate::constants::messages;
use crate::errors::AppError;
use crate::middleware::AuthResult;
use crate::resources::ServerResources;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Favorites list response
#[derive(Debug, Serialize, Deserialize)]
pub struct FavoritesResponse {
    /// Full TMDb movie records in the order they were added
    pub favorites: Vec<Value>,
}

/// Favorites routes
pub struct FavoritesRoutes;

impl FavoritesRoutes {
    /// Create all favorites routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/user/favorites",
                get(Self::handle_list)
                    .post(Self::handle_add)
                    .delete(Self::handle_clear),
            )
            .route(
                "/api/user/favorites/:movie_id",
                delete(Self::handle_remove),
            )
            .with_state(resources)
    }

    /// Authenticate the request from its Authorization header
    fn authenticate(
        headers: &HeaderMap,
        resources: &Arc<ServerResources>,
    ) -> Result<AuthResult, AppError> {
        let auth_header = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok());
        resources.auth_middleware.authenticate_request(auth_header)
    }

    fn respond(favorites: Vec<Value>) -> Response {
        (StatusCode::OK, Json(FavoritesResponse { favorites })).into_response()
    }

    /// Handle GET /api/user/favorites
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        let favorites = resources.favorites.list(auth.user_id).await?;
        Ok(Self::respond(favorites))
    }

    /// Handle POST /api/user/favorites
    async fn handle_add(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Result<Json<Value>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        let Json(body) = body?;
        let movie_id = movie_id_from_body(&body)
            .ok_or_else(|| AppError::invalid_input(messages::MOVIE_ID_REQUIRED))?;

        let favorites = resources.favorites.add(auth.user_id, movie_id).await?;
        Ok(Self::respond(favorites))
    }

    /// Handle DELETE /api/user/favorites
    async fn handle_clear(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        let favorites = resources.favorites.clear(auth.user_id).await?;
        Ok(Self::respond(favorites))
    }

    /// Handle DELETE /api/user/favorites/:movie_id
    async fn handle_remove(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        movie_id: Result<Path<u64>, PathRejection>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        let Path(movie_id) =
            movie_id.map_err(|_| AppError::invalid_input("Movie id must be a positive integer"))?;

        let favorites = resources.favorites.remove(auth.user_id, movie_id).await?;
        Ok(Self::respond(favorites))
    }
}

/// Extract `movie.id` from a request body, as a number or numeric string
fn movie_id_from_body(body: &Value) -> Option<u64> {
    match body.get("movie")?.get("id")? {
        Value::Number(id) => id.as_u64(),
        Value::String(id) => id.trim().parse().ok(),
        _ => None,
    }
    .filter(|id| *id > 0)
}
