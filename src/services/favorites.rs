// ABOUTME: Favorites service joining stored movie ids with full TMDb movie records
// ABOUTME: Adds, removes and clears favorites; hydrates lists with bounded concurrency in order
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::constants::{messages, service_names::TMDB_API, tmdb::FAVORITES_FETCH_CONCURRENCY};
use crate::database::Database;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::external::MovieCatalog;
use futures_util::stream::{self, StreamExt, TryStreamExt};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Per-user favorite movies
#[derive(Clone)]
pub struct FavoritesService {
    database: Arc<Database>,
    catalog: Arc<dyn MovieCatalog>,
}

impl FavoritesService {
    /// Create the service
    #[must_use]
    pub fn new(database: Arc<Database>, catalog: Arc<dyn MovieCatalog>) -> Self {
        Self { database, catalog }
    }

    /// Full movie records for a user's favorites, in the order they were added
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown user, or the first upstream
    /// error if any movie lookup fails
    pub async fn list(&self, user_id: Uuid) -> AppResult<Vec<Value>> {
        self.ensure_user(user_id).await?;
        self.hydrate(user_id).await
    }

    /// Add a movie and return the updated list
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown user or a storage/upstream error
    pub async fn add(&self, user_id: Uuid, movie_id: u64) -> AppResult<Vec<Value>> {
        self.ensure_user(user_id).await?;
        let inserted = self.database.add_favorite(user_id, movie_id).await?;
        info!(user.id = %user_id, movie.id = movie_id, inserted, "Favorite added");
        self.hydrate(user_id).await
    }

    /// Remove one movie and return the updated list
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown user or a storage/upstream error
    pub async fn remove(&self, user_id: Uuid, movie_id: u64) -> AppResult<Vec<Value>> {
        self.ensure_user(user_id).await?;
        let removed = self.database.remove_favorite(user_id, movie_id).await?;
        info!(user.id = %user_id, movie.id = movie_id, removed, "Favorite removed");
        self.hydrate(user_id).await
    }

    /// Remove every favorite
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown user or a storage error
    pub async fn clear(&self, user_id: Uuid) -> AppResult<Vec<Value>> {
        self.ensure_user(user_id).await?;
        let removed = self.database.clear_favorites(user_id).await?;
        info!(user.id = %user_id, removed, "Favorites cleared");
        Ok(Vec::new())
    }

    async fn ensure_user(&self, user_id: Uuid) -> AppResult<()> {
        self.database
            .get_user(user_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(messages::USER_NOT_FOUND))
    }

    async fn hydrate(&self, user_id: Uuid) -> AppResult<Vec<Value>> {
        let ids = self.database.list_favorite_ids(user_id).await?;
        debug!(user.id = %user_id, count = ids.len(), "Hydrating favorites");

        // buffered keeps input order and stops at the first error
        stream::iter(ids)
            .map(|movie_id| self.favorite_details(movie_id))
            .buffered(FAVORITES_FETCH_CONCURRENCY)
            .try_collect()
            .await
    }

    /// Details for one stored favorite, reporting a vanished movie as an upstream error
    async fn favorite_details(&self, movie_id: u64) -> AppResult<Value> {
        self.catalog
            .movie_details(movie_id, &[])
            .await
            .map_err(|error| {
                if error.code == ErrorCode::ResourceNotFound {
                    warn!(movie.id = movie_id, "Favorite movie no longer exists upstream");
                    AppError::external_service(
                        TMDB_API,
                        format!("Favorite movie {movie_id} is no longer available"),
                    )
                } else {
                    error
                }
            })
    }
}
