// ABOUTME: Favorite movie database operations
// ABOUTME: Stores per-user TMDb movie ids in insertion order without duplicates

use super::Database;
use crate::errors::{AppError, AppResult};
use anyhow::Result;
use chrono::Utc;
use uuid::Uuid;

impl Database {
    /// Create the favorites table
    ///
    /// # Errors
    ///
    /// Returns an error if table creation fails
    pub(super) async fn migrate_favorites(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS favorites (
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                movie_id INTEGER NOT NULL,
                added_at TEXT NOT NULL,
                PRIMARY KEY (user_id, movie_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Favorite movie ids for a user, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_favorite_ids(&self, user_id: Uuid) -> AppResult<Vec<u64>> {
        let ids: Vec<i64> =
            sqlx::query_scalar("SELECT movie_id FROM favorites WHERE user_id = $1 ORDER BY rowid")
                .bind(user_id.to_string())
                .fetch_all(&self.pool)
                .await?;

        Ok(ids.into_iter().map(|id| id as u64).collect())
    }

    /// Add a favorite; returns `false` if it was already present
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn add_favorite(&self, user_id: Uuid, movie_id: u64) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO favorites (user_id, movie_id, added_at) VALUES ($1, $2, $3)",
        )
        .bind(user_id.to_string())
        .bind(movie_id_param(movie_id)?)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove one favorite; returns `false` if it was not present
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn remove_favorite(&self, user_id: Uuid, movie_id: u64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND movie_id = $2")
            .bind(user_id.to_string())
            .bind(movie_id_param(movie_id)?)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove every favorite of a user, returning how many were removed
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn clear_favorites(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

/// TMDb ids are positive and well below `i64::MAX`; reject anything else
fn movie_id_param(movie_id: u64) -> AppResult<i64> {
    i64::try_from(movie_id)
        .map_err(|_| AppError::invalid_input(format!("Movie id {movie_id} is out of range")))
}
