// ABOUTME: User account database operations
// ABOUTME: Handles registration, lookups by username, email or Google id, and uniqueness checks

use super::Database;
use crate::constants::messages;
use crate::errors::{AppError, AppResult};
use crate::models::User;
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

/// Column a user can be looked up by
#[derive(Debug, Clone, Copy)]
enum UserLookup {
    Id,
    Username,
    Email,
    GoogleId,
}

impl UserLookup {
    const fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Username => "username",
            Self::Email => "email",
            Self::GoogleId => "google_id",
        }
    }
}

impl Database {
    /// Create the users table
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_users(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                email TEXT UNIQUE,
                password_hash TEXT,
                google_id TEXT UNIQUE,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert a new user
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` if the username, email or Google id is
    /// taken, or a database error otherwise
    pub async fn create_user(&self, user: &User) -> AppResult<Uuid> {
        let result = sqlx::query(
            r"
            INSERT INTO users (id, username, email, password_hash, google_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.google_id)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(user.id),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                let message = db_err.message();
                if message.contains("users.username") {
                    Err(AppError::already_exists(messages::USERNAME_TAKEN))
                } else if message.contains("users.email") {
                    Err(AppError::already_exists(messages::EMAIL_TAKEN))
                } else {
                    Err(AppError::already_exists("Account already exists"))
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Get a user by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt
    pub async fn get_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        self.get_user_impl(UserLookup::Id, &user_id.to_string())
            .await
    }

    /// Get a user by exact username
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt
    pub async fn get_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.get_user_impl(UserLookup::Username, username).await
    }

    /// Get a user by email
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt
    pub async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.get_user_impl(UserLookup::Email, email).await
    }

    /// Get a user by Google subject id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt
    pub async fn get_user_by_google_id(&self, google_id: &str) -> AppResult<Option<User>> {
        self.get_user_impl(UserLookup::GoogleId, google_id).await
    }

    /// Whether a username is taken
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn username_exists(&self, username: &str) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = $1")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn get_user_impl(&self, lookup: UserLookup, value: &str) -> AppResult<Option<User>> {
        let query = format!(
            r"
            SELECT id, username, email, password_hash, google_id, created_at, updated_at
            FROM users WHERE {} = $1
            ",
            lookup.column()
        );

        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    /// Convert a database row to a User struct
    fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> AppResult<User> {
        let id: String = row.try_get("id")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        let updated_at: DateTime<Utc> = row.try_get("updated_at")?;

        Ok(User {
            id: Uuid::parse_str(&id)
                .map_err(|e| AppError::database(format!("Corrupt user id {id}: {e}")))?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            google_id: row.try_get("google_id")?,
            created_at,
            updated_at,
        })
    }
}
