// ABOUTME: Core data models for users, sessions and TMDb movie payloads
// ABOUTME: Typed views over the movie fields the server inspects, with the rest kept verbatim
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Data Models
//!
//! Users are stored locally. Movies are owned by TMDb: the server only reads
//! the handful of fields it filters and sorts on and forwards everything else
//! unchanged, so new upstream fields reach the front-end without code changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A registered account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Primary key
    pub id: Uuid,
    /// Unique display and login name
    pub username: String,
    /// Unique email, required for Google accounts
    pub email: Option<String>,
    /// bcrypt hash; absent for Google-only accounts
    pub password_hash: Option<String>,
    /// Google subject identifier
    pub google_id: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a password account
    #[must_use]
    pub fn new(username: String, email: Option<String>, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash: Some(password_hash),
            google_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create an account backed by a Google identity
    #[must_use]
    pub fn new_google(username: String, email: String, google_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            email: Some(email),
            password_hash: None,
            google_id: Some(google_id),
            created_at: now,
            updated_at: now,
        }
    }

    /// Public projection of this user
    #[must_use]
    pub fn info(&self) -> UserInfo {
        UserInfo {
            username: self.username.clone(),
            id: self.id,
        }
    }
}

/// User fields safe to return to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Login name
    pub username: String,
    /// User id
    pub id: Uuid,
}

/// Response to a successful register, login or Google sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokenResponse {
    /// Session token for the `Authorization: Bearer` header
    pub token: String,
    /// The signed-in user
    pub user: UserInfo,
}

/// A movie as listed by TMDb search, discover and trending endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    /// TMDb movie id
    pub id: u64,
    /// Poster image path
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Backdrop image path
    #[serde(default)]
    pub backdrop_path: Option<String>,
    /// Genre ids
    #[serde(default)]
    pub genre_ids: Vec<u64>,
    /// `YYYY-MM-DD`, sometimes empty
    #[serde(default)]
    pub release_date: Option<String>,
    /// TMDb popularity score
    #[serde(default)]
    pub popularity: Option<f64>,
    /// Mean user rating
    #[serde(default)]
    pub vote_average: Option<f64>,
    /// Every other field, forwarded untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MovieSummary {
    /// Both poster and backdrop images are present
    #[must_use]
    pub fn has_artwork(&self) -> bool {
        let present = |path: &Option<String>| path.as_deref().is_some_and(|p| !p.is_empty());
        present(&self.poster_path) && present(&self.backdrop_path)
    }
}

/// One page of TMDb list results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoviePage {
    /// Page number
    #[serde(default = "first_page")]
    pub page: u32,
    /// Movies on this page
    #[serde(default)]
    pub results: Vec<MovieSummary>,
    /// Total pages upstream
    #[serde(default)]
    pub total_pages: u64,
    /// Total results upstream
    #[serde(default)]
    pub total_results: u64,
}

const fn first_page() -> u32 {
    1
}

/// Search response sent to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Filtered movies
    pub results: Vec<MovieSummary>,
    /// Page count
    pub total_pages: u64,
    /// Result count
    pub total_results: u64,
}

/// A TMDb genre
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    /// Genre id
    pub id: u64,
    /// Display name
    pub name: String,
}
