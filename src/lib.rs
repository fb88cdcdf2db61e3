// ABOUTME: Main library entry point for the movie explorer backend
// ABOUTME: Proxies TMDb movie data and stores users, sessions and favorites
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![deny(unsafe_code)]

//! # Movie Explorer Server
//!
//! Backend for a movie browsing single-page application. It keeps the TMDb
//! API key server-side, signs users in with a password or a Google account,
//! and stores each user's favorite movies.
//!
//! ## Features
//!
//! - **TMDb proxy**: trending, search with local genre/year/sort refinement,
//!   discover, genres and movie details
//! - **Accounts**: bcrypt password hashing and HS256 session tokens
//! - **Google sign-in**: ID token verification against Google's published keys
//! - **Favorites**: per-user list hydrated with live TMDb records
//!
//! ## Architecture
//!
//! - **Config**: environment-driven [`config::ServerConfig`]
//! - **Database**: `SQLite` via `sqlx`
//! - **External**: the [`external::MovieCatalog`] trait and its TMDb client
//! - **Services**: search refinement and favorites hydration
//! - **Routes**: axum handlers sharing [`resources::ServerResources`]
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use movie_explorer_server::config::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     movie_explorer_server::logging::init_from_env()?;
//!     movie_explorer_server::server::run(config).await
//! }
//! ```

/// Password hashing and session tokens
pub mod auth;

/// Environment configuration
pub mod config;

/// Application constants
pub mod constants;

/// User and favorites storage
pub mod database;

/// Unified error handling
pub mod errors;

/// Upstream movie metadata clients
pub mod external;

/// Google ID token verification
pub mod google_auth;

/// Structured logging
pub mod logging;

/// HTTP middleware
pub mod middleware;

/// Data models
pub mod models;

/// Shared server resources
pub mod resources;

/// HTTP routes
pub mod routes;

/// Router composition and server lifecycle
pub mod server;

/// Business logic services
pub mod services;

/// Shared helpers
pub mod utils;
