// ABOUTME: External API client modules (TMDb movie metadata)
// ABOUTME: Exposes the movie catalog trait and its TMDb implementation
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! External API Clients
//!
//! This module contains clients for external APIs used by the movie explorer server.

pub mod catalog;
pub mod tmdb_client;

// Re-export commonly used types
pub use catalog::{DiscoverQuery, MovieCatalog};
pub use tmdb_client::{TmdbClient, TmdbClientConfig};
