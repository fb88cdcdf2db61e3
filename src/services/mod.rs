// ABOUTME: Domain service layer for business logic extracted from route handlers
// ABOUTME: Provides movie search and favorites services shared by the HTTP routes
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Domain service layer
//!
//! Route handlers parse requests and shape responses; the rules about what a
//! search returns or how favorites are stored live here.

/// Favorites storage and hydration
pub mod favorites;

/// Search, discover and trending with local refinement
pub mod movie_search;

pub use favorites::FavoritesService;
pub use movie_search::{MovieSearchService, SearchParams, SortSpec};
