// ABOUTME: HTTP route modules for the movie explorer API
// ABOUTME: Groups authentication, movie, favorites and health endpoints
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

/// Registration, login, validation and Google sign-in
pub mod auth;
/// Per-user favorites
pub mod favorites;
/// Liveness and readiness
pub mod health;
/// TMDb proxy endpoints
pub mod movies;

pub use auth::{AuthRoutes, AuthService};
pub use favorites::FavoritesRoutes;
pub use health::HealthRoutes;
pub use movies::MovieRoutes;
