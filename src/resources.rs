// ABOUTME: Shared server resources created once at startup and handed to every route
// ABOUTME: Holds configuration, database, auth managers, the movie catalog and services
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Server Resources
//!
//! All expensive components are created once and shared through `Arc`.
//! Route handlers receive `State<Arc<ServerResources>>`.

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::external::{MovieCatalog, TmdbClient, TmdbClientConfig};
use crate::google_auth::GoogleAuth;
use crate::middleware::AuthMiddleware;
use crate::services::{FavoritesService, MovieSearchService};
use anyhow::Result;
use std::sync::Arc;

/// Centralized resource container for dependency injection
#[derive(Clone)]
pub struct ServerResources {
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// User and favorites storage
    pub database: Arc<Database>,
    /// Session token issuing and validation
    pub auth_manager: Arc<AuthManager>,
    /// Bearer token checks for protected routes
    pub auth_middleware: Arc<AuthMiddleware>,
    /// Google ID token verification
    pub google_auth: Arc<GoogleAuth>,
    /// Upstream movie metadata
    pub catalog: Arc<dyn MovieCatalog>,
    /// Trending, search and discover
    pub movie_search: MovieSearchService,
    /// Per-user favorites
    pub favorites: FavoritesService,
}

impl ServerResources {
    /// Build resources over an existing database and catalog
    ///
    /// # Errors
    ///
    /// Returns an error if no JWT secret is configured in production
    pub fn new(
        config: ServerConfig,
        database: Database,
        catalog: Arc<dyn MovieCatalog>,
    ) -> Result<Self> {
        let jwt_secret = config.resolve_jwt_secret()?;
        let auth_manager = Arc::new(AuthManager::new(
            &jwt_secret,
            config.auth.jwt_expiry_hours,
        ));
        let auth_middleware = Arc::new(AuthMiddleware::new(auth_manager.clone()));
        let google_auth = Arc::new(GoogleAuth::new(config.google.clone()));
        let database = Arc::new(database);

        Ok(Self {
            movie_search: MovieSearchService::new(catalog.clone()),
            favorites: FavoritesService::new(database.clone(), catalog.clone()),
            config: Arc::new(config),
            database,
            auth_manager,
            auth_middleware,
            google_auth,
            catalog,
        })
    }

    /// Build resources with the TMDb client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if no JWT secret is configured in production
    pub fn with_tmdb(config: ServerConfig, database: Database) -> Result<Self> {
        let catalog: Arc<dyn MovieCatalog> =
            Arc::new(TmdbClient::new(TmdbClientConfig::from(&config.tmdb)));
        Self::new(config, database, catalog)
    }
}
