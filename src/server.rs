// ABOUTME: HTTP server composition and lifecycle for the movie explorer API
// ABOUTME: Merges route groups, applies CORS and tracing layers, and serves until a shutdown signal
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::config::ServerConfig;
use crate::database::Database;
use crate::errors::AppError;
use crate::middleware::{setup_cors, with_request_tracing};
use crate::resources::ServerResources;
use crate::routes::{AuthRoutes, FavoritesRoutes, HealthRoutes, MovieRoutes};
use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

/// Build the application router with all routes and middleware layers
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let cors = setup_cors(&resources.config);

    let router = Router::new()
        .merge(HealthRoutes::routes(resources.clone()))
        .merge(AuthRoutes::routes(resources.clone()))
        .merge(MovieRoutes::routes(resources.clone()))
        .merge(FavoritesRoutes::routes(resources))
        .fallback(handle_not_found);

    with_request_tracing(router).layer(cors)
}

async fn handle_not_found() -> AppError {
    AppError::not_found("Route not found")
}

/// Open the database, build resources and serve HTTP until shutdown
///
/// # Errors
///
/// Returns an error if the database cannot be opened or migrated, resources
/// cannot be created, or the listener cannot bind
pub async fn run(config: ServerConfig) -> Result<()> {
    let database = Database::new(&config.database.url)
        .await
        .context("Failed to open database")?;

    let address = config.bind_address();
    let resources = Arc::new(ServerResources::with_tmdb(config, database)?);
    let app = build_router(resources);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("HTTP server listening on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server shut down");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
