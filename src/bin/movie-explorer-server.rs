// ABOUTME: Server binary for the movie explorer backend
// ABOUTME: Loads configuration, initializes logging and serves the HTTP API
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Movie Explorer Server Binary
//!
//! Configuration comes from the environment (and `.env`); flags override it.

use anyhow::Result;
use clap::Parser;
use movie_explorer_server::{
    config::{DatabaseUrl, ServerConfig},
    logging, server,
};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "movie-explorer-server")]
#[command(about = "Movie explorer backend - TMDb proxy with accounts and favorites")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL, e.g. `sqlite:./data/movies.db` or `sqlite::memory:`
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url {
        config.database.url = DatabaseUrl::parse_url(&database_url)?;
    }

    logging::init_from_env()?;
    info!("Starting movie explorer server");
    info!("{}", config.summary());

    if let Err(e) = server::run(config).await {
        error!("Server error: {e:#}");
        return Err(e);
    }

    Ok(())
}
