// ABOUTME: System-wide constants and default configuration values for the movie explorer server
// ABOUTME: Groups ports, auth limits, upstream endpoints and shared messages by concern
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Constants Module
//!
//! Hardcoded defaults. Anything operators may want to change is read through
//! [`crate::config::environment::ServerConfig`], which falls back to these values.

/// Network defaults
pub mod ports {
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 5001;
    /// Default bind address
    pub const DEFAULT_HOST: &str = "0.0.0.0";
}

/// Service identity used in logs and health responses
pub mod service_names {
    /// Service name
    pub const MOVIE_EXPLORER_SERVER: &str = "movie-explorer-server";
    /// Name used in upstream error messages for TMDb
    pub const TMDB_API: &str = "TMDB API";
    /// Name used in upstream error messages for Google
    pub const GOOGLE_OAUTH: &str = "Google OAuth";
}

/// Authentication defaults
pub mod auth {
    /// Session token lifetime in hours
    pub const DEFAULT_JWT_EXPIRY_HOURS: i64 = 1;
    /// Longest accepted session token lifetime (one year)
    pub const MAX_JWT_EXPIRY_HOURS: i64 = 8760;
    /// bcrypt work factor for new password hashes
    pub const DEFAULT_BCRYPT_COST: u32 = 10;
    /// Lowest work factor bcrypt accepts
    pub const MIN_BCRYPT_COST: u32 = 4;
    /// Highest work factor bcrypt accepts
    pub const MAX_BCRYPT_COST: u32 = 31;
    /// Minimum accepted password length
    pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 6;
    /// Size in bytes of generated signing secrets
    pub const JWT_SECRET_LENGTH: usize = 64;
    /// Prefix of the Authorization header value
    pub const BEARER_PREFIX: &str = "Bearer ";
    /// Longest username accepted at registration
    pub const MAX_USERNAME_LENGTH: usize = 64;
}

/// Upstream endpoints
pub mod endpoints {
    /// TMDb v3 API root
    pub const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
    /// Google's JWKS endpoint for ID token signing keys
    pub const GOOGLE_CERTS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
    /// Issuers Google uses in ID tokens
    pub const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];
}

/// Timeouts and cache lifetimes in seconds
pub mod timeouts {
    /// TMDb request timeout
    pub const TMDB_REQUEST_TIMEOUT_SECS: u64 = 15;
    /// Google JWKS request timeout
    pub const GOOGLE_CERTS_TIMEOUT_SECS: u64 = 10;
    /// Default signing-key cache lifetime
    pub const GOOGLE_KEY_CACHE_TTL_SECS: u64 = 3600;
    /// Lower bound on the signing-key cache lifetime
    pub const GOOGLE_KEY_CACHE_MIN_TTL_SECS: u64 = 300;
    /// Connect timeout for outbound HTTP
    pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 5;
}

/// TMDb query defaults
pub mod tmdb {
    /// Sort used when browsing without a query
    pub const DEFAULT_DISCOVER_SORT: &str = "popularity.desc";
    /// Sub-resources appended to movie details
    pub const DETAIL_APPENDS: [&str; 2] = ["credits", "videos"];
    /// Movie detail requests in flight while hydrating a favorites list
    pub const FAVORITES_FETCH_CONCURRENCY: usize = 8;
}

/// Messages returned to clients
pub mod messages {
    /// Register without username or password
    pub const CREDENTIALS_REQUIRED: &str = "Username and password are required";
    /// Login failure
    pub const INVALID_CREDENTIALS: &str = "Invalid username or password";
    /// Duplicate username
    pub const USERNAME_TAKEN: &str = "Username already exists";
    /// Duplicate email
    pub const EMAIL_TAKEN: &str = "Email already registered";
    /// No Authorization header
    pub const NO_TOKEN: &str = "No token provided";
    /// Token rejected
    pub const INVALID_TOKEN: &str = "Invalid token";
    /// Favorite without an id
    pub const MOVIE_ID_REQUIRED: &str = "Movie ID is required";
    /// Account vanished between token issue and use
    pub const USER_NOT_FOUND: &str = "User not found";
    /// Upstream 404
    pub const MOVIE_NOT_FOUND: &str = "Movie not found";
    /// Google sign-in attempted without a client id
    pub const GOOGLE_NOT_CONFIGURED: &str = "Google sign-in is not configured";
}
