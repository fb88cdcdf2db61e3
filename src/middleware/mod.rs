// ABOUTME: HTTP middleware for request tracing, authentication and CORS
// ABOUTME: Provides request ID generation, bearer token checks and cross-origin configuration

/// Bearer token authentication
pub mod auth;
/// Cross-origin resource sharing
pub mod cors;
/// Request ids and HTTP spans
pub mod tracing;

pub use auth::{AuthMiddleware, AuthResult};
pub use cors::setup_cors;
pub use self::tracing::{create_request_span, with_request_tracing, REQUEST_ID_HEADER};
