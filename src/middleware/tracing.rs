// ABOUTME: Request tracing middleware for correlation and structured logging
// ABOUTME: Assigns x-request-id to every request and wraps handling in a span carrying it

use axum::body::Body;
use axum::Router;
use http::{HeaderName, Request};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{info_span, Span};

/// Header carrying the request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Create the span for one HTTP request
pub fn create_request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    info_span!(
        "http_request",
        http.method = %request.method(),
        http.path = %request.uri().path(),
        request_id = %request_id,
    )
}

/// Wrap a router with request-id assignment, propagation and tracing
///
/// An incoming `x-request-id` is kept; otherwise a UUID is generated. The id
/// is echoed on the response.
pub fn with_request_tracing(router: Router) -> Router {
    let header = HeaderName::from_static(REQUEST_ID_HEADER);

    // Layers run outermost-last: the id is set before the trace span reads it
    router
        .layer(TraceLayer::new_for_http().make_span_with(create_request_span))
        .layer(PropagateRequestIdLayer::new(header.clone()))
        .layer(SetRequestIdLayer::new(header, MakeRequestUuid))
}
