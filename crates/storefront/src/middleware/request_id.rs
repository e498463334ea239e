//! Request ID middleware for request tracing and correlation.
//!
//! Reuses an upstream `x-request-id` or generates a UUID v4. The ID is
//! written back onto the request so the trace span created further in can
//! pick it up, tagged on the Sentry scope, and echoed in the response.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Read the request ID a request carries, if any.
#[must_use]
pub fn request_id_of<B>(request: &axum::http::Request<B>) -> Option<&str> {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|s| !s.is_empty())
}

/// Middleware that ensures every request has a unique request ID.
///
/// Must sit outside the `TraceLayer` for the ID to appear in request spans.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request_id_of(&request)
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    let header_value = HeaderValue::from_str(&request_id).ok();
    if let Some(value) = &header_value {
        request.headers_mut().insert(REQUEST_ID_HEADER, value.clone());
    }

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Some(value) = header_value {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
