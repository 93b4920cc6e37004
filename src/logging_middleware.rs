// src/logging_middleware.rs
//! Middleware for logging JSON request bodies in debug mode

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::debug;

/// Matches the configured JSON body limit; larger bodies are rejected before
/// a handler ever sees them anyway.
const BODY_LOG_LIMIT: usize = 2 * 1024 * 1024;

/// Logs JSON request bodies at debug level.
///
/// Only JSON requests are buffered; binary uploads and the PNG responses
/// served from /uploads pass through untouched.
pub async fn log_request_body(request: Request, next: Next) -> Result<Response, StatusCode> {
    let is_json = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false);

    if !is_json {
        return Ok(next.run(request).await);
    }

    let (parts, body) = request.into_parts();

    let bytes = to_bytes(body, BODY_LOG_LIMIT)
        .await
        .map_err(|_| StatusCode::PAYLOAD_TOO_LARGE)?;

    if !bytes.is_empty() {
        if let Ok(body_str) = std::str::from_utf8(&bytes) {
            debug!(
                method = %parts.method,
                uri = %parts.uri,
                request_body = %body_str,
                "Request"
            );
        }
    }

    // Reconstruct request for the handler
    let request = Request::from_parts(parts, Body::from(bytes));

    Ok(next.run(request).await)
}
