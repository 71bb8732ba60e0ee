//! Inbound request types and request-id plumbing.
//!
//! Request ids come from `tower-http`: a UUID is generated when the client
//! sends none, the id is echoed on the response, and every log line inside
//! the request span carries it.

use axum::{body::Body, http::HeaderMap, http::Request};
use serde::{Deserialize, Serialize};
use tracing::Span;

/// Request-id header name.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Body of `POST /search/v3/sellers` and `POST /search/v3/items`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub keyword: String,
}

impl SearchRequest {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
        }
    }
}

/// The keyword if it has any non-whitespace content.
pub fn non_blank(keyword: &str) -> Option<&str> {
    if keyword.trim().is_empty() {
        None
    } else {
        Some(keyword)
    }
}

/// Request id from headers, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Span for `TraceLayer`, tagged with the request id.
pub fn make_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        request_id = %request_id(request.headers()),
        method = %request.method(),
        path = %request.uri().path(),
    )
}
