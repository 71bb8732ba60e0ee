//! Turning search outcomes into HTTP responses.
//!
//! Every response the proxy produces itself is a JSON [`ErrorDocument`];
//! passthrough bodies are sent as the upstream returned them.

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::upstream::{ErrorDocument, SearchResponse};

impl IntoResponse for SearchResponse {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            SearchResponse::Passthrough(body) => (status, Json(body)).into_response(),
            SearchResponse::Error(doc) => (status, Json(doc)).into_response(),
        }
    }
}

impl IntoResponse for ErrorDocument {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

/// Error document for a request axum could not extract: an undecodable body
/// or keyword path segment.
pub fn rejection_document(status: StatusCode, text: String, path: &str) -> ErrorDocument {
    ErrorDocument::new(
        status.as_u16(),
        status.canonical_reason().unwrap_or("Bad Request"),
        text,
    )
    .with_path(path)
}

/// Handler for `CatchPanicLayer`: a panic still yields a JSON 500.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = %detail, "Unhandled exception occurred");

    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorDocument::internal())).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_document_sets_status() {
        let response = ErrorDocument::new(403, "Forbidden", "no").into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn passthrough_is_ok() {
        let response = SearchResponse::Passthrough(json!({"data": []})).into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn rejection_uses_canonical_reason() {
        let doc = rejection_document(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Expected request with `Content-Type: application/json`".to_string(),
            "/search/v3/items",
        );
        assert_eq!(doc.status, 415);
        assert_eq!(doc.error, "Unsupported Media Type");
        assert_eq!(doc.path.as_deref(), Some("/search/v3/items"));
    }

    #[test]
    fn panic_becomes_internal_error() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
