//! Response normalization.
//!
//! # Responsibilities
//! - Parse upstream bodies, synthesizing an error for empty or non-JSON ones
//! - Rewrite the `DATA_NOT_FOUND` sentinel into a 404 document
//! - Map upstream error statuses onto the local error table
//! - Turn transport failures into gateway errors
//!
//! Nothing in here fails: every input produces a [`SearchResponse`].

use reqwest::StatusCode;
use serde_json::Value;

use crate::upstream::types::{
    not_found_message, EntityKind, ErrorDocument, SearchResponse, UpstreamError,
};

/// Value of `data.name` the upstream uses for an empty result set.
pub const NOT_FOUND_SENTINEL: &str = "DATA_NOT_FOUND";

/// Longest body prefix echoed into logs.
const LOG_PREVIEW_CHARS: usize = 200;

/// Normalize a complete upstream response.
pub fn normalize_response(
    kind: EntityKind,
    keyword: &str,
    status: StatusCode,
    body: &str,
) -> SearchResponse {
    if status.is_success() {
        normalize_success(kind, keyword, body)
    } else {
        SearchResponse::Error(map_error_status(kind, keyword, status, body))
    }
}

/// Handle a 2xx body: parse it, then look for the not-found sentinel.
pub fn normalize_success(kind: EntityKind, keyword: &str, body: &str) -> SearchResponse {
    if body.trim().is_empty() {
        tracing::error!(entity = kind.noun(), "Empty response received from API");
        return SearchResponse::Error(ErrorDocument::not_found(kind, keyword));
    }

    let root: Value = match serde_json::from_str(body) {
        Ok(root) => root,
        Err(e) => {
            tracing::error!(
                error = %e,
                body = %preview(body),
                "Invalid JSON response"
            );
            return SearchResponse::Error(ErrorDocument::new(
                500,
                "Invalid JSON",
                "The API returned an invalid JSON response",
            ));
        }
    };

    if is_not_found_sentinel(&root) {
        tracing::info!(entity = kind.noun(), keyword = %keyword, "Detected DATA_NOT_FOUND in nested data object");
        let data = root.get("data").cloned();
        return SearchResponse::Error(ErrorDocument::not_found(kind, keyword).with_data(data));
    }

    SearchResponse::Passthrough(root)
}

/// `true` when `data` is an object whose `name` is the not-found sentinel.
pub fn is_not_found_sentinel(root: &Value) -> bool {
    root.get("data")
        .and_then(Value::as_object)
        .and_then(|data| data.get("name"))
        .and_then(Value::as_str)
        == Some(NOT_FOUND_SENTINEL)
}

/// Map a non-2xx upstream status onto the local error table.
///
/// 404 and 422 both mean "nothing matched" and come back as 404. Every other
/// status is preserved. The upstream code is always kept in `originalStatus`.
pub fn map_error_status(
    kind: EntityKind,
    keyword: &str,
    status: StatusCode,
    body: &str,
) -> ErrorDocument {
    tracing::error!(status = %status, body = %preview(body), "Error response");

    let code = status.as_u16();
    let doc = match code {
        404 | 422 => ErrorDocument::new(404, "Not Found", not_found_message(kind, keyword)),
        401 => ErrorDocument::new(
            code,
            "Unauthorized",
            "Authentication token has expired. Please update your token.",
        ),
        403 => ErrorDocument::new(
            code,
            "Forbidden",
            "Your account does not have permission to access this resource.",
        ),
        405 => ErrorDocument::new(
            code,
            "Method Not Allowed",
            "The API does not support this HTTP method for this endpoint.",
        ),
        c if c >= 500 => ErrorDocument::new(
            code,
            "Server Error",
            "The Ralali server encountered an error. Please try again later.",
        ),
        _ => ErrorDocument::new(code, status.to_string(), "API Request Failed"),
    };

    let doc = match upstream_message(body) {
        Some(details) => doc.with_details(details),
        None => doc,
    };
    doc.with_original_status(code)
}

/// The `message` field of a JSON error body, as text.
///
/// Scalars render as their text (`null` included); objects and arrays have
/// no text form and render empty.
fn upstream_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    let text = match json.get("message")? {
        Value::String(s) => s.clone(),
        Value::Object(_) | Value::Array(_) => String::new(),
        scalar => scalar.to_string(),
    };
    Some(text)
}

/// Error document for a call that never produced a usable response.
pub fn transport_failure(err: &UpstreamError) -> ErrorDocument {
    tracing::error!(error = %err, "Upstream request failed");

    let doc = match err {
        UpstreamError::Timeout(_) => ErrorDocument::new(
            504,
            "Gateway Timeout",
            "The Ralali API did not respond in time.",
        ),
        UpstreamError::Transport(_) => ErrorDocument::new(
            502,
            "Bad Gateway",
            "The Ralali API could not be reached.",
        ),
        UpstreamError::InvalidUrl(_) => ErrorDocument::internal(),
    };
    doc.with_details(err.to_string())
}

fn preview(body: &str) -> String {
    body.chars().take(LOG_PREVIEW_CHARS).collect()
}
