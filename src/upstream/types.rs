//! Upstream-facing types and error definitions.

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Which upstream search a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Seller,
    Product,
}

impl EntityKind {
    /// Singular noun used in user-facing messages.
    pub fn noun(self) -> &'static str {
        match self {
            EntityKind::Seller => "seller",
            EntityKind::Product => "product",
        }
    }

    /// Label used for logs and metrics, named after the upstream endpoint.
    pub fn endpoint_label(self) -> &'static str {
        match self {
            EntityKind::Seller => "sellers",
            EntityKind::Product => "items",
        }
    }

    /// The items endpoint identifies the caller by guest id as well as token.
    pub fn sends_guest_id(self) -> bool {
        matches!(self, EntityKind::Product)
    }
}

/// Errors raised while talking to the upstream API.
///
/// These never reach a client as-is; they are folded into an [`ErrorDocument`].
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Configured base URL and endpoint do not form a valid URL.
    #[error("invalid upstream URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The call did not complete within the configured timeout.
    #[error("upstream request timed out: {0}")]
    Timeout(reqwest::Error),

    /// Connection, TLS or body read failure.
    #[error("upstream request failed: {0}")]
    Transport(reqwest::Error),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout(err)
        } else {
            UpstreamError::Transport(err)
        }
    }
}

/// Uniform error body returned whenever the upstream result is not passed
/// through verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDocument {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ErrorDocument {
    pub fn new(status: u16, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            status,
            error: error.into(),
            message: message.into(),
            details: None,
            original_status: None,
            path: None,
            data: None,
        }
    }

    /// `404 Not Found` for a search that matched nothing.
    pub fn not_found(kind: EntityKind, keyword: &str) -> Self {
        Self::new(404, "Not Found", not_found_message(kind, keyword))
    }

    /// `400 Bad Request` for an inbound request the proxy cannot forward.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, "Bad Request", message)
    }

    /// `500 Internal Server Error` for failures inside the proxy itself.
    pub fn internal() -> Self {
        Self::new(500, "Internal Server Error", "An unexpected error occurred")
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_original_status(mut self, status: u16) -> Self {
        self.original_status = Some(status);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_data(mut self, data: Option<Value>) -> Self {
        self.data = data;
        self
    }

    /// HTTP status to answer with. Falls back to 500 for codes outside the
    /// HTTP range.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

pub fn not_found_message(kind: EntityKind, keyword: &str) -> String {
    format!("No {} found matching '{}'", kind.noun(), keyword)
}

/// Outcome of a proxied search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchResponse {
    /// Upstream JSON, unchanged.
    Passthrough(Value),
    /// Synthesized or remapped error.
    Error(ErrorDocument),
}

impl SearchResponse {
    /// Status for the inbound response.
    ///
    /// Passthrough bodies honor a top-level numeric `status` when it is an
    /// HTTP code that can carry the body; anything else is a plain 200.
    pub fn status_code(&self) -> StatusCode {
        match self {
            SearchResponse::Passthrough(body) => body
                .get("status")
                .and_then(Value::as_u64)
                .and_then(|s| u16::try_from(s).ok())
                .and_then(|s| StatusCode::from_u16(s).ok())
                .filter(|s| carries_body(*s))
                .unwrap_or(StatusCode::OK),
            SearchResponse::Error(doc) => doc.status_code(),
        }
    }
}

/// 1xx, 204, 205 and 304 responses are sent without a body.
fn carries_body(status: StatusCode) -> bool {
    (200..600).contains(&status.as_u16())
        && status != StatusCode::NO_CONTENT
        && status != StatusCode::RESET_CONTENT
        && status != StatusCode::NOT_MODIFIED
}
