//! Search endpoint handlers.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        OriginalUri, Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::http::request::{non_blank, SearchRequest};
use crate::http::response::rejection_document;
use crate::http::server::AppState;
use crate::upstream::{EntityKind, ErrorDocument};

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

/// `GET /health`
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `POST /search/v3/sellers` with `{"keyword": ...}`
pub async fn search_sellers(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Response {
    search_from_body(&state, EntityKind::Seller, uri.path(), payload).await
}

/// `POST /search/v3/items` with `{"keyword": ...}`
pub async fn search_products(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Response {
    search_from_body(&state, EntityKind::Product, uri.path(), payload).await
}

/// `POST /search/v3/sellers/{keyword}`
pub async fn search_sellers_by_path(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    keyword: Result<Path<String>, PathRejection>,
) -> Response {
    search_from_path(&state, EntityKind::Seller, uri.path(), keyword).await
}

/// `POST /search/v3/items/{keyword}`
pub async fn search_products_by_path(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    keyword: Result<Path<String>, PathRejection>,
) -> Response {
    search_from_path(&state, EntityKind::Product, uri.path(), keyword).await
}

async fn search_from_body(
    state: &AppState,
    kind: EntityKind,
    path: &str,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(request)) => search(state, kind, path, &request.keyword).await,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "Rejected search request body");
            rejection_document(rejection.status(), rejection.body_text(), path).into_response()
        }
    }
}

async fn search_from_path(
    state: &AppState,
    kind: EntityKind,
    path: &str,
    keyword: Result<Path<String>, PathRejection>,
) -> Response {
    match keyword {
        Ok(Path(keyword)) => search(state, kind, path, &keyword).await,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "Rejected search keyword");
            rejection_document(rejection.status(), rejection.body_text(), path).into_response()
        }
    }
}

async fn search(state: &AppState, kind: EntityKind, path: &str, keyword: &str) -> Response {
    let Some(keyword) = non_blank(keyword) else {
        return ErrorDocument::bad_request("keyword must not be empty")
            .with_path(path)
            .into_response();
    };

    state.upstream.search(kind, keyword).await.into_response()
}

/// Fallback for unknown routes.
pub async fn not_found(OriginalUri(uri): OriginalUri) -> ErrorDocument {
    ErrorDocument::new(
        StatusCode::NOT_FOUND.as_u16(),
        "Not Found",
        format!("No route for {}", uri.path()),
    )
    .with_path(uri.path())
}

/// Fallback for known routes hit with the wrong verb.
pub async fn method_not_allowed(OriginalUri(uri): OriginalUri) -> ErrorDocument {
    ErrorDocument::new(
        StatusCode::METHOD_NOT_ALLOWED.as_u16(),
        "Method Not Allowed",
        "This endpoint does not support the requested HTTP method.",
    )
    .with_path(uri.path())
}
