//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, panic capture, timeout, body limit)
//! - Bind server to listener
//! - Hold the upstream client shared by every request

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::http::{handlers, request, response};
use crate::lifecycle::{shutdown::triggered, shutdown_signal};
use crate::upstream::{CredentialStore, UpstreamClient, UpstreamError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: UpstreamClient,
}

/// HTTP server for the search proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    upstream: UpstreamClient,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, UpstreamError> {
        let upstream = UpstreamClient::new(config.upstream.clone(), &config.timeouts)?;
        let state = AppState {
            upstream: upstream.clone(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            upstream,
        })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The inbound timeout outlasts the upstream one so a slow upstream
    /// surfaces as a 504 document rather than a bare timeout.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let inbound_timeout =
            Duration::from_secs(config.timeouts.request_secs + config.timeouts.connect_secs);

        Router::new()
            .route("/health", get(handlers::health))
            .route("/search/v3/sellers", post(handlers::search_sellers))
            .route("/search/v3/sellers/{keyword}", post(handlers::search_sellers_by_path))
            .route("/search/v3/items", post(handlers::search_products))
            .route("/search/v3/items/{keyword}", post(handlers::search_products_by_path))
            .fallback(handlers::not_found)
            .method_not_allowed_fallback(handlers::method_not_allowed)
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.limits.max_body_bytes))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(request::make_span))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(CatchPanicLayer::custom(response::panic_response))
                    .layer(TimeoutLayer::new(inbound_timeout)),
            )
    }

    /// Credentials currently used for upstream calls.
    pub fn credentials(&self) -> Arc<CredentialStore> {
        self.upstream.credentials().clone()
    }

    /// Run the server until Ctrl+C/SIGTERM or `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown_signal() => {},
                    _ = triggered(shutdown) => {},
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
