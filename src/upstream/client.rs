//! Outbound client for the upstream search API.
//!
//! # Responsibilities
//! - Build the search URL from config and keyword
//! - Attach bearer token (and guest id for product searches)
//! - Hand response headers to the credential store
//! - Hand the body to normalization

use std::sync::Arc;
use std::time::{Duration, Instant};

use url::Url;

use crate::config::{TimeoutConfig, UpstreamConfig};
use crate::observability::metrics;
use crate::upstream::credentials::{CredentialStore, GUEST_ID_HEADER};
use crate::upstream::normalize::{normalize_response, transport_failure};
use crate::upstream::types::{EntityKind, SearchResponse, UpstreamError};

/// Raw upstream reply, before normalization.
#[derive(Debug)]
pub struct UpstreamReply {
    pub status: reqwest::StatusCode,
    pub body: String,
}

/// Client for the upstream search gateway.
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    config: Arc<UpstreamConfig>,
    credentials: Arc<CredentialStore>,
}

impl UpstreamClient {
    /// Build a client from config. Credentials are seeded from the config and
    /// then live in the returned client's credential store.
    pub fn new(config: UpstreamConfig, timeouts: &TimeoutConfig) -> Result<Self, UpstreamError> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.request_secs))
            .user_agent(concat!("ralali-proxy/", env!("CARGO_PKG_VERSION")));
        if !config.use_env_proxy {
            builder = builder.no_proxy();
        }
        let http = builder.build().map_err(UpstreamError::Transport)?;

        let credentials = Arc::new(CredentialStore::new(
            config.auth_token.clone(),
            config.guest_id.clone(),
        ));

        Ok(Self {
            http,
            config: Arc::new(config),
            credentials,
        })
    }

    /// Shared credential store.
    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    fn endpoint(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::Seller => &self.config.sellers_endpoint,
            EntityKind::Product => &self.config.items_endpoint,
        }
    }

    /// Full search URL: base URL, endpoint, static query params, keyword.
    ///
    /// Dashes in configured parameter names become underscores. The keyword
    /// is always the last parameter.
    pub fn build_url(&self, kind: EntityKind, keyword: &str) -> Result<Url, UpstreamError> {
        let mut url = Url::parse(&format!("{}{}", self.config.base_url, self.endpoint(kind)))?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in &self.config.query_params {
                query.append_pair(&key.replace('-', "_"), &value.to_string());
            }
            query.append_pair("keyword", keyword);
        }
        Ok(url)
    }

    /// Issue the upstream call and return the raw reply.
    ///
    /// Credential headers are inspected on every reply, error statuses
    /// included.
    pub async fn fetch(&self, kind: EntityKind, keyword: &str) -> Result<UpstreamReply, UpstreamError> {
        let url = self.build_url(kind, keyword)?;
        tracing::debug!(url = %url, "Request URL");

        let credentials = self.credentials.snapshot();
        let mut request = self
            .http
            .request(self.config.method.into(), url)
            .bearer_auth(&credentials.auth_token);
        if kind.sends_guest_id() {
            request = request.header(GUEST_ID_HEADER, credentials.guest_id.as_str());
        }

        let response = request.send().await?;
        self.credentials.refresh_from_headers(response.headers());

        let status = response.status();
        let body = response.text().await?;
        Ok(UpstreamReply { status, body })
    }

    /// Search and normalize. Never fails; errors come back as documents.
    pub async fn search(&self, kind: EntityKind, keyword: &str) -> SearchResponse {
        tracing::info!(
            endpoint = kind.endpoint_label(),
            keyword = %keyword,
            "Making {} search request", kind.noun()
        );
        let start = Instant::now();

        let response = match self.fetch(kind, keyword).await {
            Ok(reply) => normalize_response(kind, keyword, reply.status, &reply.body),
            Err(e) => SearchResponse::Error(transport_failure(&e)),
        };

        metrics::record_upstream(kind.endpoint_label(), response.status_code().as_u16(), start);
        response
    }
}
