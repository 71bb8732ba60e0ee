//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Root configuration for the search proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Inbound request limits.
    pub limits: LimitsConfig,

    /// Upstream search API settings.
    pub upstream: UpstreamConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    /// Applies both to inbound requests and the outbound upstream call.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Inbound request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 64 * 1024,
        }
    }
}

/// HTTP verb used for the outbound search call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UpstreamMethod {
    #[default]
    Get,
    Post,
}

impl From<UpstreamMethod> for reqwest::Method {
    fn from(method: UpstreamMethod) -> Self {
        match method {
            UpstreamMethod::Get => reqwest::Method::GET,
            UpstreamMethod::Post => reqwest::Method::POST,
        }
    }
}

/// A static query parameter value.
///
/// TOML gives us typed scalars; they are rendered back to text when the
/// upstream URL is built.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum QueryValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Bool(b) => write!(f, "{}", b),
            QueryValue::Integer(i) => write!(f, "{}", i),
            QueryValue::Float(v) => write!(f, "{}", v),
            QueryValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(s: &str) -> Self {
        QueryValue::Text(s.to_string())
    }
}

impl From<bool> for QueryValue {
    fn from(b: bool) -> Self {
        QueryValue::Bool(b)
    }
}

/// Upstream search API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Scheme and host of the search gateway, without a trailing path.
    pub base_url: String,

    /// Path of the seller search endpoint.
    pub sellers_endpoint: String,

    /// Path of the product (items) search endpoint.
    pub items_endpoint: String,

    /// Initial bearer token. Refreshed at runtime from response headers.
    pub auth_token: String,

    /// Initial guest id sent with product searches.
    pub guest_id: String,

    /// Outbound HTTP verb.
    pub method: UpstreamMethod,

    /// Honor HTTP(S)_PROXY environment variables for outbound calls.
    pub use_env_proxy: bool,

    /// Static query parameters appended to every search.
    pub query_params: BTreeMap<String, QueryValue>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        let query_params = BTreeMap::from([
            ("is_personal_courier".to_string(), QueryValue::from(false)),
            ("is_wholesale".to_string(), QueryValue::from(false)),
            ("limit".to_string(), QueryValue::Integer(20)),
            ("max_price".to_string(), QueryValue::Integer(10_000_000_000)),
            ("min_price".to_string(), QueryValue::Integer(1)),
            ("order_by".to_string(), QueryValue::from("match")),
            ("page".to_string(), QueryValue::Integer(1)),
        ]);

        Self {
            base_url: "https://apigw.ralali.com".to_string(),
            sellers_endpoint: "/search/v3/sellers".to_string(),
            items_endpoint: "/search/v3/items".to_string(),
            auth_token: String::new(),
            guest_id: String::new(),
            method: UpstreamMethod::Get,
            use_env_proxy: true,
            query_params,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
