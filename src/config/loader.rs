//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `upstream.auth_token`.
pub const ENV_AUTH_TOKEN: &str = "RALALI_AUTH_TOKEN";
/// Environment variable overriding `upstream.guest_id`.
pub const ENV_GUEST_ID: &str = "RALALI_GUEST_ID";
/// Environment variable overriding `upstream.base_url`.
pub const ENV_BASE_URL: &str = "RALALI_BASE_URL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from an in-memory TOML document.
pub fn parse_config(content: &str) -> Result<ProxyConfig, ConfigError> {
    let config: ProxyConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply environment overrides on top of a loaded configuration.
///
/// Secrets usually come from the environment rather than the checked-in file.
/// Empty variables are ignored.
pub fn apply_env_overrides(config: &mut ProxyConfig) {
    apply_overrides_from(config, |key| std::env::var(key).ok());
}

fn apply_overrides_from<F>(config: &mut ProxyConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(token) = non_empty(ENV_AUTH_TOKEN) {
        tracing::debug!("Auth token taken from {}", ENV_AUTH_TOKEN);
        config.upstream.auth_token = token;
    }
    if let Some(guest_id) = non_empty(ENV_GUEST_ID) {
        config.upstream.guest_id = guest_id;
    }
    if let Some(base_url) = non_empty(ENV_BASE_URL) {
        config.upstream.base_url = base_url;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{LogFormat, UpstreamMethod};

    #[test]
    fn empty_document_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.timeouts.request_secs, 30);
    }

    #[test]
    fn parses_full_document() {
        let config = parse_config(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [upstream]
            base_url = "http://localhost:4000"
            auth_token = "eyJhbGciOi"
            guest_id = "defd5756-0b0c-4271-a6c6-9f5dfb4d1d86"
            method = "post"

            [upstream.query_params]
            page = 2

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.upstream.base_url, "http://localhost:4000");
        assert_eq!(config.upstream.method, UpstreamMethod::Post);
        assert_eq!(config.upstream.guest_id, "defd5756-0b0c-4271-a6c6-9f5dfb4d1d86");
        assert_eq!(config.upstream.query_params.len(), 1);
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }

    #[test]
    fn sample_config_file_loads() {
        let path = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/config/proxy.toml"));
        let config = load_config(path).unwrap();
        assert_eq!(config.upstream.query_params.len(), 7);
        assert!(config.upstream.query_params.contains_key("order-by"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/proxy.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = parse_config("[upstream\nbase_url = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn reports_validation_failures() {
        let err = parse_config(
            r#"
            [upstream]
            base_url = "not a url"
            items_endpoint = "search/v3/items"
            "#,
        )
        .unwrap_err();

        match err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn env_overrides_replace_credentials() {
        let mut config = ProxyConfig::default();
        apply_overrides_from(&mut config, |key| match key {
            ENV_AUTH_TOKEN => Some("from-env".to_string()),
            ENV_GUEST_ID => Some("   ".to_string()),
            _ => None,
        });

        assert_eq!(config.upstream.auth_token, "from-env");
        assert_eq!(config.upstream.guest_id, "");
        assert_eq!(config.upstream.base_url, "https://apigw.ralali.com");
    }
}
