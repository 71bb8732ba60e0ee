//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! Credentials start out in `upstream.auth_token` / `upstream.guest_id` but
//! are owned by the upstream credential store once the server is running;
//! the config itself is never mutated after startup.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_env_overrides, load_config, parse_config, ConfigError};
pub use schema::{
    LimitsConfig, ListenerConfig, LogFormat, ObservabilityConfig, ProxyConfig, QueryValue,
    TimeoutConfig, UpstreamConfig, UpstreamMethod,
};
pub use validation::{validate_config, ValidationError};
