//! Upstream search API subsystem.
//!
//! # Data Flow
//! ```text
//! keyword
//!     → client.rs (build URL, attach credentials, send)
//!     → credentials.rs (pick up refreshed token / guest id from headers)
//!     → normalize.rs (parse body, sentinel check, status remap)
//!     → SearchResponse (passthrough JSON or ErrorDocument)
//! ```

pub mod client;
pub mod credentials;
pub mod normalize;
pub mod types;

pub use client::{UpstreamClient, UpstreamReply};
pub use credentials::{CredentialRefresh, CredentialStore, Credentials};
pub use types::{EntityKind, ErrorDocument, SearchResponse, UpstreamError};
