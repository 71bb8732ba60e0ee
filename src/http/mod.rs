//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, search request body)
//!     → handlers.rs (validate keyword, call upstream)
//!     → response.rs (search outcome → JSON + status)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{SearchRequest, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
