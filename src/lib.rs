//! Inline HTTP request guard.
//!
//! Rejects requests that are too frequent, too large, or that carry an XSS
//! payload in a query parameter, and archives detected attacks without
//! blocking the request path.

pub mod audit;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::GuardConfig;
pub use http::{HttpServer, RequestGuard};
pub use lifecycle::Shutdown;
