//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tracing, request ID, timeout)
//!     → guard.rs (rate limit, size cap, XSS scan)
//!     → application handler
//! ```

pub mod guard;
pub mod server;

pub use guard::{guard_middleware, RequestGuard, RequestInfo, Verdict};
pub use server::{default_handler, HttpServer};
