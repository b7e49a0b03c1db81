//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (global token bucket)
//!     → limits.rs (declared body size)
//!     → xss.rs (query values against blocklist.rs)
//!         → decoder.rs (embedded base64 data URIs)
//!     → Pass to handler
//! ```
//!
//! # Design Decisions
//! - Cheap global checks run before payload scanning
//! - Fail closed: reject on any security check failure
//! - No trust in client input

pub mod blocklist;
pub mod decoder;
pub mod limits;
pub mod rate_limit;
pub mod xss;

pub use decoder::DecodeError;
pub use rate_limit::RateLimiter;
pub use xss::XssDetector;
