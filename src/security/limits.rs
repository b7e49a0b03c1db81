//! Request size limits.
//!
//! # Responsibilities
//! - Read the declared request body size
//! - Compare it to the configured maximum
//!
//! # Design Decisions
//! - Limits checked before any body is read (early rejection)
//! - A missing or malformed `Content-Length` counts as zero
//! - Return 413 Payload Too Large

use axum::http::{header, HeaderMap};

/// Declared body size from the `Content-Length` header.
pub fn declared_length(headers: &HeaderMap) -> u64 {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

/// Whether a declared size is above the allowed maximum.
pub fn exceeds_limit(declared: u64, max_bytes: u64) -> bool {
    declared > max_bytes
}
