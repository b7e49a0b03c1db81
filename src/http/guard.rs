//! Request guard pipeline.
//!
//! # Responsibilities
//! - Decide, per request, whether to forward or reject
//! - Queue a log entry for every detected XSS attempt
//!
//! # Pipeline
//! ```text
//! rate limit ──✗──▶ 429
//!     │
//! declared size ──✗──▶ 413
//!     │
//! bypass path? ──yes──▶ forward
//!     │
//! GET/HEAD? ──no──▶ forward
//!     │
//! query values ──✗──▶ log + 400
//!     │
//! forward
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use url::form_urlencoded;

use crate::audit::{LogEntry, LogQueue};
use crate::config::GuardConfig;
use crate::observability::metrics;
use crate::security::{limits, RateLimiter, XssDetector};

/// The parts of a request the guard looks at.
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub method: Method,
    pub path: String,
    /// Raw, still-encoded query string.
    pub query: Option<String>,
    pub content_length: u64,
}

impl RequestInfo {
    pub fn from_request(request: &Request<Body>) -> Self {
        Self {
            method: request.method().clone(),
            path: request.uri().path().to_string(),
            query: request.uri().query().map(str::to_string),
            content_length: limits::declared_length(request.headers()),
        }
    }
}

/// Terminal state of the pipeline for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Forward,
    RateLimited,
    PayloadTooLarge,
    XssDetected { param: String },
}

impl Verdict {
    /// Rejection status, or `None` when the request should be forwarded.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Verdict::Forward => None,
            Verdict::RateLimited => Some(StatusCode::TOO_MANY_REQUESTS),
            Verdict::PayloadTooLarge => Some(StatusCode::PAYLOAD_TOO_LARGE),
            Verdict::XssDetected { .. } => Some(StatusCode::BAD_REQUEST),
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            Verdict::Forward => "forward",
            Verdict::RateLimited => "rate_limited",
            Verdict::PayloadTooLarge => "payload_too_large",
            Verdict::XssDetected { .. } => "xss",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            Verdict::Forward => "",
            Verdict::RateLimited => "Too many requests",
            Verdict::PayloadTooLarge => "Request size too large",
            Verdict::XssDetected { .. } => "Potential XSS detected",
        }
    }
}

/// Orchestrates the rate limiter, size cap, and XSS detector.
pub struct RequestGuard {
    limiter: RateLimiter,
    detector: XssDetector,
    queue: LogQueue,
    max_body_bytes: u64,
    bypass_paths: HashSet<String>,
    max_entry_bytes: usize,
}

impl RequestGuard {
    pub fn new(
        limiter: RateLimiter,
        detector: XssDetector,
        queue: LogQueue,
        max_body_bytes: u64,
        bypass_paths: impl IntoIterator<Item = String>,
        max_entry_bytes: usize,
    ) -> Self {
        Self {
            limiter,
            detector,
            queue,
            max_body_bytes,
            bypass_paths: bypass_paths.into_iter().collect(),
            max_entry_bytes,
        }
    }

    /// Build a guard from configuration around an existing log queue.
    pub fn from_config(config: &GuardConfig, queue: LogQueue) -> Self {
        Self::new(
            RateLimiter::from_config(&config.rate_limit),
            XssDetector::from_config(&config.xss),
            queue,
            config.guard.max_body_bytes,
            config.guard.bypass_paths.iter().cloned(),
            config.logging.max_entry_bytes,
        )
    }

    /// Run the pipeline for one request.
    pub fn check(&self, request: &RequestInfo) -> Verdict {
        if !self.limiter.allow() {
            return Verdict::RateLimited;
        }

        if limits::exceeds_limit(request.content_length, self.max_body_bytes) {
            return Verdict::PayloadTooLarge;
        }

        if self.bypass_paths.contains(&request.path) {
            return Verdict::Forward;
        }

        if request.method != Method::GET && request.method != Method::HEAD {
            return Verdict::Forward;
        }

        let Some(query) = request.query.as_deref() else {
            return Verdict::Forward;
        };

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if self.detector.detect(&value) {
                let entry = LogEntry::xss_attempt(&request.path, &key, &value, self.max_entry_bytes);
                // A dropped entry does not change the response.
                self.queue.enqueue(entry);
                return Verdict::XssDetected {
                    param: key.into_owned(),
                };
            }
        }

        Verdict::Forward
    }
}

/// Middleware applying [`RequestGuard`] in front of the inner handler.
pub async fn guard_middleware(
    State(guard): State<Arc<RequestGuard>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    metrics::record_request();
    let info = RequestInfo::from_request(&request);
    let verdict = guard.check(&info);

    match verdict.status() {
        None => next.run(request).await,
        Some(status) => {
            let param = match &verdict {
                Verdict::XssDetected { param } => Some(param.as_str()),
                _ => None,
            };
            tracing::warn!(
                method = %info.method,
                path = %info.path,
                reason = verdict.reason(),
                param = ?param,
                "Request rejected"
            );
            metrics::record_rejection(verdict.reason());
            (status, verdict.message()).into_response()
        }
    }
}
