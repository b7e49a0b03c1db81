//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (capacities > 0, intervals > 0)
//! - Validate addresses and cache keys
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GuardConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::GuardConfig;

/// Upper bound for nested data-URI decoding.
pub const MAX_DECODE_DEPTH_LIMIT: u32 = 8;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    InvalidBindAddress(String),
    #[error("observability.metrics_address `{0}` is not a socket address")]
    InvalidMetricsAddress(String),
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),
    #[error("guard.bypass_paths entry `{0}` must start with '/'")]
    InvalidBypassPath(String),
    #[error("archive.index_key must be non-empty and must not contain ','")]
    InvalidIndexKey,
    #[error("xss.max_decode_depth {depth} exceeds the limit of {limit}")]
    DecodeDepthTooLarge { depth: u32, limit: u32 },
    #[error("xss.patterns must not contain empty entries")]
    EmptyPattern,
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &GuardConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.guard.max_body_bytes == 0 {
        errors.push(ValidationError::NotPositive("guard.max_body_bytes"));
    }
    if config.guard.request_timeout_secs == 0 {
        errors.push(ValidationError::NotPositive("guard.request_timeout_secs"));
    }
    for path in &config.guard.bypass_paths {
        if !path.starts_with('/') {
            errors.push(ValidationError::InvalidBypassPath(path.clone()));
        }
    }

    if config.rate_limit.capacity == 0 {
        errors.push(ValidationError::NotPositive("rate_limit.capacity"));
    }
    let refill = config.rate_limit.refill_per_second;
    if refill.is_nan() || refill <= 0.0 {
        errors.push(ValidationError::NotPositive("rate_limit.refill_per_second"));
    }

    if config.xss.max_decode_depth > MAX_DECODE_DEPTH_LIMIT {
        errors.push(ValidationError::DecodeDepthTooLarge {
            depth: config.xss.max_decode_depth,
            limit: MAX_DECODE_DEPTH_LIMIT,
        });
    }
    if let Some(patterns) = &config.xss.patterns {
        if patterns.iter().any(|p| p.is_empty()) {
            errors.push(ValidationError::EmptyPattern);
        }
    }

    if config.logging.queue_capacity == 0 {
        errors.push(ValidationError::NotPositive("logging.queue_capacity"));
    }
    if config.logging.max_entry_bytes == 0 {
        errors.push(ValidationError::NotPositive("logging.max_entry_bytes"));
    }

    if config.archive.interval_secs == 0 {
        errors.push(ValidationError::NotPositive("archive.interval_secs"));
    }
    if config.archive.index_key.is_empty() || config.archive.index_key.contains(',') {
        errors.push(ValidationError::InvalidIndexKey);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GuardConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = GuardConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.rate_limit.capacity = 0;
        config.rate_limit.refill_per_second = 0.0;
        config.archive.index_key = "a,b".into();
        config.guard.bypass_paths = vec!["admin".into()];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::InvalidIndexKey));
        assert!(errors.contains(&ValidationError::NotPositive("rate_limit.capacity")));
        assert!(errors.contains(&ValidationError::InvalidBypassPath("admin".into())));
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = GuardConfig::default();
        config.observability.metrics_address = "bogus".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::InvalidMetricsAddress("bogus".into())]);
    }

    #[test]
    fn test_decode_depth_is_bounded() {
        let mut config = GuardConfig::default();
        config.xss.max_decode_depth = MAX_DECODE_DEPTH_LIMIT + 1;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::DecodeDepthTooLarge {
                depth: MAX_DECODE_DEPTH_LIMIT + 1,
                limit: MAX_DECODE_DEPTH_LIMIT,
            }]
        );
    }
}
