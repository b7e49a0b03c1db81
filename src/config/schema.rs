//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the guard.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the request guard.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GuardConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Request pipeline settings (size cap, bypass paths, timeout).
    pub guard: PipelineConfig,

    /// Token bucket configuration.
    pub rate_limit: RateLimitConfig,

    /// XSS detector settings.
    pub xss: XssConfig,

    /// Attack log queue settings.
    pub logging: LogQueueConfig,

    /// Staged log archival settings.
    pub archive: ArchiveConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Request pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum declared request body size in bytes.
    pub max_body_bytes: u64,

    /// Paths that skip payload scanning (exact match).
    pub bypass_paths: Vec<String>,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 10 * 1024,
            bypass_paths: vec!["/admin".to_string()],
            request_timeout_secs: 30,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Burst capacity.
    pub capacity: u32,

    /// Sustained admissions per second.
    pub refill_per_second: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: 5,
            refill_per_second: 1.0,
        }
    }
}

/// XSS detector configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct XssConfig {
    /// How many nested data-URI payloads the detector decodes.
    pub max_decode_depth: u32,

    /// Replaces the built-in blocklist when set.
    pub patterns: Option<Vec<String>>,
}

impl Default for XssConfig {
    fn default() -> Self {
        Self {
            max_decode_depth: 1,
            patterns: None,
        }
    }
}

/// Attack log queue configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogQueueConfig {
    /// Bounded queue capacity; entries beyond it are dropped.
    pub queue_capacity: usize,

    /// Maximum length of a single entry before truncation.
    pub max_entry_bytes: usize,
}

impl Default for LogQueueConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 100,
            max_entry_bytes: 1024,
        }
    }
}

/// Which durable store receives archived entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveStoreKind {
    /// JSON lines appended to `path`.
    File,
    /// In-process map, lost on exit.
    Memory,
}

/// Archival configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Seconds between archival cycles.
    pub interval_secs: u64,

    /// Cache key of the index record.
    pub index_key: String,

    /// Durable store backend.
    pub store: ArchiveStoreKind,

    /// Output file for the `file` store.
    pub path: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3600,
            index_key: "log-index".to_string(),
            store: ArchiveStoreKind::File,
            path: "xss-archive.jsonl".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Expose a Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Address for the metrics endpoint.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_limits() {
        let config = GuardConfig::default();
        assert_eq!(config.guard.max_body_bytes, 10240);
        assert_eq!(config.guard.bypass_paths, vec!["/admin".to_string()]);
        assert_eq!(config.rate_limit.capacity, 5);
        assert_eq!(config.rate_limit.refill_per_second, 1.0);
        assert_eq!(config.logging.queue_capacity, 100);
        assert_eq!(config.logging.max_entry_bytes, 1024);
        assert_eq!(config.archive.interval_secs, 3600);
        assert_eq!(config.archive.index_key, "log-index");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: GuardConfig = toml::from_str(
            r#"
            [rate_limit]
            capacity = 20

            [archive]
            store = "memory"
            "#,
        )
        .unwrap();

        assert_eq!(config.rate_limit.capacity, 20);
        assert_eq!(config.rate_limit.refill_per_second, 1.0);
        assert_eq!(config.archive.store, ArchiveStoreKind::Memory);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert!(config.xss.patterns.is_none());
    }
}
