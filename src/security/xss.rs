//! XSS (Cross-Site Scripting) detection.
//!
//! Case-insensitive substring matching against a blocklist, with a bounded
//! number of decode steps into embedded `data:text/html;base64,` payloads.

use crate::config::XssConfig;
use crate::security::blocklist::{DATA_URI_MARKER, DEFAULT_PATTERNS};
use crate::security::decoder;

/// Stateless XSS classifier.
#[derive(Debug, Clone)]
pub struct XssDetector {
    patterns: Vec<String>,
    max_decode_depth: u32,
}

impl Default for XssDetector {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERNS.iter().copied(), 1)
    }
}

impl XssDetector {
    /// Build a detector from a pattern list. Patterns are lowercased here.
    pub fn new<I, S>(patterns: I, max_decode_depth: u32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| p.as_ref().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();

        Self {
            patterns,
            max_decode_depth,
        }
    }

    pub fn from_config(config: &XssConfig) -> Self {
        match &config.patterns {
            Some(patterns) => Self::new(patterns, config.max_decode_depth),
            None => Self::new(DEFAULT_PATTERNS.iter().copied(), config.max_decode_depth),
        }
    }

    /// Number of active blocklist entries.
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Returns true if `input` looks like an XSS payload.
    pub fn detect(&self, input: &str) -> bool {
        self.detect_at_depth(input, 0)
    }

    fn detect_at_depth(&self, input: &str, depth: u32) -> bool {
        let lowered = input.to_lowercase();
        if self.patterns.iter().any(|p| lowered.contains(p.as_str())) {
            return true;
        }

        if depth >= self.max_decode_depth || !lowered.contains(DATA_URI_MARKER) {
            return false;
        }

        match decoder::decode(input) {
            Ok(decoded) => self.detect_at_depth(&decoded, depth + 1),
            Err(e) => {
                tracing::debug!(error = %e, "Data URI payload not decodable");
                false
            }
        }
    }
}
