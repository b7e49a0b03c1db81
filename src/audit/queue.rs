//! Non-blocking attack log queue and its staging worker.
//!
//! Request handlers push entries with [`LogQueue::enqueue`], which never
//! waits: when the queue is full the newest entry is dropped. A single
//! [`LogWorker`] drains entries in FIFO order and stages each one in the
//! cache under a fresh key, appending that key to the index record.

use std::fmt;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

use crate::audit::store::{CacheStore, StoreError};
use crate::observability::metrics;

/// Appended to entries cut at the size limit.
pub const TRUNCATION_MARKER: &str = "... (truncated)";

/// Prefix of staged log keys in the cache.
pub const STAGED_KEY_PREFIX: &str = "xss-log-";

/// A size-bounded record of one detected attack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry(String);

impl LogEntry {
    /// Describe an offending query parameter, truncated to `max_bytes`.
    pub fn xss_attempt(path: &str, param: &str, value: &str, max_bytes: usize) -> Self {
        Self::truncated(format!("Path:{path} Param:{param} Value:{value}"), max_bytes)
    }

    /// Wrap arbitrary text, cutting it at a char boundary at or below `max_bytes`.
    pub fn truncated(mut text: String, max_bytes: usize) -> Self {
        if text.len() > max_bytes {
            let mut cut = max_bytes;
            while !text.is_char_boundary(cut) {
                cut -= 1;
            }
            text.truncate(cut);
            text.push_str(TRUNCATION_MARKER);
        }
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Producer side of the bounded log queue.
#[derive(Debug, Clone)]
pub struct LogQueue {
    tx: mpsc::Sender<LogEntry>,
}

/// Consumer side of the bounded log queue.
#[derive(Debug)]
pub struct LogReceiver {
    rx: mpsc::Receiver<LogEntry>,
}

impl LogQueue {
    /// Create a queue holding at most `capacity` pending entries.
    pub fn new(capacity: usize) -> (Self, LogReceiver) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, LogReceiver { rx })
    }

    /// Offer an entry without waiting. Returns false if it was dropped.
    pub fn enqueue(&self, entry: LogEntry) -> bool {
        match self.tx.try_send(entry) {
            Ok(()) => true,
            Err(TrySendError::Full(entry)) => {
                tracing::warn!(entry = %entry, "Log queue full, dropping log");
                metrics::record_log_dropped();
                false
            }
            Err(TrySendError::Closed(entry)) => {
                tracing::warn!(entry = %entry, "Log worker stopped, dropping log");
                metrics::record_log_dropped();
                false
            }
        }
    }
}

impl LogReceiver {
    /// Wait for the next entry; `None` once every producer is gone.
    pub async fn recv(&mut self) -> Option<LogEntry> {
        self.rx.recv().await
    }

    /// Take the next entry if one is already queued.
    pub fn try_recv(&mut self) -> Option<LogEntry> {
        self.rx.try_recv().ok()
    }
}

/// Store `entry` in the cache and register its key in the index record.
///
/// Returns the staged key.
pub fn stage_entry(
    cache: &dyn CacheStore,
    index_key: &str,
    entry: LogEntry,
) -> Result<String, StoreError> {
    let key = format!("{STAGED_KEY_PREFIX}{}", Uuid::new_v4());
    cache.set(&key, entry.into_string())?;

    let index = match cache.get(index_key)? {
        Some(existing) if !existing.is_empty() => format!("{existing},{key}"),
        _ => key.clone(),
    };
    cache.set(index_key, index)?;
    Ok(key)
}

/// Single consumer that stages queued entries in the cache.
pub struct LogWorker {
    receiver: LogReceiver,
    cache: Arc<dyn CacheStore>,
    index_key: String,
}

impl LogWorker {
    pub fn new(receiver: LogReceiver, cache: Arc<dyn CacheStore>, index_key: impl Into<String>) -> Self {
        Self {
            receiver,
            cache,
            index_key: index_key.into(),
        }
    }

    /// Consume entries until the queue closes or shutdown is signalled.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(index_key = %self.index_key, "Log worker starting");

        loop {
            tokio::select! {
                entry = self.receiver.recv() => match entry {
                    Some(entry) => self.process(entry),
                    None => {
                        tracing::info!("Log queue closed, worker exiting");
                        break;
                    }
                },
                _ = shutdown.recv() => {
                    tracing::info!("Log worker received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    fn process(&self, entry: LogEntry) {
        tracing::info!(entry = %entry, "Processed log");
        match stage_entry(self.cache.as_ref(), &self.index_key, entry) {
            Ok(key) => {
                tracing::debug!(key = %key, "Log staged");
                metrics::record_log_staged();
            }
            Err(e) => tracing::error!(error = %e, "Failed to stage log"),
        }
    }
}
