//! Periodic archival of staged attack logs.
//!
//! # Responsibilities
//! - Read the index record from the cache on a fixed period
//! - Copy every listed entry to the durable store and delete it from the cache
//! - Delete the index record once the batch is done
//!
//! # Design Decisions
//! - Best-effort drain, not a transaction: a missing entry or a failed write
//!   is logged and the cycle moves on
//! - The index is deleted wholesale after the batch; keys staged while a
//!   cycle runs can be orphaned

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::audit::store::{CacheStore, DurableStore};
use crate::config::ArchiveConfig;
use crate::observability::metrics;

/// Outcome counts of one archival cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveReport {
    /// Entries written to durable storage.
    pub archived: usize,
    /// Listed keys with no staged value.
    pub missing: usize,
    /// Entries whose durable write failed.
    pub failed: usize,
}

impl ArchiveReport {
    pub fn is_empty(&self) -> bool {
        self.archived == 0 && self.missing == 0 && self.failed == 0
    }
}

pub struct LogArchiver {
    cache: Arc<dyn CacheStore>,
    durable: Arc<dyn DurableStore>,
    index_key: String,
    interval: Duration,
}

impl LogArchiver {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        durable: Arc<dyn DurableStore>,
        index_key: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self {
            cache,
            durable,
            index_key: index_key.into(),
            interval,
        }
    }

    pub fn from_config(
        cache: Arc<dyn CacheStore>,
        durable: Arc<dyn DurableStore>,
        config: &ArchiveConfig,
    ) -> Self {
        Self::new(
            cache,
            durable,
            config.index_key.clone(),
            Duration::from_secs(config.interval_secs),
        )
    }

    /// Run a cycle every interval until shutdown. The first cycle runs one
    /// full interval after start.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            index_key = %self.index_key,
            "Log archiver starting"
        );

        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_cycle();
                }
                _ = shutdown.recv() => {
                    tracing::info!("Log archiver received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Drain everything currently listed in the index record.
    pub fn run_cycle(&self) -> ArchiveReport {
        let mut report = ArchiveReport::default();

        let index = match self.cache.get(&self.index_key) {
            Ok(Some(index)) => index,
            Ok(None) => {
                tracing::debug!(index_key = %self.index_key, "No staged logs found");
                return report;
            }
            Err(e) => {
                tracing::warn!(index_key = %self.index_key, error = %e, "Failed to read log index, skipping cycle");
                return report;
            }
        };

        for key in index.split(',').map(str::trim).filter(|k| !k.is_empty()) {
            let value = match self.cache.get(key) {
                Ok(Some(value)) => value,
                Ok(None) => {
                    tracing::warn!(key = %key, "Failed to fetch log: not staged");
                    report.missing += 1;
                    continue;
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Failed to fetch log");
                    report.missing += 1;
                    continue;
                }
            };

            match self.durable.write(key, &value) {
                Ok(()) => {
                    tracing::debug!(key = %key, "Log archived");
                    report.archived += 1;
                }
                Err(e) => {
                    tracing::error!(key = %key, error = %e, "Failed to archive log, entry lost");
                    report.failed += 1;
                }
            }

            if let Err(e) = self.cache.delete(key) {
                tracing::warn!(key = %key, error = %e, "Failed to delete staged log");
            }
        }

        if let Err(e) = self.cache.delete(&self.index_key) {
            tracing::warn!(index_key = %self.index_key, error = %e, "Failed to delete log index");
        }

        metrics::record_archive_outcome("archived", report.archived);
        metrics::record_archive_outcome("missing", report.missing);
        metrics::record_archive_outcome("failed", report.failed);
        tracing::info!(
            archived = report.archived,
            missing = report.missing,
            failed = report.failed,
            "Archival cycle complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::queue::{stage_entry, LogEntry};
    use crate::audit::store::{MemoryCache, MemoryStore, StoreError};

    struct FailingStore;

    impl DurableStore for FailingStore {
        fn write(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("durable store down".into()))
        }
    }

    struct BrokenCache;

    impl CacheStore for BrokenCache {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("cache down".into()))
        }
        fn set(&self, _key: &str, _value: String) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("cache down".into()))
        }
        fn delete(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("cache down".into()))
        }
    }

    fn archiver(cache: Arc<dyn CacheStore>, durable: Arc<dyn DurableStore>) -> LogArchiver {
        LogArchiver::new(cache, durable, "log-index", Duration::from_secs(3600))
    }

    #[test]
    fn test_missing_index_is_noop() {
        let cache = Arc::new(MemoryCache::new());
        let durable = Arc::new(MemoryStore::new());
        let report = archiver(cache.clone(), durable.clone()).run_cycle();

        assert!(report.is_empty());
        assert!(durable.is_empty());
    }

    #[test]
    fn test_unreadable_index_is_skipped() {
        let durable = Arc::new(MemoryStore::new());
        let report = archiver(Arc::new(BrokenCache), durable.clone()).run_cycle();
        assert!(report.is_empty());
        assert!(durable.is_empty());
    }

    #[test]
    fn test_drains_staged_entries() {
        let cache = Arc::new(MemoryCache::new());
        let durable = Arc::new(MemoryStore::new());
        let a = stage_entry(cache.as_ref(), "log-index", LogEntry::truncated("first".into(), 64)).unwrap();
        let b = stage_entry(cache.as_ref(), "log-index", LogEntry::truncated("second".into(), 64)).unwrap();

        let report = archiver(cache.clone(), durable.clone()).run_cycle();

        assert_eq!(report, ArchiveReport { archived: 2, missing: 0, failed: 0 });
        assert_eq!(durable.get(&a).as_deref(), Some("first"));
        assert_eq!(durable.get(&b).as_deref(), Some("second"));
        assert!(cache.is_empty());

        // Second run finds nothing.
        assert!(archiver(cache, durable).run_cycle().is_empty());
    }

    #[test]
    fn test_missing_key_is_skipped() {
        let cache = Arc::new(MemoryCache::new());
        let durable = Arc::new(MemoryStore::new());
        cache.set("present", "kept".into()).unwrap();
        cache.set("log-index", "gone,present,".into()).unwrap();

        let report = archiver(cache.clone(), durable.clone()).run_cycle();

        assert_eq!(report, ArchiveReport { archived: 1, missing: 1, failed: 0 });
        assert_eq!(durable.get("present").as_deref(), Some("kept"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_failed_write_loses_entry() {
        let cache = Arc::new(MemoryCache::new());
        stage_entry(cache.as_ref(), "log-index", LogEntry::truncated("doomed".into(), 64)).unwrap();

        let report = archiver(cache.clone(), Arc::new(FailingStore)).run_cycle();

        assert_eq!(report, ArchiveReport { archived: 0, missing: 0, failed: 1 });
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_fires_after_one_interval() {
        let cache = Arc::new(MemoryCache::new());
        let durable = Arc::new(MemoryStore::new());
        stage_entry(cache.as_ref(), "log-index", LogEntry::truncated("tick".into(), 64)).unwrap();

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let task = LogArchiver::new(cache.clone(), durable.clone(), "log-index", Duration::from_secs(60));
        let handle = tokio::spawn(task.run(shutdown_rx));

        time::sleep(Duration::from_secs(30)).await;
        assert!(durable.is_empty());

        time::sleep(Duration::from_secs(31)).await;
        assert_eq!(durable.len(), 1);
        assert!(cache.is_empty());

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
    }
}
