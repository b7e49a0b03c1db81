//! Attack logging subsystem.
//!
//! # Data Flow
//! ```text
//! RequestGuard detects XSS
//!     → queue.rs (LogQueue::enqueue, drop when full)
//!     → queue.rs (LogWorker stages entry + index record in the cache)
//!     → archiver.rs (every interval: cache → durable store)
//! ```
//!
//! # Design Decisions
//! - The request path never waits on logging
//! - At-most-once delivery: overflow and write failures lose entries
//! - The worker and the archiver share nothing but the cache

pub mod archiver;
pub mod queue;
pub mod store;

pub use archiver::{ArchiveReport, LogArchiver};
pub use queue::{LogEntry, LogQueue, LogReceiver, LogWorker};
pub use store::{CacheStore, DurableStore, FileStore, MemoryCache, MemoryStore, StoreError};
