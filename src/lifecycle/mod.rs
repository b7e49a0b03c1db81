//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Build guard → Spawn worker + archiver → Serve
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C → broadcast → server drains, worker and archiver exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
