//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use xss_guard::audit::{MemoryCache, MemoryStore};
use xss_guard::config::{ArchiveStoreKind, GuardConfig};
use xss_guard::http::{default_handler, HttpServer};
use xss_guard::lifecycle::Shutdown;

/// Default config with an in-memory archive and an ephemeral port.
pub fn test_config() -> GuardConfig {
    let mut config = GuardConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.archive.store = ArchiveStoreKind::Memory;
    config
}

/// Build a guarded router without spawning background tasks.
#[allow(dead_code)]
pub fn guarded_router(config: GuardConfig) -> Router {
    let server = HttpServer::new(
        config,
        default_handler(),
        Arc::new(MemoryCache::new()),
        Arc::new(MemoryStore::new()),
    );
    server.router()
}

/// Send one request through `router` and return its status.
#[allow(dead_code)]
pub async fn send(router: &Router, request: Request<Body>) -> StatusCode {
    router.clone().oneshot(request).await.unwrap().status()
}

/// A running guard server on a real socket.
#[allow(dead_code)]
pub struct RunningGuard {
    pub addr: SocketAddr,
    pub cache: MemoryCache,
    pub durable: MemoryStore,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<()>,
}

/// Start the full server, worker, and archiver with in-memory stores.
#[allow(dead_code)]
pub async fn start_guard(config: GuardConfig) -> RunningGuard {
    let cache = MemoryCache::new();
    let durable = MemoryStore::new();
    let shutdown = Shutdown::new();

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(
        config,
        default_handler(),
        Arc::new(cache.clone()),
        Arc::new(durable.clone()),
    );
    let server_shutdown = shutdown.clone();
    let handle = tokio::spawn(async move {
        server.run(listener, &server_shutdown).await.unwrap();
    });

    tokio::time::sleep(Duration::from_millis(100)).await;

    RunningGuard {
        addr,
        cache,
        durable,
        shutdown,
        handle,
    }
}
