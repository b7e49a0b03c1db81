//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Wrap the application handler with the request guard
//! - Wire up middleware (tracing, timeout, request ID)
//! - Spawn the log worker and archiver next to the server
//! - Serve until shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::audit::{CacheStore, DurableStore, LogArchiver, LogQueue, LogWorker};
use crate::config::GuardConfig;
use crate::http::guard::{guard_middleware, RequestGuard};
use crate::lifecycle::shutdown::{wait as wait_for_shutdown, Shutdown};

/// Body returned by [`default_handler`].
pub const ACCEPTED_BODY: &str = "Request accepted!";

/// Handler that accepts every request that gets past the guard.
pub fn default_handler() -> Router {
    Router::new().fallback(|| async { ACCEPTED_BODY })
}

/// The guarded HTTP server and its background tasks.
pub struct HttpServer {
    router: Router,
    config: GuardConfig,
    worker: LogWorker,
    archiver: LogArchiver,
}

impl HttpServer {
    /// Guard `handler` with the pipeline described by `config`.
    pub fn new(
        config: GuardConfig,
        handler: Router,
        cache: Arc<dyn CacheStore>,
        durable: Arc<dyn DurableStore>,
    ) -> Self {
        let (queue, receiver) = LogQueue::new(config.logging.queue_capacity);
        let guard = Arc::new(RequestGuard::from_config(&config, queue));

        let worker = LogWorker::new(receiver, cache.clone(), config.archive.index_key.clone());
        let archiver = LogArchiver::from_config(cache, durable, &config.archive);

        let router = Self::build_router(&config, guard, handler);
        Self {
            router,
            config,
            worker,
            archiver,
        }
    }

    #[allow(deprecated)]
    fn build_router(config: &GuardConfig, guard: Arc<RequestGuard>, handler: Router) -> Router {
        handler
            .layer(middleware::from_fn_with_state(guard, guard_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(config.guard.request_timeout_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
    }

    /// The guarded router, for serving or driving directly.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Spawn the background tasks and serve until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let worker = tokio::spawn(self.worker.run(shutdown.subscribe()));
        let archiver = tokio::spawn(self.archiver.run(shutdown.subscribe()));

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for_shutdown(shutdown.subscribe()))
            .await?;

        // Both tasks watch the same signal that stopped the server.
        let _ = tokio::join!(worker, archiver);

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
