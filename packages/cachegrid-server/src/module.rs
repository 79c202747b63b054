//! Server module with deferred startup lifecycle.
//!
//! Follows a deferred-startup pattern: `new()` allocates shared state,
//! `start()` binds the TCP listener, and `serve()` begins accepting
//! connections. The separation lets the engine be started and the listener
//! bound independently before the accept loop begins.

use std::sync::Arc;
use std::time::Instant;

use axum::routing::{delete, get, post, put};
use axum::Router;
use cachegrid_core::Engine;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServerConfig;
use crate::handlers::{
    batch_get_handler, batch_set_handler, clear_cache_handler, delete_cache_handler,
    get_cache_handler, health_handler, list_keys_handler, liveness_handler, post_cache_handler,
    readiness_handler, root_handler, set_cache_handler, stats_handler,
};
use crate::middleware::build_http_layers;
use crate::state::AppState;

/// Owns the engine and TCP listener across the server's lifecycle.
pub struct ServerModule {
    config: ServerConfig,
    engine: Arc<Engine>,
    listener: Option<TcpListener>,
}

impl ServerModule {
    /// Creates a new server module and its backing engine, not yet started.
    ///
    /// # Errors
    ///
    /// Returns an error if `config.policy` names an unknown eviction policy.
    pub fn new(config: ServerConfig) -> Result<Self, cachegrid_core::CoreError> {
        let engine = Arc::new(Engine::new(config.cache_config()?));
        Ok(Self {
            config,
            engine,
            listener: None,
        })
    }

    /// Returns a shared reference to the engine, e.g. for the health probe bin.
    #[must_use]
    pub fn engine(&self) -> Arc<Engine> {
        Arc::clone(&self.engine)
    }

    /// Assembles the axum router with all routes and middleware.
    #[must_use]
    pub fn build_router(&self) -> Router {
        let state = AppState {
            engine: Arc::clone(&self.engine),
            config: Arc::new(self.config.clone()),
            start_time: Instant::now(),
        };

        Router::new()
            .route("/", get(root_handler))
            .route("/health", get(health_handler))
            .route("/health/live", get(liveness_handler))
            .route("/health/ready", get(readiness_handler))
            .route("/stats", get(stats_handler))
            .route(
                "/cache/{key}",
                get(get_cache_handler).put(set_cache_handler).delete(delete_cache_handler),
            )
            .route("/cache", post(post_cache_handler).delete(clear_cache_handler))
            .route("/cache/batch/get", post(batch_get_handler))
            .route("/cache/batch/set", post(batch_set_handler))
            .route("/admin/keys", get(list_keys_handler))
            .layer(build_http_layers(&self.config))
            .with_state(state)
    }

    /// Binds the TCP listener to the configured host and port.
    ///
    /// Returns the actual bound port, which may differ from the configured
    /// port when port 0 is used (OS-assigned ephemeral port).
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound (e.g., port in use).
    pub async fn start(&mut self) -> std::io::Result<u16> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();

        info!(%addr, port, "TCP listener bound");

        self.listener = Some(listener);
        self.engine.start();
        Ok(port)
    }

    /// Starts serving connections until `shutdown` resolves, then stops the
    /// engine's background expirer and returns.
    ///
    /// Consumes `self` because the listener is moved into the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the server encounters a fatal I/O error.
    ///
    /// # Panics
    ///
    /// Panics if `start()` was not called before `serve()`.
    pub async fn serve(
        self,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> std::io::Result<()> {
        let listener = self
            .listener
            .expect("start() must be called before serve()");
        let router = self.build_router();
        let engine = Arc::clone(&self.engine);

        info!("serving HTTP connections");
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;

        engine.stop().await;
        Ok(())
    }
}
