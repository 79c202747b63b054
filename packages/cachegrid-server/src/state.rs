//! Shared application state, cloned into every handler.

use std::sync::Arc;
use std::time::Instant;

use cachegrid_core::Engine;

use crate::config::ServerConfig;

/// State shared across every axum handler.
///
/// Cheap to clone: every field is an `Arc` or `Copy` value.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub config: Arc<ServerConfig>,
    pub start_time: Instant,
}
