//! Service banner endpoint.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// `GET /` — service banner.
pub async fn root_handler(State(_state): State<AppState>) -> Json<Value> {
    Json(json!({
        "service": "CacheGrid",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "docs": "/docs",
        "health": "/health",
    }))
}
