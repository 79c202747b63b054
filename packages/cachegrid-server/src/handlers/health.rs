//! Health, liveness, readiness, and statistics endpoint handlers.
//!
//! These expose cache health and operational metrics both for human
//! operators (`/health`, `/stats`) and for orchestrators like Kubernetes
//! (`/health/live`, `/health/ready`).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use cachegrid_core::engine::HealthStatus;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /health` — 200 with a health snapshot, 503 if the engine is stopped.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let health = state.engine.health();
    let status = match health.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Stopped => StatusCode::SERVICE_UNAVAILABLE,
    };

    let body = json!({
        "status": if health.status == HealthStatus::Healthy { "healthy" } else { "stopped" },
        "uptime_seconds": health.uptime_seconds,
        "cache_size": health.entry_count,
        "hit_ratio": health.hit_ratio,
        "memory_usage_mb": health.memory_mb,
        "last_check": health.last_check_millis,
    });

    (status, Json(body))
}

/// Kubernetes liveness probe — always 200 once the process is serving.
pub async fn liveness_handler() -> StatusCode {
    StatusCode::OK
}

/// Kubernetes readiness probe — 200 once the engine has started, 503 otherwise.
pub async fn readiness_handler(State(state): State<AppState>) -> StatusCode {
    if state.engine.is_running() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// `GET /stats` — the cache's statistics snapshot.
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let stats = state.engine.stats()?;
    Ok(Json(json!({
        "entry_count": stats.entry_count,
        "max_entries": stats.max_entries,
        "total_bytes": stats.total_bytes,
        "max_bytes": stats.max_bytes,
        "memory_usage_percent": stats.memory_percent,
        "accesses": stats.accesses,
        "hits": stats.hits,
        "misses": stats.misses,
        "hit_ratio": stats.hit_ratio,
        "evictions": stats.evictions,
        "expired_items": stats.expired,
        "tag_count": stats.tag_count,
        "eviction_policy": stats.policy_name,
    })))
}
