//! Batch cache operation handlers.

use std::collections::HashMap;
use std::time::Duration;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BatchGetBody {
    keys: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchSetBody {
    items: HashMap<String, Value>,
    ttl: Option<f64>,
}

/// `POST /cache/batch/get` — maps each requested key to `{value, exists, hit}`.
///
/// Never fails per-key: a batch with some misses still returns 200 with a
/// per-key breakdown.
pub async fn batch_get_handler(
    State(state): State<AppState>,
    Json(body): Json<BatchGetBody>,
) -> Result<Json<Value>, ApiError> {
    let hits = state.engine.get_multi(&body.keys)?;

    let mut results = serde_json::Map::with_capacity(body.keys.len());
    for key in &body.keys {
        let entry = match hits.get(key) {
            Some(value) => json!({ "value": value, "exists": true, "hit": true }),
            None => json!({ "value": null, "exists": false, "hit": false }),
        };
        results.insert(key.clone(), entry);
    }

    Ok(Json(json!({
        "success": true,
        "results": results,
        "requested_keys": body.keys.len(),
        "found_keys": hits.len(),
        "timestamp": cachegrid_core::entry::now_millis(),
    })))
}

/// `POST /cache/batch/set` — inserts every item, returning the count applied.
///
/// Not atomic: each key is inserted independently, so a partial `items_set`
/// count (lower than `items_requested`) is a normal outcome under pressure.
pub async fn batch_set_handler(
    State(state): State<AppState>,
    Json(body): Json<BatchSetBody>,
) -> Result<Json<Value>, ApiError> {
    let ttl = match body.ttl {
        Some(seconds) if seconds > 0.0 => Some(Duration::from_secs_f64(seconds)),
        Some(_) => {
            return Err(ApiError::BadRequest(
                "ttl must be strictly positive".to_string(),
            ))
        }
        None => None,
    };

    let requested = body.items.len();
    let items_set = state.engine.set_multi(body.items, ttl)?;

    Ok(Json(json!({
        "success": true,
        "items_requested": requested,
        "items_set": items_set,
        "ttl": body.ttl,
        "timestamp": cachegrid_core::entry::now_millis(),
    })))
}
