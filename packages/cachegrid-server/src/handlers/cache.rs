//! Single-key cache operation handlers: get, set, delete, clear.

use std::collections::HashSet;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::Json;
use cachegrid_core::entry::now_millis;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TtlQuery {
    ttl: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct SetBody {
    key: String,
    value: Value,
    ttl: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ClearQuery {
    #[serde(default)]
    confirm: bool,
}

fn parse_ttl(ttl: Option<f64>) -> Result<Option<Duration>, ApiError> {
    match ttl {
        None => Ok(None),
        Some(seconds) if seconds > 0.0 => Ok(Some(Duration::from_secs_f64(seconds))),
        Some(_) => Err(ApiError::BadRequest("ttl must be strictly positive".to_string())),
    }
}

/// `GET /cache/{key}` — 200 with `{key, value, exists, hit}`.
pub async fn get_cache_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let value = state.engine.get(&key)?;
    Ok(Json(match value {
        Some(v) => json!({ "key": key, "value": v, "exists": true, "hit": true }),
        None => json!({ "key": key, "value": null, "exists": false, "hit": false }),
    }))
}

/// `PUT /cache/{key}` — body is the raw value; optional `?ttl=<seconds>`.
pub async fn set_cache_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<TtlQuery>,
    Json(value): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let ttl = parse_ttl(query.ttl)?;
    state.engine.set(&key, value, ttl, HashSet::new())?;
    Ok(Json(json!({
        "success": true,
        "key": key,
        "ttl": query.ttl,
        "timestamp": now_millis(),
    })))
}

/// `POST /cache` — body `{key, value, ttl?}`; same result shape as PUT.
pub async fn post_cache_handler(
    State(state): State<AppState>,
    Json(body): Json<SetBody>,
) -> Result<Json<Value>, ApiError> {
    let ttl = parse_ttl(body.ttl)?;
    state.engine.set(&body.key, body.value, ttl, HashSet::new())?;
    Ok(Json(json!({
        "success": true,
        "key": body.key,
        "ttl": body.ttl,
        "timestamp": now_millis(),
    })))
}

/// `DELETE /cache/{key}` — 200 `{success, deleted, key, timestamp}`.
pub async fn delete_cache_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let deleted = state.engine.delete(&key)?;
    Ok(Json(json!({
        "success": true,
        "deleted": deleted,
        "key": key,
        "timestamp": now_millis(),
    })))
}

/// `DELETE /cache?confirm=true` — 400 without confirmation, else clears
/// everything and returns the count removed.
pub async fn clear_cache_handler(
    State(state): State<AppState>,
    Query(query): Query<ClearQuery>,
) -> Result<Json<Value>, ApiError> {
    if !query.confirm {
        return Err(ApiError::BadRequest(
            "must set confirm=true to clear cache".to_string(),
        ));
    }
    let items_removed = state.engine.clear()?;
    Ok(Json(json!({
        "success": true,
        "items_removed": items_removed,
        "timestamp": now_millis(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use cachegrid_core::config::CacheConfig;
    use cachegrid_core::Engine;
    use std::sync::Arc;
    use std::time::Instant;

    fn running_state() -> AppState {
        let engine = Arc::new(Engine::new(CacheConfig::default()));
        engine.start();
        AppState {
            engine,
            config: Arc::new(ServerConfig::default()),
            start_time: Instant::now(),
        }
    }

    #[tokio::test]
    async fn get_on_missing_key_reports_miss() {
        let state = running_state();
        let resp = get_cache_handler(State(state), Path("nope".to_string())).await.unwrap();
        assert_eq!(resp.0["exists"], json!(false));
        assert_eq!(resp.0["hit"], json!(false));
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let state = running_state();
        set_cache_handler(
            State(state.clone()),
            Path("k".to_string()),
            Query(TtlQuery { ttl: None }),
            Json(json!("hello")),
        )
        .await
        .unwrap();

        let resp = get_cache_handler(State(state), Path("k".to_string())).await.unwrap();
        assert_eq!(resp.0["value"], json!("hello"));
        assert_eq!(resp.0["hit"], json!(true));
    }

    #[tokio::test]
    async fn negative_ttl_is_rejected_as_bad_request() {
        let state = running_state();
        let result = set_cache_handler(
            State(state),
            Path("k".to_string()),
            Query(TtlQuery { ttl: Some(-1.0) }),
            Json(json!(1)),
        )
        .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn clear_without_confirm_is_bad_request() {
        let state = running_state();
        let result = clear_cache_handler(State(state), Query(ClearQuery { confirm: false })).await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn clear_with_confirm_removes_everything() {
        let state = running_state();
        state.engine.set("a", json!(1), None, HashSet::new()).unwrap();
        let resp = clear_cache_handler(State(state), Query(ClearQuery { confirm: true }))
            .await
            .unwrap();
        assert_eq!(resp.0["items_removed"], json!(1));
    }

    #[tokio::test]
    async fn delete_reports_whether_key_existed() {
        let state = running_state();
        state.engine.set("a", json!(1), None, HashSet::new()).unwrap();
        let first = delete_cache_handler(State(state.clone()), Path("a".to_string())).await.unwrap();
        assert_eq!(first.0["deleted"], json!(true));

        let second = delete_cache_handler(State(state), Path("a".to_string())).await.unwrap();
        assert_eq!(second.0["deleted"], json!(false));
    }
}
