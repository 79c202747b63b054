//! Administrative endpoints: key listing.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListKeysQuery {
    pattern: Option<String>,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    100
}

/// `GET /admin/keys?pattern=<substr>&limit=<n>` — `?pattern=` filters keys
/// by literal substring; `limit` must be in `1..=1000`.
pub async fn list_keys_handler(
    State(state): State<AppState>,
    Query(query): Query<ListKeysQuery>,
) -> Result<Json<Value>, ApiError> {
    if !(1..=1000).contains(&query.limit) {
        return Err(ApiError::BadRequest(
            "limit must be between 1 and 1000".to_string(),
        ));
    }

    let keys = state.engine.get_keys(query.pattern.as_deref())?;
    let total_found = keys.len();
    let returned: Vec<String> = keys.into_iter().take(query.limit).collect();

    Ok(Json(json!({
        "keys": returned,
        "total_found": total_found,
        "returned": returned.len(),
        "pattern": query.pattern,
        "timestamp": cachegrid_core::entry::now_millis(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use cachegrid_core::config::CacheConfig;
    use cachegrid_core::Engine;
    use serde_json::json;
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
    async fn lists_keys_filtered_by_pattern() {
        let state = running_state();
        state.engine.set("user:1", json!(1), None, Default::default()).unwrap();
        state.engine.set("order:1", json!(1), None, Default::default()).unwrap();

        let resp = list_keys_handler(
            State(state),
            Query(ListKeysQuery { pattern: Some("user:".to_string()), limit: 100 }),
        )
        .await
        .unwrap();

        assert_eq!(resp.0["total_found"], json!(1));
    }

    #[tokio::test]
    async fn limit_out_of_range_is_rejected() {
        let state = running_state();
        let result = list_keys_handler(
            State(state),
            Query(ListKeysQuery { pattern: None, limit: 0 }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }
}
