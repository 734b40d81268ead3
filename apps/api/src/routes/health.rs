use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::error;

use crate::state::AppState;

/// GET /health
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /health/ready
/// Each dependency reports `true`/`false`, or `null` when not configured.
/// Any configured dependency that fails its ping makes the service degraded.
pub async fn readiness_handler(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let database = match state.store.as_ref() {
        Some(store) => Some(match store.ping().await {
            Ok(()) => true,
            Err(e) => {
                error!("Health check - database error: {e}");
                false
            }
        }),
        None => None,
    };

    let cache = match state.counters.as_ref() {
        Some(counters) => Some(match counters.ping().await {
            Ok(()) => true,
            Err(e) => {
                error!("Health check - cache error: {e}");
                false
            }
        }),
        None => None,
    };

    let healthy = database != Some(false) && cache != Some(false);
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if healthy { "ok" } else { "degraded" },
            "checks": { "database": database, "cache": cache },
        })),
    )
}
