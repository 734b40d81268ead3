use std::sync::atomic::Ordering;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::state::AppState;

const VIEWS_KEY: &str = "portfolio:views";
const VIEW_COUNT_ERROR: &str = "Failed to get view count";

#[derive(Debug, Serialize)]
pub struct ViewsResponse {
    pub views: i64,
}

/// GET /api/views
/// Counts a visit and returns the new total.
pub async fn handle_increment_views(
    State(state): State<AppState>,
) -> Result<Json<ViewsResponse>, AppError> {
    let views = match state.counters.as_ref() {
        Some(counters) => counters
            .incr(VIEWS_KEY)
            .await
            .map_err(|e| AppError::cache(VIEW_COUNT_ERROR, e))?,
        None => local_total(state.local_views.fetch_add(1, Ordering::Relaxed) + 1),
    };

    Ok(Json(ViewsResponse { views }))
}

/// GET /api/views/count
pub async fn handle_view_count(
    State(state): State<AppState>,
) -> Result<Json<ViewsResponse>, AppError> {
    let views = match state.counters.as_ref() {
        Some(counters) => counters
            .get(VIEWS_KEY)
            .await
            .map_err(|e| AppError::cache(VIEW_COUNT_ERROR, e))?
            .unwrap_or(0),
        None => local_total(state.local_views.load(Ordering::Relaxed)),
    };

    Ok(Json(ViewsResponse { views }))
}

fn local_total(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}
