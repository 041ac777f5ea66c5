use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use crate::api::picks::validate_week;
use crate::api::AppState;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct ClearResultsQuery {
    pub season: i32,
    pub week: Option<i32>,
}

/// Admin override: delete settlement records (never picks) so a scope can
/// be re-graded after a data correction. The only supported undo.
pub async fn clear_results(
    Query(params): Query<ClearResultsQuery>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    if let Some(week) = params.week {
        validate_week(params.season, week)?;
    }

    let deleted = state
        .repo
        .delete_results(params.season, params.week)
        .await?;

    state.cache.invalidate_all();
    info!(season = params.season, week = ?params.week, deleted, "cleared settlement records");

    Ok(Json(serde_json::json!({"deleted": deleted})))
}
