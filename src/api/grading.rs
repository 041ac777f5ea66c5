use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::picks::validate_week;
use crate::api::AppState;
use crate::engine::GradingSummary;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct GradeQuery {
    pub season: i32,
    pub week: i32,
}

/// Run the settlement batch for one week. Safe to call repeatedly: grading
/// is an idempotent upsert per pick.
pub async fn grade_week(
    Query(params): Query<GradeQuery>,
    State(state): State<AppState>,
) -> Result<Json<GradingSummary>, AppError> {
    validate_week(params.season, params.week)?;

    let summary = state.engine.grade_week(params.season, params.week).await?;

    // Settlements changed; cached standings are stale.
    state.cache.invalidate_all();

    Ok(Json(summary))
}
