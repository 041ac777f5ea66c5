use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use std::str::FromStr;

use crate::api::AppState;
use crate::db::repo::PickDeletion;
use crate::domain::{GameId, Pick, PickId, UserId, WeekScope};
use crate::engine::payout;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePickRequest {
    pub user_id: String,
    pub season: i32,
    pub week: i32,
    pub team: String,
    pub player_name: String,
    pub position: Option<String>,
    pub american_odds: Option<i32>,
    pub game_id: Option<String>,
}

pub async fn create_pick(
    State(state): State<AppState>,
    Json(req): Json<CreatePickRequest>,
) -> Result<(StatusCode, Json<Pick>), AppError> {
    let user_id = req.user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::BadRequest("userId must not be empty".to_string()));
    }
    if req.player_name.trim().is_empty() {
        return Err(AppError::BadRequest("playerName must not be empty".to_string()));
    }
    if req.team.trim().is_empty() {
        return Err(AppError::BadRequest("team must not be empty".to_string()));
    }
    validate_week(req.season, req.week)?;
    if let Some(odds) = req.american_odds {
        payout::validate_odds(odds).map_err(|e| AppError::BadRequest(e.to_string()))?;
    }

    let pick = Pick::new(
        PickId::generate(),
        UserId::new(user_id.to_string()),
        WeekScope::new(req.season, req.week),
        req.team.trim().to_string(),
        req.player_name.trim().to_string(),
        req.position.as_deref().map(|p| p.trim().to_string()),
        req.american_odds,
        req.game_id.map(GameId::new),
    );

    let inserted = state.repo.insert_pick(&pick).await?;
    if !inserted {
        return Err(AppError::BadRequest(format!(
            "duplicate pick: {} already picked {} in {}",
            pick.user_id, pick.player_name, pick.week
        )));
    }

    Ok((StatusCode::CREATED, Json(pick)))
}

#[derive(Debug, Deserialize)]
pub struct ListPicksQuery {
    pub season: Option<i32>,
    pub week: Option<i32>,
}

pub async fn list_picks(
    Query(params): Query<ListPicksQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Pick>>, AppError> {
    let week = week_scope(params.season, params.week)?;
    let picks = state.repo.list_picks(week).await?;
    Ok(Json(picks))
}

pub async fn delete_pick(
    Path(pick_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let pick_id = PickId::from_str(&pick_id)
        .map_err(|_| AppError::BadRequest("pickId must be a UUID".to_string()))?;

    match state.repo.delete_pick(pick_id).await? {
        PickDeletion::Deleted => Ok(Json(serde_json::json!({"deleted": true}))),
        PickDeletion::NotFound => Err(AppError::NotFound(format!("pick {}", pick_id))),
        PickDeletion::Graded => Err(AppError::BadRequest(
            "pick is already graded; clear its result first".to_string(),
        )),
    }
}

/// Both-or-neither season/week pair shared by list and leaderboard queries.
pub(super) fn week_scope(
    season: Option<i32>,
    week: Option<i32>,
) -> Result<Option<WeekScope>, AppError> {
    match (season, week) {
        (None, None) => Ok(None),
        (Some(season), Some(week)) => {
            validate_week(season, week)?;
            Ok(Some(WeekScope::new(season, week)))
        }
        _ => Err(AppError::BadRequest(
            "season and week must be provided together".to_string(),
        )),
    }
}

pub(super) fn validate_week(season: i32, week: i32) -> Result<(), AppError> {
    if !(1990..=2100).contains(&season) {
        return Err(AppError::BadRequest(format!("season {} out of range", season)));
    }
    // 18 regular-season weeks plus postseason rounds.
    if !(1..=23).contains(&week) {
        return Err(AppError::BadRequest(format!("week {} out of range", week)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_week_scope_requires_pair() {
        assert!(week_scope(None, None).unwrap().is_none());
        assert_eq!(
            week_scope(Some(2025), Some(3)).unwrap(),
            Some(WeekScope::new(2025, 3))
        );
        assert!(week_scope(Some(2025), None).is_err());
        assert!(week_scope(None, Some(3)).is_err());
    }

    #[test]
    fn test_validate_week_bounds() {
        assert!(validate_week(2025, 1).is_ok());
        assert!(validate_week(2025, 23).is_ok());
        assert!(validate_week(2025, 0).is_err());
        assert!(validate_week(2025, 24).is_err());
        assert!(validate_week(1887, 1).is_err());
    }
}
