use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::picks::week_scope;
use crate::api::AppState;
use crate::domain::{LeaderboardEntry, UserId};
use crate::engine::UserScope;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardQuery {
    pub season: Option<i32>,
    pub week: Option<i32>,
    /// Include pool members with zero picks as zero-valued entries.
    pub include_empty: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    pub rank: i64,
    #[serde(flatten)]
    pub entry: LeaderboardEntry,
}

pub async fn get_leaderboard(
    Query(params): Query<LeaderboardQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<RankedEntry>>, AppError> {
    let week = week_scope(params.season, params.week)?;
    let include_empty = params.include_empty.unwrap_or(false);

    let entries = match state.cache.get(week, include_empty) {
        Some(cached) => cached,
        None => {
            let scope = if include_empty {
                UserScope::Roster(
                    state
                        .config
                        .pool_users
                        .iter()
                        .map(|u| UserId::new(u.clone()))
                        .collect(),
                )
            } else {
                UserScope::ActiveOnly
            };

            let entries = state.aggregator.leaderboard(week, scope).await?;
            state.cache.put(week, include_empty, entries.clone());
            entries
        }
    };

    let ranked = entries
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| RankedEntry {
            rank: (idx + 1) as i64,
            entry,
        })
        .collect();

    Ok(Json(ranked))
}
