//! Pick persistence. Picks are read-only to the grading engine; only users
//! (and admin overrides) create or remove them.

use super::Repository;
use crate::domain::{GameId, Pick, PickId, UserId, WeekScope};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;

/// Outcome of a pick deletion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickDeletion {
    Deleted,
    NotFound,
    /// Pick already has a settlement; clear the result first.
    Graded,
}

impl Repository {
    /// Insert a pick. Returns false when the user already has a pick for
    /// this player in this week (the duplicate is silently dropped).
    pub async fn insert_pick(&self, pick: &Pick) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO picks
            (pick_id, user_id, season, week, team, player_name, player_key, position, american_odds, game_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id, season, week, player_key) DO NOTHING
            "#,
        )
        .bind(pick.pick_id.to_string())
        .bind(pick.user_id.as_str())
        .bind(pick.week.season)
        .bind(pick.week.week)
        .bind(&pick.team)
        .bind(&pick.player_name)
        .bind(pick.player_key())
        .bind(pick.position.as_deref())
        .bind(pick.american_odds)
        .bind(pick.game_id.as_ref().map(|g| g.as_str()))
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List picks, optionally scoped to one week, in creation order.
    pub async fn list_picks(&self, week: Option<WeekScope>) -> Result<Vec<Pick>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT pick_id, user_id, season, week, team, player_name, position, american_odds, game_id
            FROM picks
            WHERE ? IS NULL OR (season = ? AND week = ?)
            ORDER BY created_at ASC, pick_id ASC
            "#,
        )
        .bind(week.map(|w| w.season))
        .bind(week.map(|w| w.season))
        .bind(week.map(|w| w.week))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(pick_from_row).collect()
    }

    pub async fn get_pick(&self, pick_id: PickId) -> Result<Option<Pick>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT pick_id, user_id, season, week, team, player_name, position, american_odds, game_id
            FROM picks
            WHERE pick_id = ?
            "#,
        )
        .bind(pick_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(pick_from_row).transpose()
    }

    /// Delete a pick, refusing while a settlement for it exists.
    pub async fn delete_pick(&self, pick_id: PickId) -> Result<PickDeletion, sqlx::Error> {
        let graded: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM results WHERE pick_id = ?")
            .bind(pick_id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        if graded.is_some() {
            return Ok(PickDeletion::Graded);
        }

        let result = sqlx::query("DELETE FROM picks WHERE pick_id = ?")
            .bind(pick_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(if result.rows_affected() > 0 {
            PickDeletion::Deleted
        } else {
            PickDeletion::NotFound
        })
    }
}

/// Shared row decoder for the pick column set.
pub(super) fn pick_from_row(row: &SqliteRow) -> Result<Pick, sqlx::Error> {
    let pick_id: String = row.get("pick_id");
    let pick_id = PickId::from_str(&pick_id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
    let game_id: Option<String> = row.get("game_id");

    Ok(Pick {
        pick_id,
        user_id: UserId::new(row.get("user_id")),
        week: WeekScope::new(row.get("season"), row.get("week")),
        team: row.get("team"),
        player_name: row.get("player_name"),
        position: row.get("position"),
        american_odds: row.get("american_odds"),
        game_id: game_id.map(GameId::new),
    })
}
