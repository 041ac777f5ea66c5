//! Settlement persistence: the exactly-once upsert and the read queries
//! behind grading and standings.

use super::picks::pick_from_row;
use super::Repository;
use crate::domain::{Decimal, Pick, PickId, Settlement, UserId, WeekScope};
use crate::engine::leaderboard::{PickResultRow, SettledFields};
use chrono::{DateTime, Utc};
use sqlx::Row;
use std::str::FromStr;
use tracing::warn;

impl Repository {
    /// Picks in scope that have never been settled, plus those whose
    /// settlement is still pending (no first TD when last graded).
    pub async fn find_ungraded(&self, scope: WeekScope) -> Result<Vec<Pick>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT p.pick_id, p.user_id, p.season, p.week, p.team, p.player_name,
                   p.position, p.american_odds, p.game_id
            FROM picks p
            LEFT JOIN results r ON r.pick_id = p.pick_id
            WHERE p.season = ? AND p.week = ?
              AND (r.pick_id IS NULL OR r.is_correct IS NULL)
            ORDER BY p.created_at ASC, p.pick_id ASC
            "#,
        )
        .bind(scope.season)
        .bind(scope.week)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(pick_from_row).collect()
    }

    /// Insert-or-overwrite the settlement for a pick. The conflict target is
    /// the results primary key, so grading the same pick twice can only ever
    /// update in place.
    pub async fn upsert_result(&self, settlement: &Settlement) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO results (pick_id, actual_scorer, is_correct, any_time_td, actual_return, graded_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(pick_id) DO UPDATE SET
                actual_scorer = excluded.actual_scorer,
                is_correct = excluded.is_correct,
                any_time_td = excluded.any_time_td,
                actual_return = excluded.actual_return,
                graded_at = excluded.graded_at
            "#,
        )
        .bind(settlement.pick_id.to_string())
        .bind(settlement.actual_scorer.as_deref())
        .bind(settlement.is_correct)
        .bind(settlement.any_time_td)
        .bind(settlement.actual_return.to_canonical_string())
        .bind(settlement.graded_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_result(&self, pick_id: PickId) -> Result<Option<Settlement>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT pick_id, actual_scorer, is_correct, any_time_td, actual_return, graded_at
            FROM results
            WHERE pick_id = ?
            "#,
        )
        .bind(pick_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let pick_id: String = row.get("pick_id");
        let pick_id = PickId::from_str(&pick_id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        let graded_ms: i64 = row.get("graded_at");
        let graded_at = DateTime::<Utc>::from_timestamp_millis(graded_ms).unwrap_or_else(|| {
            warn!(pick_id = %pick_id, graded_ms, "graded_at out of range, substituting now");
            Utc::now()
        });

        Ok(Some(Settlement {
            pick_id,
            actual_scorer: row.get("actual_scorer"),
            is_correct: row.get("is_correct"),
            any_time_td: row.get("any_time_td"),
            actual_return: parse_return(&row.get::<String, _>("actual_return"), pick_id),
            graded_at,
        }))
    }

    /// Admin undo: remove settlements for a season, or one week of it.
    /// Picks are untouched and become gradeable again.
    pub async fn delete_results(
        &self,
        season: i32,
        week: Option<i32>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM results
            WHERE pick_id IN (
                SELECT pick_id FROM picks
                WHERE season = ? AND (? IS NULL OR week = ?)
            )
            "#,
        )
        .bind(season)
        .bind(week)
        .bind(week)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Picks joined with their optional settlement, for the aggregator.
    pub async fn fetch_pick_results(
        &self,
        week: Option<WeekScope>,
    ) -> Result<Vec<PickResultRow>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT p.pick_id, p.user_id, p.american_odds,
                   r.pick_id AS result_pick_id, r.is_correct, r.any_time_td, r.actual_return
            FROM picks p
            LEFT JOIN results r ON r.pick_id = p.pick_id
            WHERE ? IS NULL OR (p.season = ? AND p.week = ?)
            ORDER BY p.user_id ASC, p.created_at ASC, p.pick_id ASC
            "#,
        )
        .bind(week.map(|w| w.season))
        .bind(week.map(|w| w.season))
        .bind(week.map(|w| w.week))
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let settled: Option<String> = row.get("result_pick_id");
            let settlement = settled.map(|pick_id| SettledFields {
                is_correct: row.get("is_correct"),
                any_time_td: row.get("any_time_td"),
                actual_return: parse_return(
                    &row.get::<String, _>("actual_return"),
                    PickId::from_str(&pick_id).unwrap_or_else(|_| PickId::generate()),
                ),
            });
            out.push(PickResultRow {
                user_id: UserId::new(row.get("user_id")),
                american_odds: row.get("american_odds"),
                settlement,
            });
        }

        Ok(out)
    }
}

fn parse_return(raw: &str, pick_id: PickId) -> Decimal {
    Decimal::from_str_canonical(raw).unwrap_or_else(|e| {
        warn!(pick_id = %pick_id, raw, error = %e, "failed to parse stored return, using zero");
        Decimal::zero()
    })
}
