//! Derived standings types. Never persisted; always recomputed.

use crate::domain::{Decimal, UserId};
use serde::Serialize;

/// Per-user standing, derived from that user's picks joined with results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: UserId,
    pub total_picks: i64,
    pub wins: i64,
    pub losses: i64,
    pub any_time_td_wins: i64,
    pub points: i64,
    pub win_rate: f64,
    pub total_return: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_odds: Option<f64>,
}

impl LeaderboardEntry {
    /// Zero-valued entry for a user with no picks in scope.
    pub fn empty(user_id: UserId) -> Self {
        LeaderboardEntry {
            user_id,
            total_picks: 0,
            wins: 0,
            losses: 0,
            any_time_td_wins: 0,
            points: 0,
            win_rate: 0.0,
            total_return: Decimal::zero(),
            avg_odds: None,
        }
    }
}
