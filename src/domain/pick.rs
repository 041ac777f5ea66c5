//! A user's first-touchdown-scorer prediction.

use crate::domain::{GameId, PickId, UserId, WeekScope};
use serde::{Deserialize, Serialize};

/// One prediction: a player to score the first touchdown of a game.
///
/// `player_name` is free text exactly as the user entered it; matching
/// against actual scorers is the grading engine's job, never mutated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pick {
    pub pick_id: PickId,
    pub user_id: UserId,
    pub week: WeekScope,
    pub team: String,
    pub player_name: String,
    pub position: Option<String>,
    pub american_odds: Option<i32>,
    pub game_id: Option<GameId>,
}

impl Pick {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pick_id: PickId,
        user_id: UserId,
        week: WeekScope,
        team: String,
        player_name: String,
        position: Option<String>,
        american_odds: Option<i32>,
        game_id: Option<GameId>,
    ) -> Self {
        Pick {
            pick_id,
            user_id,
            week,
            team,
            player_name,
            position,
            american_odds,
            game_id,
        }
    }

    /// Normalized form of the player name used for the one-pick-per-player
    /// uniqueness constraint ("Kelce " and "kelce" are the same pick).
    pub fn player_key(&self) -> String {
        player_key(&self.player_name)
    }
}

/// Lowercased, whitespace-collapsed player name key.
pub fn player_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
