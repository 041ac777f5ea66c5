//! Per-game outcome facts supplied by the external scores feed.

use crate::domain::GameId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What actually happened in one game, as far as grading cares.
///
/// Read-only input: the engine never computes or corrects these. The
/// first-TD scorer, when present, is expected to also appear in
/// `any_time_scorers` (a first TD is by definition an any-time TD).
/// `any_time_scorers` is a BTreeSet so candidate iteration order is
/// deterministic across grading runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeFact {
    pub game_id: GameId,
    /// None while the game has not produced a touchdown yet.
    pub first_td_scorer: Option<String>,
    pub any_time_scorers: BTreeSet<String>,
}

impl OutcomeFact {
    pub fn new(
        game_id: GameId,
        first_td_scorer: Option<String>,
        any_time_scorers: BTreeSet<String>,
    ) -> Self {
        let mut fact = OutcomeFact {
            game_id,
            first_td_scorer,
            any_time_scorers,
        };
        // Normalize the superset invariant rather than trusting the feed.
        if let Some(first) = fact.first_td_scorer.clone() {
            fact.any_time_scorers.insert(first);
        }
        fact
    }

    /// True once at least one touchdown has been recorded.
    pub fn has_first_td(&self) -> bool {
        self.first_td_scorer.is_some()
    }
}
