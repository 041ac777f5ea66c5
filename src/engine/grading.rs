//! Batch settlement of picks against per-game outcome facts.
//!
//! Grading is a finite synchronous batch over one week's picks. Every
//! settlement write is an idempotent upsert keyed on pick_id, so re-running
//! a week (or racing a duplicate run) converges to the same final state.

use crate::datasource::{OutcomeSource, OutcomeSourceError};
use crate::db::SettlementStore;
use crate::domain::{Decimal, GameId, OutcomeFact, Pick, PickId, Settlement, WeekScope};
use crate::engine::name_matcher::NameMatcher;
use crate::engine::payout::{self, OddsError};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Per-pick grading decision: a missing outcome fact is an expected state,
/// not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum GradeOutcome {
    /// The referenced game has no outcome fact yet; the pick stays ungraded.
    NotYetGradeable,
    Graded(Settlement),
}

/// Failure isolated to a single pick. Never aborts the batch.
#[derive(Debug, Error)]
pub enum PickError {
    #[error("pick has no game reference")]
    MissingGame,
    #[error(transparent)]
    Odds(#[from] OddsError),
    #[error("settlement store error: {0}")]
    Store(#[from] sqlx::Error),
}

/// Failure to obtain the batch inputs; aborts the whole grade_week call.
#[derive(Debug, Error)]
pub enum GradingError {
    #[error("settlement store error: {0}")]
    Store(#[from] sqlx::Error),
    #[error("outcome feed error: {0}")]
    Outcomes(#[from] OutcomeSourceError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickGradingError {
    pub pick_id: PickId,
    pub message: String,
}

/// What a grading run did. `errors` is the sole surface for partial
/// failures; the batch itself always completes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingSummary {
    /// Settlements written with a final verdict this run.
    pub total_graded: u64,
    pub correct_first_td_count: u64,
    pub correct_any_time_td_count: u64,
    /// Verdicts where no scorer name cleared the matching threshold.
    pub failed_to_match_count: u64,
    /// Picks left without a verdict: no outcome fact, or no TD scored yet.
    pub skipped_pending: u64,
    pub errors: Vec<PickGradingError>,
}

pub struct GradingEngine {
    store: Arc<dyn SettlementStore>,
    outcomes: Arc<dyn OutcomeSource>,
    matcher: NameMatcher,
    stake: Decimal,
}

impl GradingEngine {
    pub fn new(
        store: Arc<dyn SettlementStore>,
        outcomes: Arc<dyn OutcomeSource>,
        matcher: NameMatcher,
        stake: Decimal,
    ) -> Self {
        Self {
            store,
            outcomes,
            matcher,
            stake,
        }
    }

    /// Grade every ungraded (or still-pending) pick in the given week.
    ///
    /// Per-pick failures are collected into the summary and grading
    /// continues; only a collaborator failure aborts.
    pub async fn grade_week(&self, season: i32, week: i32) -> Result<GradingSummary, GradingError> {
        let scope = WeekScope::new(season, week);
        let picks = self.store.find_ungraded(scope).await?;
        let facts = self.outcomes.fetch_outcomes(scope).await?;

        info!(
            season,
            week,
            picks = picks.len(),
            games = facts.len(),
            "grading week"
        );

        let mut summary = GradingSummary::default();
        for pick in &picks {
            match self.grade_and_store(pick, &facts).await {
                Ok(GradeOutcome::NotYetGradeable) => {
                    debug!(pick_id = %pick.pick_id, "no outcome fact yet, leaving ungraded");
                    summary.skipped_pending += 1;
                }
                Ok(GradeOutcome::Graded(settlement)) => summary.record(&settlement),
                Err(e) => {
                    warn!(pick_id = %pick.pick_id, error = %e, "pick failed to grade");
                    summary.errors.push(PickGradingError {
                        pick_id: pick.pick_id,
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            season,
            week,
            graded = summary.total_graded,
            pending = summary.skipped_pending,
            errors = summary.errors.len(),
            "grading week complete"
        );
        Ok(summary)
    }

    async fn grade_and_store(
        &self,
        pick: &Pick,
        facts: &HashMap<GameId, OutcomeFact>,
    ) -> Result<GradeOutcome, PickError> {
        let game_id = pick.game_id.as_ref().ok_or(PickError::MissingGame)?;
        let Some(fact) = facts.get(game_id) else {
            return Ok(GradeOutcome::NotYetGradeable);
        };

        let settlement = self.grade_pick(pick, fact)?;
        self.store.upsert_result(&settlement).await?;
        Ok(GradeOutcome::Graded(settlement))
    }

    /// Settle a single pick against one game's facts. Pure except for the
    /// timestamp; also the entry point for ad-hoc manual correction.
    pub fn grade_pick(&self, pick: &Pick, fact: &OutcomeFact) -> Result<Settlement, PickError> {
        if let Some(odds) = pick.american_odds {
            payout::validate_odds(odds)?;
        }

        let Some(first_td_scorer) = fact.first_td_scorer.as_deref() else {
            // Game exists but nobody has scored: pending verdict, no payout.
            let any_time_td = fact
                .any_time_scorers
                .iter()
                .any(|s| self.matcher.matches(&pick.player_name, s));
            return Ok(Settlement::new(
                pick.pick_id,
                None,
                None,
                any_time_td,
                Decimal::zero(),
                Utc::now(),
            ));
        };

        let is_correct = self.matcher.matches(&pick.player_name, first_td_scorer);
        // First-TD implies any-time by definition; normalize even if the
        // feed's any-time set disagrees.
        let any_time_td = is_correct
            || fact
                .any_time_scorers
                .iter()
                .any(|s| self.matcher.matches(&pick.player_name, s));

        let actual_scorer = self
            .matcher
            .best_candidate(
                &pick.player_name,
                Some(first_td_scorer),
                fact.any_time_scorers.iter().map(String::as_str),
            )
            .map(str::to_string);

        let actual_return = payout::realized_return(pick.american_odds, is_correct, self.stake);

        Ok(Settlement::new(
            pick.pick_id,
            actual_scorer,
            Some(is_correct),
            any_time_td,
            actual_return,
            Utc::now(),
        ))
    }
}

impl GradingSummary {
    fn record(&mut self, settlement: &Settlement) {
        match settlement.is_correct {
            None => {
                self.skipped_pending += 1;
                return;
            }
            Some(true) => self.correct_first_td_count += 1,
            Some(false) => {}
        }
        self.total_graded += 1;
        if settlement.any_time_td {
            self.correct_any_time_td_count += 1;
        }
        if settlement.actual_scorer.is_none() && !settlement.any_time_td {
            self.failed_to_match_count += 1;
        }
    }
}
