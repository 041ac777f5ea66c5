//! Outcome-fact sources: the boundary to the external scores feed.
//!
//! The engine only ever reads `OutcomeFact`s; how they were assembled
//! (play-by-play parsing, roster mapping) is the feed's problem.

use crate::domain::{GameId, OutcomeFact, WeekScope};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

pub mod mock;
pub mod sportsfeed;

pub use mock::MockOutcomeSource;
pub use sportsfeed::SportsFeedSource;

/// Supplies per-game outcome facts for a week.
///
/// Implementations handle retry/backoff and rate limiting; a game absent
/// from the returned map means "no outcome recorded yet", never an error.
#[async_trait]
pub trait OutcomeSource: Send + Sync + fmt::Debug {
    async fn fetch_outcomes(
        &self,
        scope: WeekScope,
    ) -> Result<HashMap<GameId, OutcomeFact>, OutcomeSourceError>;
}

/// Error type for outcome feed operations.
#[derive(Debug, Clone, Error)]
pub enum OutcomeSourceError {
    #[error("network error: {0}")]
    Network(String),
    #[error("http error {status}: {message}")]
    Http { status: u16, message: String },
    #[error("parse error: {0}")]
    Parse(String),
    #[error("rate limited")]
    RateLimited,
    #[error("{0}")]
    Other(String),
}
