//! Mock outcome source for testing without network calls.

use super::{OutcomeSource, OutcomeSourceError};
use crate::domain::{GameId, OutcomeFact, WeekScope};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory outcome source returning predefined facts per week.
#[derive(Debug, Default)]
pub struct MockOutcomeSource {
    weeks: Mutex<HashMap<WeekScope, HashMap<GameId, OutcomeFact>>>,
    fail_with: Mutex<Option<OutcomeSourceError>>,
}

impl MockOutcomeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or replace) the fact for one game in a week.
    pub fn set_outcome(&self, scope: WeekScope, fact: OutcomeFact) {
        let mut weeks = self.weeks.lock().expect("mock outcome lock poisoned");
        weeks
            .entry(scope)
            .or_default()
            .insert(fact.game_id.clone(), fact);
    }

    /// Make every subsequent fetch fail, to exercise collaborator-failure
    /// paths.
    pub fn fail_with(&self, error: OutcomeSourceError) {
        *self.fail_with.lock().expect("mock outcome lock poisoned") = Some(error);
    }
}

#[async_trait]
impl OutcomeSource for MockOutcomeSource {
    async fn fetch_outcomes(
        &self,
        scope: WeekScope,
    ) -> Result<HashMap<GameId, OutcomeFact>, OutcomeSourceError> {
        if let Some(err) = self.fail_with.lock().expect("mock outcome lock poisoned").clone() {
            return Err(err);
        }
        let weeks = self.weeks.lock().expect("mock outcome lock poisoned");
        Ok(weeks.get(&scope).cloned().unwrap_or_default())
    }
}
