//! Settlement records: the grading engine's sole write target.

use crate::domain::{Decimal, PickId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The settled verdict for one pick. Exactly one per pick, ever; re-grading
/// overwrites in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    pub pick_id: PickId,
    /// The scorer name the pick was judged against, null when nothing
    /// cleared the matching threshold (or no TD has been scored yet).
    pub actual_scorer: Option<String>,
    /// None means pending: the game exists but has no touchdown yet.
    pub is_correct: Option<bool>,
    /// The picked player scored at some point, first or not.
    pub any_time_td: bool,
    /// Realized unit-stake return. Zero while pending.
    pub actual_return: Decimal,
    pub graded_at: DateTime<Utc>,
}

impl Settlement {
    pub fn new(
        pick_id: PickId,
        actual_scorer: Option<String>,
        is_correct: Option<bool>,
        any_time_td: bool,
        actual_return: Decimal,
        graded_at: DateTime<Utc>,
    ) -> Self {
        Settlement {
            pick_id,
            actual_scorer,
            is_correct,
            any_time_td,
            actual_return,
            graded_at,
        }
    }

    /// Still awaiting a first touchdown in the referenced game.
    pub fn is_pending(&self) -> bool {
        self.is_correct.is_none()
    }

    /// Equality ignoring the grading timestamp, used to assert idempotence.
    pub fn same_verdict(&self, other: &Settlement) -> bool {
        self.pick_id == other.pick_id
            && self.actual_scorer == other.actual_scorer
            && self.is_correct == other.is_correct
            && self.any_time_td == other.any_time_td
            && self.actual_return == other.actual_return
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_same_verdict_ignores_timestamp() {
        let pick_id = PickId::generate();
        let a = Settlement::new(
            pick_id,
            Some("Travis Kelce".to_string()),
            Some(true),
            true,
            Decimal::from_str("1.2").unwrap(),
            Utc::now(),
        );
        let mut b = a.clone();
        b.graded_at = b.graded_at + chrono::Duration::seconds(60);
        assert!(a.same_verdict(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_pending_state() {
        let s = Settlement::new(PickId::generate(), None, None, false, Decimal::zero(), Utc::now());
        assert!(s.is_pending());
    }
}
