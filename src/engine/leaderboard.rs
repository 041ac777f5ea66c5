//! Read-side standings reducer over settlement records.
//!
//! Aggregation is pure: it never writes, and a leaderboard computed while a
//! grading run is in flight simply reflects the partially-graded state.

use crate::db::SettlementStore;
use crate::domain::{Decimal, LeaderboardEntry, UserId, WeekScope};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Points for picking the first TD scorer. Additive with the any-time
/// bonus: a first-TD hit is worth 4 in total.
pub const FIRST_TD_POINTS: i64 = 3;
/// Points for the picked player scoring at any point in the game.
pub const ANY_TIME_TD_POINTS: i64 = 1;

/// One pick joined with its settlement, as fetched by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct PickResultRow {
    pub user_id: UserId,
    pub american_odds: Option<i32>,
    pub settlement: Option<SettledFields>,
}

/// Settlement columns the reducer needs.
#[derive(Debug, Clone, PartialEq)]
pub struct SettledFields {
    pub is_correct: Option<bool>,
    pub any_time_td: bool,
    pub actual_return: Decimal,
}

/// Which users appear in the output.
#[derive(Debug, Clone, PartialEq)]
pub enum UserScope {
    /// Only users with at least one pick in scope.
    ActiveOnly,
    /// Every listed user, zero-valued entries included.
    Roster(Vec<UserId>),
}

pub struct LeaderboardAggregator {
    store: Arc<dyn SettlementStore>,
}

impl LeaderboardAggregator {
    pub fn new(store: Arc<dyn SettlementStore>) -> Self {
        Self { store }
    }

    /// Standings over all picks, optionally scoped to one week.
    pub async fn leaderboard(
        &self,
        week: Option<WeekScope>,
        scope: UserScope,
    ) -> Result<Vec<LeaderboardEntry>, sqlx::Error> {
        let rows = self.store.fetch_pick_results(week).await?;
        Ok(reduce(&rows, scope))
    }
}

#[derive(Default)]
struct UserAcc {
    total_picks: i64,
    wins: i64,
    losses: i64,
    any_time_td_wins: i64,
    total_return: Decimal,
    odds_sum: i64,
    odds_count: i64,
}

/// Fold rows into ranked entries.
///
/// Ordering is deterministic: points descending, then total_return
/// descending, then user_id ascending as the stable final key.
pub fn reduce(rows: &[PickResultRow], scope: UserScope) -> Vec<LeaderboardEntry> {
    let mut by_user: BTreeMap<UserId, UserAcc> = BTreeMap::new();

    if let UserScope::Roster(users) = &scope {
        for user in users {
            by_user.entry(user.clone()).or_default();
        }
    }

    for row in rows {
        let acc = by_user.entry(row.user_id.clone()).or_default();
        acc.total_picks += 1;
        if let Some(odds) = row.american_odds {
            acc.odds_sum += odds as i64;
            acc.odds_count += 1;
        }
        let Some(settled) = &row.settlement else {
            continue; // ungraded picks contribute nothing but the count
        };
        match settled.is_correct {
            Some(true) => acc.wins += 1,
            Some(false) => acc.losses += 1,
            None => continue, // pending: no verdict, no payout yet
        }
        if settled.any_time_td {
            acc.any_time_td_wins += 1;
        }
        acc.total_return = acc.total_return + settled.actual_return;
    }

    let mut entries: Vec<LeaderboardEntry> = by_user
        .into_iter()
        .map(|(user_id, acc)| {
            let points = FIRST_TD_POINTS * acc.wins + ANY_TIME_TD_POINTS * acc.any_time_td_wins;
            let win_rate = if acc.total_picks > 0 {
                acc.wins as f64 / acc.total_picks as f64
            } else {
                0.0
            };
            let avg_odds = (acc.odds_count > 0)
                .then(|| acc.odds_sum as f64 / acc.odds_count as f64);
            LeaderboardEntry {
                user_id,
                total_picks: acc.total_picks,
                wins: acc.wins,
                losses: acc.losses,
                any_time_td_wins: acc.any_time_td_wins,
                points,
                win_rate,
                total_return: acc.total_return,
                avg_odds,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| b.total_return.cmp(&a.total_return))
            .then_with(|| a.user_id.as_str().cmp(b.user_id.as_str()))
    });

    entries
}

type CacheKey = (Option<WeekScope>, bool);

/// TTL memoization over the pure reducer, keyed by scope.
///
/// Not part of the engine contract: callers must invalidate on every
/// settlement write (grade runs and admin clears).
pub struct LeaderboardCache {
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, (Instant, Vec<LeaderboardEntry>)>>,
}

impl LeaderboardCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, week: Option<WeekScope>, include_empty: bool) -> Option<Vec<LeaderboardEntry>> {
        let guard = self.entries.lock().ok()?;
        let (stored_at, entries) = guard.get(&(week, include_empty))?;
        (stored_at.elapsed() < self.ttl).then(|| entries.clone())
    }

    pub fn put(
        &self,
        week: Option<WeekScope>,
        include_empty: bool,
        entries: Vec<LeaderboardEntry>,
    ) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.insert((week, include_empty), (Instant::now(), entries));
        }
    }

    /// Drop everything; called after any settlement write.
    pub fn invalidate_all(&self) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.clear();
        }
    }
}
