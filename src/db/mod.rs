//! Persistence layer: the SettlementStore capability and its SQLite impl.

pub mod migrations;
pub mod repo;

pub use migrations::init_db;
pub use repo::Repository;

use crate::domain::{Pick, Settlement, WeekScope};
use crate::engine::leaderboard::PickResultRow;
use async_trait::async_trait;

/// Everything the grading engine and aggregator need from persistence.
///
/// The `results` table carries a uniqueness guarantee on pick_id;
/// `upsert_result` converts would-be duplicate settlements into in-place
/// updates, which is the exactly-once-settlement invariant.
#[async_trait]
pub trait SettlementStore: Send + Sync {
    /// Picks in the week with no settlement, or a pending one
    /// (`is_correct` still NULL).
    async fn find_ungraded(&self, scope: WeekScope) -> Result<Vec<Pick>, sqlx::Error>;

    /// Insert-or-update the settlement for its pick.
    async fn upsert_result(&self, settlement: &Settlement) -> Result<(), sqlx::Error>;

    /// Admin override: delete settlements (never picks) for a season, or a
    /// single week of it. Returns the number removed.
    async fn delete_results(&self, season: i32, week: Option<i32>) -> Result<u64, sqlx::Error>;

    /// Read side for the aggregator: picks joined with their optional
    /// settlement, optionally scoped to one week.
    async fn fetch_pick_results(
        &self,
        week: Option<WeekScope>,
    ) -> Result<Vec<PickResultRow>, sqlx::Error>;
}
