//! SQLite repository implementing the SettlementStore capability.
//!
//! Methods are organized across submodules by domain:
//! - `picks.rs` - pick CRUD
//! - `results.rs` - settlement upserts, grading queries, standings rows

mod picks;
mod results;

pub use picks::PickDeletion;

use crate::db::SettlementStore;
use crate::domain::{Pick, Settlement, WeekScope};
use crate::engine::leaderboard::PickResultRow;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Cheap liveness probe for the readiness endpoint.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await.map(|_| ())
    }
}

#[async_trait]
impl SettlementStore for Repository {
    async fn find_ungraded(&self, scope: WeekScope) -> Result<Vec<Pick>, sqlx::Error> {
        Repository::find_ungraded(self, scope).await
    }

    async fn upsert_result(&self, settlement: &Settlement) -> Result<(), sqlx::Error> {
        Repository::upsert_result(self, settlement).await
    }

    async fn delete_results(&self, season: i32, week: Option<i32>) -> Result<u64, sqlx::Error> {
        Repository::delete_results(self, season, week).await
    }

    async fn fetch_pick_results(
        &self,
        week: Option<WeekScope>,
    ) -> Result<Vec<PickResultRow>, sqlx::Error> {
        Repository::fetch_pick_results(self, week).await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::db::init_db;
    use tempfile::TempDir;

    pub async fn setup_test_db() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (Repository::new(pool), temp_dir)
    }
}
