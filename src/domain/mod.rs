//! Domain types for the first-TD prediction pool.
//!
//! This module provides:
//! - Lossless monetary handling via the Decimal wrapper
//! - Domain primitives: WeekScope, UserId, PickId, GameId
//! - Pick, OutcomeFact and Settlement records
//! - Derived LeaderboardEntry view types

pub mod decimal;
pub mod leaderboard;
pub mod outcome;
pub mod pick;
pub mod primitives;
pub mod settlement;

pub use decimal::Decimal;
pub use leaderboard::LeaderboardEntry;
pub use outcome::OutcomeFact;
pub use pick::{player_key, Pick};
pub use primitives::{GameId, PickId, UserId, WeekScope};
pub use settlement::Settlement;
