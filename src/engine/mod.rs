//! Settlement core: name matching, payout math, grading, standings.

pub mod grading;
pub mod leaderboard;
pub mod name_matcher;
pub mod payout;

pub use grading::{GradeOutcome, GradingEngine, GradingError, GradingSummary, PickError};
pub use leaderboard::{
    LeaderboardAggregator, LeaderboardCache, PickResultRow, SettledFields, UserScope,
};
pub use name_matcher::{NameMatcher, DEFAULT_THRESHOLD};
pub use payout::OddsError;
