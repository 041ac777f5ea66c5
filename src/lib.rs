pub mod api;
pub mod config;
pub mod datasource;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;

pub use config::Config;
pub use datasource::{MockOutcomeSource, OutcomeSource, OutcomeSourceError, SportsFeedSource};
pub use db::{init_db, Repository, SettlementStore};
pub use domain::{
    Decimal, GameId, LeaderboardEntry, OutcomeFact, Pick, PickId, Settlement, UserId, WeekScope,
};
pub use engine::{
    GradingEngine, GradingSummary, LeaderboardAggregator, LeaderboardCache, NameMatcher, UserScope,
};
pub use error::AppError;
