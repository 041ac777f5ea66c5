pub mod admin;
pub mod grading;
pub mod health;
pub mod leaderboard;
pub mod picks;

use crate::config::Config;
use crate::db::Repository;
use crate::engine::{GradingEngine, LeaderboardAggregator, LeaderboardCache};
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Config,
    pub engine: Arc<GradingEngine>,
    pub aggregator: Arc<LeaderboardAggregator>,
    pub cache: Arc<LeaderboardCache>,
}

impl AppState {
    pub fn new(
        repo: Arc<Repository>,
        config: Config,
        engine: Arc<GradingEngine>,
        aggregator: Arc<LeaderboardAggregator>,
        cache: Arc<LeaderboardCache>,
    ) -> Self {
        Self {
            repo,
            config,
            engine,
            aggregator,
            cache,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/picks", get(picks::list_picks).post(picks::create_pick))
        .route("/v1/picks/:pick_id", delete(picks::delete_pick))
        .route("/v1/grade", post(grading::grade_week))
        .route("/v1/leaderboard", get(leaderboard::get_leaderboard))
        .route("/v1/results", delete(admin::clear_results))
        .layer(cors)
        .with_state(state)
}
