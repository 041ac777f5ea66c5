use axum::http::StatusCode;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tdpool::api::{self, AppState};
use tdpool::config::Config;
use tdpool::datasource::MockOutcomeSource;
use tdpool::db::init_db;
use tdpool::domain::{GameId, OutcomeFact, WeekScope};
use tdpool::engine::{GradingEngine, LeaderboardAggregator, LeaderboardCache, NameMatcher};
use tdpool::{Decimal, Repository};
use tempfile::TempDir;
use tower::util::ServiceExt;

struct TestApp {
    app: axum::Router,
    outcomes: Arc<MockOutcomeSource>,
    _temp: TempDir,
}

async fn setup_test_app(pool_users: Vec<String>) -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");

    let repo = Arc::new(Repository::new(pool));
    let outcomes = Arc::new(MockOutcomeSource::new());
    let config = Config {
        port: 0,
        database_path: ":memory:".to_string(),
        sportsfeed_api_url: "http://example.invalid".to_string(),
        match_threshold: 0.75,
        stake: "1".to_string(),
        leaderboard_cache_ttl_ms: 60_000,
        pool_users,
    };
    let engine = Arc::new(GradingEngine::new(
        repo.clone(),
        outcomes.clone(),
        NameMatcher::default(),
        Decimal::one(),
    ));
    let aggregator = Arc::new(LeaderboardAggregator::new(repo.clone()));
    let cache = Arc::new(LeaderboardCache::new(Duration::from_millis(60_000)));

    let state = AppState::new(repo, config, engine, aggregator, cache);
    let app = api::create_router(state);

    TestApp {
        app,
        outcomes,
        _temp: temp_dir,
    }
}

async fn request(
    app: axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = axum::http::Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            axum::body::Body::from(json.to_string())
        }
        None => axum::body::Body::empty(),
    };

    let res = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, value)
}

async fn create_pick(app: &axum::Router, user: &str, week: i32, name: &str, odds: i32, game: &str) {
    let (status, _) = request(
        app.clone(),
        "POST",
        "/v1/picks",
        Some(serde_json::json!({
            "userId": user,
            "season": 2025,
            "week": week,
            "team": "KC",
            "playerName": name,
            "americanOdds": odds,
            "gameId": game
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

fn set_week_outcome(outcomes: &MockOutcomeSource, week: i32, game: &str, first: &str, any: &[&str]) {
    outcomes.set_outcome(
        WeekScope::new(2025, week),
        OutcomeFact::new(
            GameId::new(game.to_string()),
            Some(first.to_string()),
            any.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
        ),
    );
}

async fn grade(app: &axum::Router, week: i32) {
    let (status, _) = request(
        app.clone(),
        "POST",
        &format!("/v1/grade?season=2025&week={}", week),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_ordering_and_tie_breaks() {
    let test_app = setup_test_app(vec![]).await;

    // dave and erin both hit the first TD; dave's longer odds break the tie.
    create_pick(&test_app.app, "dave", 1, "Kelce", 300, "g1").await;
    create_pick(&test_app.app, "erin", 1, "Travis Kelce", 120, "g1").await;
    // Two identical losers fall back to name order.
    create_pick(&test_app.app, "zed", 1, "Diggs", 200, "g1").await;
    create_pick(&test_app.app, "adam", 1, "Diggs", 200, "g1").await;
    set_week_outcome(&test_app.outcomes, 1, "g1", "Travis Kelce", &["Travis Kelce"]);
    grade(&test_app.app, 1).await;

    let (status, body) = request(test_app.app.clone(), "GET", "/v1/leaderboard", None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 4);

    assert_eq!(entries[0]["userId"], "dave");
    assert_eq!(entries[0]["rank"], 1);
    assert_eq!(entries[0]["points"], 4);
    assert_eq!(entries[0]["totalReturn"], 3.0);
    assert_eq!(entries[0]["winRate"], 1.0);

    assert_eq!(entries[1]["userId"], "erin");
    assert_eq!(entries[1]["points"], 4);
    assert_eq!(entries[1]["totalReturn"], 1.2);

    assert_eq!(entries[2]["userId"], "adam");
    assert_eq!(entries[3]["userId"], "zed");
    assert_eq!(entries[3]["points"], 0);
    assert_eq!(entries[3]["totalReturn"], -1.0);
    assert_eq!(entries[3]["losses"], 1);
}

#[tokio::test]
async fn test_ungraded_picks_count_but_do_not_score() {
    let test_app = setup_test_app(vec![]).await;
    create_pick(&test_app.app, "dave", 1, "Kelce", 120, "g1").await;

    let (status, body) = request(test_app.app.clone(), "GET", "/v1/leaderboard", None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["totalPicks"], 1);
    assert_eq!(entries[0]["wins"], 0);
    assert_eq!(entries[0]["points"], 0);
    assert_eq!(entries[0]["totalReturn"], 0.0);
}

#[tokio::test]
async fn test_week_scoping() {
    let test_app = setup_test_app(vec![]).await;
    create_pick(&test_app.app, "dave", 1, "Kelce", 120, "g1").await;
    create_pick(&test_app.app, "dave", 2, "Diggs", 200, "g2").await;
    set_week_outcome(&test_app.outcomes, 1, "g1", "Travis Kelce", &["Travis Kelce"]);
    set_week_outcome(&test_app.outcomes, 2, "g2", "Stefon Diggs", &["Stefon Diggs"]);
    grade(&test_app.app, 1).await;
    grade(&test_app.app, 2).await;

    let (_, week_one) = request(
        test_app.app.clone(),
        "GET",
        "/v1/leaderboard?season=2025&week=1",
        None,
    )
    .await;
    assert_eq!(week_one[0]["totalPicks"], 1);
    assert_eq!(week_one[0]["points"], 4);

    // Season-wide view sums both weeks.
    let (_, all) = request(test_app.app.clone(), "GET", "/v1/leaderboard", None).await;
    assert_eq!(all[0]["totalPicks"], 2);
    assert_eq!(all[0]["points"], 8);

    let (status, _) = request(
        test_app.app.clone(),
        "GET",
        "/v1/leaderboard?season=2025",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_include_empty_fills_roster() {
    let test_app =
        setup_test_app(vec!["dave".to_string(), "erin".to_string(), "zed".to_string()]).await;
    create_pick(&test_app.app, "dave", 1, "Kelce", 120, "g1").await;
    set_week_outcome(&test_app.outcomes, 1, "g1", "Travis Kelce", &["Travis Kelce"]);
    grade(&test_app.app, 1).await;

    let (_, active_only) = request(test_app.app.clone(), "GET", "/v1/leaderboard", None).await;
    assert_eq!(active_only.as_array().unwrap().len(), 1);

    let (status, body) = request(
        test_app.app.clone(),
        "GET",
        "/v1/leaderboard?includeEmpty=true",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["userId"], "dave");
    // Zero-valued members sit at the bottom, ordered by name.
    assert_eq!(entries[1]["userId"], "erin");
    assert_eq!(entries[1]["totalPicks"], 0);
    assert_eq!(entries[1]["points"], 0);
    assert_eq!(entries[2]["userId"], "zed");
}

#[tokio::test]
async fn test_cache_invalidated_by_grading_and_clearing() {
    let test_app = setup_test_app(vec![]).await;
    create_pick(&test_app.app, "dave", 1, "Kelce", 120, "g1").await;
    set_week_outcome(&test_app.outcomes, 1, "g1", "Travis Kelce", &["Travis Kelce"]);

    // Prime the cache before any grading.
    let (_, before) = request(test_app.app.clone(), "GET", "/v1/leaderboard", None).await;
    assert_eq!(before[0]["points"], 0);

    grade(&test_app.app, 1).await;
    let (_, after) = request(test_app.app.clone(), "GET", "/v1/leaderboard", None).await;
    assert_eq!(after[0]["points"], 4);

    let (status, _) = request(
        test_app.app.clone(),
        "DELETE",
        "/v1/results?season=2025",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, cleared) = request(test_app.app.clone(), "GET", "/v1/leaderboard", None).await;
    assert_eq!(cleared[0]["points"], 0);
    assert_eq!(cleared[0]["totalPicks"], 1);
}

#[tokio::test]
async fn test_empty_leaderboard() {
    let test_app = setup_test_app(vec![]).await;
    let (status, body) = request(test_app.app.clone(), "GET", "/v1/leaderboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}
