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

async fn setup_test_app() -> TestApp {
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
        pool_users: vec![],
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

async fn create_pick(app: &axum::Router, user: &str, name: &str, odds: i32, game: &str) {
    let (status, _) = request(
        app.clone(),
        "POST",
        "/v1/picks",
        Some(serde_json::json!({
            "userId": user,
            "season": 2025,
            "week": 1,
            "team": "KC",
            "playerName": name,
            "americanOdds": odds,
            "gameId": game
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_grade_week_returns_summary() {
    let test_app = setup_test_app().await;
    create_pick(&test_app.app, "dave", "Kelce", 120, "g1").await;
    create_pick(&test_app.app, "erin", "Diggs", 250, "g1").await;
    test_app.outcomes.set_outcome(
        WeekScope::new(2025, 1),
        OutcomeFact::new(
            GameId::new("g1".to_string()),
            Some("Travis Kelce".to_string()),
            ["Travis Kelce".to_string(), "Stefon Diggs".to_string()]
                .into_iter()
                .collect::<BTreeSet<_>>(),
        ),
    );

    let (status, body) = request(
        test_app.app.clone(),
        "POST",
        "/v1/grade?season=2025&week=1",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalGraded"], 2);
    assert_eq!(body["correctFirstTdCount"], 1);
    assert_eq!(body["correctAnyTimeTdCount"], 2);
    assert_eq!(body["errors"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_grade_week_is_idempotent() {
    let test_app = setup_test_app().await;
    create_pick(&test_app.app, "dave", "Kelce", 120, "g1").await;
    test_app.outcomes.set_outcome(
        WeekScope::new(2025, 1),
        OutcomeFact::new(
            GameId::new("g1".to_string()),
            Some("Travis Kelce".to_string()),
            BTreeSet::new(),
        ),
    );

    let (_, first) = request(
        test_app.app.clone(),
        "POST",
        "/v1/grade?season=2025&week=1",
        None,
    )
    .await;
    assert_eq!(first["totalGraded"], 1);

    let (status, second) = request(
        test_app.app.clone(),
        "POST",
        "/v1/grade?season=2025&week=1",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["totalGraded"], 0);
}

#[tokio::test]
async fn test_grade_week_surfaces_pick_errors() {
    let test_app = setup_test_app().await;
    create_pick(&test_app.app, "dave", "Kelce", 120, "g1").await;
    // No gameId: cannot be matched to an outcome.
    let (status, _) = request(
        test_app.app.clone(),
        "POST",
        "/v1/picks",
        Some(serde_json::json!({
            "userId": "erin",
            "season": 2025,
            "week": 1,
            "team": "BUF",
            "playerName": "Allen"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    test_app.outcomes.set_outcome(
        WeekScope::new(2025, 1),
        OutcomeFact::new(
            GameId::new("g1".to_string()),
            Some("Travis Kelce".to_string()),
            BTreeSet::new(),
        ),
    );

    let (status, body) = request(
        test_app.app.clone(),
        "POST",
        "/v1/grade?season=2025&week=1",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalGraded"], 1);
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0]["pickId"].is_string());
    assert!(errors[0]["message"].as_str().unwrap().contains("game"));
}

#[tokio::test]
async fn test_grade_week_validates_query() {
    let test_app = setup_test_app().await;

    let (status, _) = request(test_app.app.clone(), "POST", "/v1/grade", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request(
        test_app.app.clone(),
        "POST",
        "/v1/grade?season=2025&week=99",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_grade_fails_when_feed_is_down() {
    let test_app = setup_test_app().await;
    create_pick(&test_app.app, "dave", "Kelce", 120, "g1").await;
    test_app
        .outcomes
        .fail_with(tdpool::OutcomeSourceError::Network("feed down".to_string()));

    let (status, body) = request(
        test_app.app.clone(),
        "POST",
        "/v1/grade?season=2025&week=1",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_clear_results_then_regrade() {
    let test_app = setup_test_app().await;
    create_pick(&test_app.app, "dave", "Kelce", 120, "g1").await;
    test_app.outcomes.set_outcome(
        WeekScope::new(2025, 1),
        OutcomeFact::new(
            GameId::new("g1".to_string()),
            Some("Stefon Diggs".to_string()),
            BTreeSet::new(),
        ),
    );
    request(
        test_app.app.clone(),
        "POST",
        "/v1/grade?season=2025&week=1",
        None,
    )
    .await;

    let (status, body) = request(
        test_app.app.clone(),
        "DELETE",
        "/v1/results?season=2025&week=1",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 1);

    // Stat correction: Kelce had the first TD after all.
    test_app.outcomes.set_outcome(
        WeekScope::new(2025, 1),
        OutcomeFact::new(
            GameId::new("g1".to_string()),
            Some("Travis Kelce".to_string()),
            BTreeSet::new(),
        ),
    );
    let (_, summary) = request(
        test_app.app.clone(),
        "POST",
        "/v1/grade?season=2025&week=1",
        None,
    )
    .await;
    assert_eq!(summary["totalGraded"], 1);
    assert_eq!(summary["correctFirstTdCount"], 1);
}

#[tokio::test]
async fn test_clear_results_requires_season() {
    let test_app = setup_test_app().await;
    let (status, _) = request(test_app.app.clone(), "DELETE", "/v1/results", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
