use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tdpool::datasource::SportsFeedSource;
use tdpool::engine::{GradingEngine, LeaderboardAggregator, LeaderboardCache, NameMatcher};
use tdpool::{api, config::Config, db::init_db, Decimal, OutcomeSource, Repository};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let port = config.port;

    // Initialize database and dependencies
    let pool = match init_db(&config.database_path).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    let repo = Arc::new(Repository::new(pool));
    let outcomes: Arc<dyn OutcomeSource> =
        Arc::new(SportsFeedSource::new(config.sportsfeed_api_url.clone()));

    // STAKE is validated at config load; parse cannot fail here.
    let stake = Decimal::from_str(&config.stake).unwrap_or_else(|_| Decimal::one());
    let matcher = NameMatcher::with_threshold(config.match_threshold);

    let engine = Arc::new(GradingEngine::new(
        repo.clone(),
        outcomes,
        matcher,
        stake,
    ));
    let aggregator = Arc::new(LeaderboardAggregator::new(repo.clone()));
    let cache = Arc::new(LeaderboardCache::new(Duration::from_millis(
        config.leaderboard_cache_ttl_ms,
    )));

    // Create router
    let app = api::create_router(api::AppState::new(
        repo, config, engine, aggregator, cache,
    ));

    // Bind to address
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
