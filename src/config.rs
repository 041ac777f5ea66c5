use crate::engine::DEFAULT_THRESHOLD;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub sportsfeed_api_url: String,
    /// Similarity threshold for the name matcher's edit-distance tier.
    pub match_threshold: f64,
    /// Unit stake each pick is modeled at.
    pub stake: String,
    pub leaderboard_cache_ttl_ms: u64,
    /// Pool members, used when the leaderboard should include users with
    /// zero picks.
    pub pool_users: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let sportsfeed_api_url = env_map
            .get("SPORTSFEED_API_URL")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("SPORTSFEED_API_URL".to_string()))?;

        let match_threshold = match env_map.get("MATCH_THRESHOLD") {
            None => DEFAULT_THRESHOLD,
            Some(raw) => {
                let value = raw.parse::<f64>().map_err(|_| {
                    ConfigError::InvalidValue(
                        "MATCH_THRESHOLD".to_string(),
                        "must be a number".to_string(),
                    )
                })?;
                if !(0.0..=1.0).contains(&value) || value == 0.0 {
                    return Err(ConfigError::InvalidValue(
                        "MATCH_THRESHOLD".to_string(),
                        format!("must be in (0, 1], got {}", raw),
                    ));
                }
                value
            }
        };

        let stake = env_map.get("STAKE").cloned().unwrap_or_else(|| "1".to_string());
        if crate::domain::Decimal::from_str_canonical(&stake).is_err() {
            return Err(ConfigError::InvalidValue(
                "STAKE".to_string(),
                "must be a decimal number".to_string(),
            ));
        }

        let leaderboard_cache_ttl_ms = env_map
            .get("LEADERBOARD_CACHE_TTL_MS")
            .map(|s| s.as_str())
            .unwrap_or("30000")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "LEADERBOARD_CACHE_TTL_MS".to_string(),
                    "must be a valid u64".to_string(),
                )
            })?;

        let pool_users = env_map
            .get("POOL_USERS")
            .map(|s| {
                s.split(',')
                    .map(|u| u.trim().to_string())
                    .filter(|u| !u.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Config {
            port,
            database_path,
            sportsfeed_api_url,
            match_threshold,
            stake,
            leaderboard_cache_ttl_ms,
            pool_users,
        })
    }
}
