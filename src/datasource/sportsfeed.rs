//! HTTP client for the scores feed.

use super::{OutcomeSource, OutcomeSourceError};
use crate::domain::{GameId, OutcomeFact, WeekScope};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::Client;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;
use tracing::debug;

/// Outcome source backed by the scores feed's weekly summary endpoint.
#[derive(Debug, Clone)]
pub struct SportsFeedSource {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScoresResponse {
    games: Vec<GameScores>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameScores {
    game_id: String,
    first_td_scorer: Option<String>,
    #[serde(default)]
    any_time_td_scorers: Vec<String>,
}

impl SportsFeedSource {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    async fn get_scores(&self, scope: WeekScope) -> Result<ScoresResponse, OutcomeSourceError> {
        let url = format!(
            "{}/v1/scores?season={}&week={}",
            self.base_url, scope.season, scope.week
        );
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        retry(backoff, || async {
            let response = self.client.get(&url).send().await.map_err(|e| {
                backoff::Error::transient(OutcomeSourceError::Network(e.to_string()))
            })?;

            let status = response.status();
            if status == 429 {
                return Err(backoff::Error::transient(OutcomeSourceError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(OutcomeSourceError::Http {
                    status: status.as_u16(),
                    message: "server error".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(OutcomeSourceError::Http {
                    status: status.as_u16(),
                    message: "client error".to_string(),
                }));
            }

            response.json::<ScoresResponse>().await.map_err(|e| {
                backoff::Error::permanent(OutcomeSourceError::Parse(e.to_string()))
            })
        })
        .await
    }
}

#[async_trait]
impl OutcomeSource for SportsFeedSource {
    async fn fetch_outcomes(
        &self,
        scope: WeekScope,
    ) -> Result<HashMap<GameId, OutcomeFact>, OutcomeSourceError> {
        let response = self.get_scores(scope).await?;
        debug!(%scope, games = response.games.len(), "fetched weekly scores");

        Ok(response
            .games
            .into_iter()
            .map(|game| {
                let game_id = GameId::new(game.game_id);
                let fact = OutcomeFact::new(
                    game_id.clone(),
                    game.first_td_scorer,
                    game.any_time_td_scorers.into_iter().collect::<BTreeSet<_>>(),
                );
                (game_id, fact)
            })
            .collect())
    }
}
