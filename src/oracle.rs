//! Automated codegiver. The oracle only proposes a clue; its answer goes
//! through the same validation as a human hint before it touches a session.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{CardType, GameSession, Team};

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("hint oracle is not configured")]
    Disabled,
    #[error("hint oracle request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("hint oracle returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("hint oracle returned an unusable answer: {0}")]
    BadResponse(String),
}

/// Unrevealed board words from the acting team's point of view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OracleRequest {
    pub team: Team,
    pub own: Vec<String>,
    pub opponent: Vec<String>,
    pub neutral: Vec<String>,
    pub assassin: Option<String>,
}

impl OracleRequest {
    pub fn from_session(session: &GameSession, team: Team) -> Self {
        let mut request = Self {
            team,
            own: Vec::new(),
            opponent: Vec::new(),
            neutral: Vec::new(),
            assassin: None,
        };

        for card in session.cards.iter().filter(|c| !c.revealed) {
            let word = card.word.clone();
            match card.card_type {
                CardType::Assassin => request.assassin = Some(word),
                CardType::Neutral => request.neutral.push(word),
                kind if kind.owner() == Some(team) => request.own.push(word),
                _ => request.opponent.push(word),
            }
        }

        request
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OracleHint {
    pub word: String,
    pub count: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[async_trait]
pub trait HintOracle: Send + Sync {
    async fn suggest(&self, request: &OracleRequest) -> Result<OracleHint, OracleError>;
}

/// Used when no oracle endpoint is configured; every request fails
#[derive(Debug, Default)]
pub struct DisabledOracle;

#[async_trait]
impl HintOracle for DisabledOracle {
    async fn suggest(&self, _request: &OracleRequest) -> Result<OracleHint, OracleError> {
        Err(OracleError::Disabled)
    }
}

/// Posts the [`OracleRequest`] as JSON to an HTTP endpoint and expects an
/// [`OracleHint`] back.
#[derive(Debug, Clone)]
pub struct HttpHintOracle {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpHintOracle {
    pub fn new(
        client: reqwest::Client,
        url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            api_key,
            timeout,
        }
    }
}

#[async_trait]
impl HintOracle for HttpHintOracle {
    async fn suggest(&self, request: &OracleRequest) -> Result<OracleHint, OracleError> {
        let mut call = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(request);
        if let Some(key) = &self.api_key {
            call = call.bearer_auth(key);
        }

        let response = call.send().await?;
        if !response.status().is_success() {
            return Err(OracleError::Status(response.status()));
        }

        let hint: OracleHint = response.json().await?;
        if hint.word.trim().is_empty() {
            return Err(OracleError::BadResponse("empty hint word".to_string()));
        }

        tracing::debug!(
            "Oracle suggested '{}' for {} ({})",
            hint.word,
            request.team,
            hint.reason.as_deref().unwrap_or("no reason given")
        );
        Ok(hint)
    }
}
