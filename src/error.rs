//! Errors surfaced by [`crate::service::GameService`] and how they map onto
//! HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::{
    game::{GameError, HintError},
    oracle::OracleError,
    store::StoreError,
};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Game(#[from] GameError),
    /// Another writer changed the session first. Refetch before retrying.
    #[error("game changed while the request was processed, refetch and retry")]
    StaleState,
    #[error("game not found")]
    SessionNotFound,
    #[error("no room with code {0}")]
    RoomNotFound(String),
    #[error("word pack not found")]
    WordPackNotFound,
    #[error("word pack has no word {0}")]
    WordNotFound(String),
    #[error("{0}")]
    BadRequest(&'static str),
    #[error("a hint is already being generated for this turn")]
    HintPending,
    #[error(transparent)]
    Oracle(#[from] OracleError),
    #[error("hint oracle proposed an invalid hint: {0}")]
    OracleHintRejected(HintError),
    #[error("storage error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::VersionConflict { .. } => ServiceError::StaleState,
            StoreError::Missing(_) => ServiceError::SessionNotFound,
            other => ServiceError::Store(other),
        }
    }
}

impl ServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Game(e) => e.kind(),
            ServiceError::StaleState => "stale_state",
            ServiceError::SessionNotFound => "session_not_found",
            ServiceError::RoomNotFound(_) => "room_not_found",
            ServiceError::WordPackNotFound => "word_pack_not_found",
            ServiceError::WordNotFound(_) => "word_not_found",
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::HintPending => "hint_pending",
            ServiceError::Oracle(_) => "oracle_failed",
            ServiceError::OracleHintRejected(_) => "oracle_hint_rejected",
            ServiceError::Store(_) => "storage_error",
        }
    }

    /// Whether the caller may simply try the same request again later
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ServiceError::StaleState
                | ServiceError::HintPending
                | ServiceError::Oracle(_)
                | ServiceError::OracleHintRejected(_)
        )
    }
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Game(e) => match e {
                GameError::NotHost
                | GameError::WrongRole { .. }
                | GameError::Spectator
                | GameError::NotYourTurn(_) => StatusCode::FORBIDDEN,
                GameError::PlayerNotFound | GameError::CardNotFound => StatusCode::NOT_FOUND,
                GameError::AlreadyRevealed
                | GameError::AlreadyStarted
                | GameError::RoleTaken(_)
                | GameError::HintAlreadyIssued
                | GameError::RoomFull(_) => StatusCode::CONFLICT,
                _ => StatusCode::BAD_REQUEST,
            },
            ServiceError::StaleState | ServiceError::HintPending => StatusCode::CONFLICT,
            ServiceError::SessionNotFound
            | ServiceError::RoomNotFound(_)
            | ServiceError::WordPackNotFound
            | ServiceError::WordNotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::Oracle(_) | ServiceError::OracleHintRejected(_) => {
                StatusCode::BAD_GATEWAY
            }
            ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl From<&ServiceError> for ErrorBody {
    fn from(err: &ServiceError) -> Self {
        let message = match err {
            // Don't leak database details to clients
            ServiceError::Store(_) => "internal storage error".to_string(),
            other => other.to_string(),
        };
        Self {
            error: err.kind(),
            message,
            retryable: err.is_retryable(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected ({}): {}", self.kind(), self);
        }
        (status, Json(ErrorBody::from(&self))).into_response()
    }
}
