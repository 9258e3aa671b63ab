use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::identity::{MaybePlayer, PlayerIdentity};
use crate::{
    error::ServiceError,
    game::{RevealOutcome, SessionView},
    models::{Hint, Player, PlayerTeam, Role, Team},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct UpdatePlayerRequest {
    pub team: PlayerTeam,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct AutomatedCodegiverRequest {
    pub team: Team,
}

#[derive(Debug, Deserialize)]
pub struct GiveHintRequest {
    pub word: String,
    pub count: i32,
}

#[derive(Debug, Serialize)]
pub struct PassResponse {
    pub current_turn: Team,
}

/// Game state as the caller may see it
pub async fn get_game(
    State(state): State<Arc<AppState>>,
    MaybePlayer(viewer): MaybePlayer,
    Path(game_id): Path<Uuid>,
) -> Result<Json<SessionView>, ServiceError> {
    Ok(Json(state.service.session_view(game_id, viewer).await?))
}

pub async fn update_player(
    State(state): State<Arc<AppState>>,
    identity: PlayerIdentity,
    Path((game_id, player_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdatePlayerRequest>,
) -> Result<Json<Player>, ServiceError> {
    let player = state
        .service
        .set_team_and_role(
            game_id,
            identity.player_id,
            player_id,
            request.team,
            request.role,
        )
        .await?;
    Ok(Json(player))
}

pub async fn remove_player(
    State(state): State<Arc<AppState>>,
    identity: PlayerIdentity,
    Path((game_id, player_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServiceError> {
    state
        .service
        .remove_player(game_id, identity.player_id, player_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_automated_codegiver(
    State(state): State<Arc<AppState>>,
    identity: PlayerIdentity,
    Path(game_id): Path<Uuid>,
    Json(request): Json<AutomatedCodegiverRequest>,
) -> Result<(StatusCode, Json<Player>), ServiceError> {
    let player = state
        .service
        .add_automated_codegiver(game_id, identity.player_id, request.team)
        .await?;
    Ok((StatusCode::CREATED, Json(player)))
}

/// Deal the board and return the caller's view of it
pub async fn start_game(
    State(state): State<Arc<AppState>>,
    identity: PlayerIdentity,
    Path(game_id): Path<Uuid>,
) -> Result<Json<SessionView>, ServiceError> {
    state.service.start_game(game_id, identity.player_id).await?;
    let view = state
        .service
        .session_view(game_id, Some(identity.player_id))
        .await?;
    Ok(Json(view))
}

pub async fn give_hint(
    State(state): State<Arc<AppState>>,
    identity: PlayerIdentity,
    Path(game_id): Path<Uuid>,
    Json(request): Json<GiveHintRequest>,
) -> Result<(StatusCode, Json<Hint>), ServiceError> {
    let hint = state
        .service
        .give_hint(game_id, identity.player_id, &request.word, request.count)
        .await?;
    Ok((StatusCode::CREATED, Json(hint)))
}

pub async fn request_automated_hint(
    State(state): State<Arc<AppState>>,
    identity: PlayerIdentity,
    Path(game_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Hint>), ServiceError> {
    let hint = state
        .service
        .request_automated_hint(game_id, identity.player_id)
        .await?;
    Ok((StatusCode::CREATED, Json(hint)))
}

pub async fn reveal_card(
    State(state): State<Arc<AppState>>,
    identity: PlayerIdentity,
    Path((game_id, card_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<RevealOutcome>, ServiceError> {
    let outcome = state
        .service
        .reveal_card(game_id, identity.player_id, card_id)
        .await?;
    Ok(Json(outcome))
}

pub async fn pass_turn(
    State(state): State<Arc<AppState>>,
    identity: PlayerIdentity,
    Path(game_id): Path<Uuid>,
) -> Result<Json<PassResponse>, ServiceError> {
    let current_turn = state.service.pass_turn(game_id, identity.player_id).await?;
    Ok(Json(PassResponse { current_turn }))
}
