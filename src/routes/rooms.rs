use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::identity::MaybePlayer;
use crate::{
    error::ServiceError,
    game::{RoomSummary, SessionView},
    models::Player,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
    pub nickname: String,
    #[serde(default)]
    pub word_pack_id: Option<Uuid>,
    /// List the room in the public room browser
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Deserialize)]
pub struct JoinRoomRequest {
    pub code: String,
    pub nickname: String,
}

/// Returned on create and join. Clients keep `player.id` and send it back
/// as their identity.
#[derive(Debug, Serialize)]
pub struct RoomResponse {
    pub player: Player,
    pub game: SessionView,
}

/// Public rooms waiting for players, newest first
pub async fn list_public_rooms(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RoomSummary>>, ServiceError> {
    Ok(Json(state.service.list_public_rooms().await?))
}

/// Create a room; the caller becomes its host
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomResponse>), ServiceError> {
    let (session, player) = state
        .service
        .create_room(
            &request.name,
            &request.nickname,
            request.word_pack_id,
            request.is_public,
        )
        .await?;
    let game = SessionView::for_viewer(&session, Some(&player));

    Ok((StatusCode::CREATED, Json(RoomResponse { player, game })))
}

/// Join by room code. A caller that already sends a player id of this room
/// gets their old seat back.
pub async fn join_room(
    State(state): State<Arc<AppState>>,
    MaybePlayer(player_id): MaybePlayer,
    Json(request): Json<JoinRoomRequest>,
) -> Result<Json<RoomResponse>, ServiceError> {
    let (session, player) = state
        .service
        .join_room(&request.code, &request.nickname, player_id)
        .await?;
    let game = SessionView::for_viewer(&session, Some(&player));

    Ok(Json(RoomResponse { player, game }))
}
