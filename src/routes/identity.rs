use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use std::convert::Infallible;
use uuid::Uuid;

/// Header carrying the caller's player id
pub const PLAYER_ID_HEADER: &str = "x-player-id";

/// The player making the request. Authentication happens upstream; the id
/// here is an opaque handle handed out when the player joined a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub player_id: Uuid,
}

/// Like [`PlayerIdentity`], but anonymous callers are let through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaybePlayer(pub Option<Uuid>);

/// Read the player id from the header, falling back to the `player_id`
/// query parameter for clients that cannot set headers (browser WebSockets)
fn player_id_from_parts(parts: &Parts) -> Option<Uuid> {
    parts
        .headers
        .get(PLAYER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.trim().to_string())
        .or_else(|| {
            parts
                .uri
                .query()
                .and_then(|q| serde_urlencoded::from_str::<Vec<(String, String)>>(q).ok())
                .and_then(|params| {
                    params
                        .into_iter()
                        .find(|(k, _)| k == "player_id")
                        .map(|(_, v)| v)
                })
        })
        .and_then(|raw| Uuid::parse_str(&raw).ok())
}

impl<S> FromRequestParts<S> for PlayerIdentity
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let player_id = player_id_from_parts(parts);

        async move {
            let player_id = player_id.ok_or(StatusCode::UNAUTHORIZED)?;
            Ok(PlayerIdentity { player_id })
        }
    }
}

impl<S> FromRequestParts<S> for MaybePlayer
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        std::future::ready(Ok(MaybePlayer(player_id_from_parts(parts))))
    }
}
