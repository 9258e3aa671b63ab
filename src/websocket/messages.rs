use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{broadcast::EventEnvelope, game::SessionView};

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    StartGame,
    GiveHint { word: String, count: i32 },
    RevealCard { card_id: Uuid },
    PassTurn,
    RequestAutomatedHint,
    /// Ask for a fresh snapshot, e.g. after spotting a version gap
    RequestState,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full snapshot for this connection's viewer
    State(SessionView),
    Event(EventEnvelope),
    /// Events were dropped for this connection; a `state` message follows
    Resync { missed: u64 },
    Error { kind: String, message: String },
}
