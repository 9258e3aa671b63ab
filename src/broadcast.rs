//! Fan-out of game events to everyone watching a session.
//!
//! Delivery is fire-and-forget: the orchestrator publishes after a
//! successful save and moves on. Subscribers that fall behind are told to
//! resync from a full snapshot instead of trusting the event stream.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    game::CardView,
    models::{Card, Hint, Player, Team},
};

/// Buffered events per session before slow subscribers start lagging
pub const CHANNEL_CAPACITY: usize = 64;

/// Everything that can happen in a room, each with its own payload shape
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum GameEvent {
    PlayerJoined {
        player: Player,
    },
    PlayerLeft {
        player_id: Uuid,
    },
    PlayerUpdated {
        player: Player,
    },
    GameStarted {
        current_turn: Team,
        /// Board without the key; codegivers fetch their own view
        cards: Vec<CardView>,
    },
    HintGiven {
        hint: Hint,
    },
    CardRevealed {
        card: Card,
        next_turn: Option<Team>,
        winner: Option<Team>,
    },
    TurnChanged {
        turn: Team,
        turn_number: u32,
    },
    GameOver {
        winner: Team,
    },
}

impl GameEvent {
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::PlayerJoined { .. } => "player_joined",
            GameEvent::PlayerLeft { .. } => "player_left",
            GameEvent::PlayerUpdated { .. } => "player_updated",
            GameEvent::GameStarted { .. } => "game_started",
            GameEvent::HintGiven { .. } => "hint_given",
            GameEvent::CardRevealed { .. } => "card_revealed",
            GameEvent::TurnChanged { .. } => "turn_changed",
            GameEvent::GameOver { .. } => "game_over",
        }
    }
}

/// An event stamped with the session version it produced. Clients drop
/// envelopes older than the snapshot they already hold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventEnvelope {
    pub session_id: Uuid,
    pub version: i64,
    pub event: GameEvent,
}

#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn publish(&self, envelope: EventEnvelope);
}

/// In-process broadcaster backed by one tokio broadcast channel per session
#[derive(Debug, Default)]
pub struct ChannelBroadcaster {
    channels: DashMap<Uuid, broadcast::Sender<EventEnvelope>>,
}

impl ChannelBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, session_id: Uuid) -> broadcast::Receiver<EventEnvelope> {
        self.channels
            .entry(session_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Drop channels nobody listens to any more. Returns how many were removed.
    pub fn prune(&self) -> usize {
        let before = self.channels.len();
        self.channels.retain(|_, tx| tx.receiver_count() > 0);
        before - self.channels.len()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

#[async_trait]
impl Broadcaster for ChannelBroadcaster {
    async fn publish(&self, envelope: EventEnvelope) {
        let Some(tx) = self.channels.get(&envelope.session_id).map(|tx| tx.clone()) else {
            tracing::debug!(
                "No subscribers for game {}, dropping {}",
                envelope.session_id,
                envelope.event.name()
            );
            return;
        };

        let name = envelope.event.name();
        match tx.send(envelope) {
            Ok(receivers) => tracing::debug!("Broadcast {} to {} subscribers", name, receivers),
            Err(_) => tracing::debug!("All subscribers left before {} was sent", name),
        }
    }
}
