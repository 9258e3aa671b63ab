use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    Card, CardType, GameSession, GameStatus, Hint, Player, Role, Team, TeamCounts,
};

/// A card as one particular viewer is allowed to see it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardView {
    pub id: Uuid,
    pub word: String,
    pub position: u8,
    pub revealed: bool,
    pub revealed_by: Option<Uuid>,
    /// Hidden until the card is revealed, unless the viewer is a codegiver
    pub card_type: Option<CardType>,
}

impl CardView {
    pub fn masked(card: &Card) -> Self {
        Self::new(card, card.revealed)
    }

    pub fn full(card: &Card) -> Self {
        Self::new(card, true)
    }

    fn new(card: &Card, show_type: bool) -> Self {
        Self {
            id: card.id,
            word: card.word.clone(),
            position: card.position,
            revealed: card.revealed,
            revealed_by: card.revealed_by,
            card_type: show_type.then_some(card.card_type),
        }
    }
}

/// Full state snapshot sent to clients. Clients treat the newest snapshot
/// (highest `version`) as ground truth over any event they received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub is_public: bool,
    pub status: GameStatus,
    pub current_turn: Option<Team>,
    pub winner: Option<Team>,
    pub turn_number: u32,
    pub version: i64,
    pub cards: Vec<CardView>,
    /// Newest first
    pub hints: Vec<Hint>,
    pub players: Vec<Player>,
    pub counts: TeamCounts,
    /// Whether the active team may guess right now
    pub hint_active: bool,
    pub created_at: DateTime<Utc>,
}

impl SessionView {
    /// Build the view for `viewer`. Codegivers see every card colour, as does
    /// everyone once the game is over.
    pub fn for_viewer(session: &GameSession, viewer: Option<&Player>) -> Self {
        let sees_key = session.is_finished()
            || viewer.is_some_and(|p| p.role == Some(Role::Codegiver));

        let cards = session
            .cards
            .iter()
            .map(|c| {
                if sees_key {
                    CardView::full(c)
                } else {
                    CardView::masked(c)
                }
            })
            .collect();

        Self {
            id: session.id,
            code: session.code.clone(),
            name: session.name.clone(),
            is_public: session.is_public,
            status: session.status,
            current_turn: session.current_turn,
            winner: session.winner,
            turn_number: session.turn_number,
            version: session.version,
            cards,
            hints: session.hints_newest_first().cloned().collect(),
            players: session.players.clone(),
            counts: TeamCounts::from_cards(&session.cards),
            hint_active: session.has_hint_for_current_turn(),
            created_at: session.created_at,
        }
    }
}

/// One entry of the public room browser
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomSummary {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub player_count: usize,
    pub max_players: usize,
    pub created_at: DateTime<Utc>,
}

impl RoomSummary {
    pub fn new(session: &GameSession, max_players: usize) -> Self {
        Self {
            id: session.id,
            code: session.code.clone(),
            name: session.name.clone(),
            player_count: session.players.len(),
            max_players,
            created_at: session.created_at,
        }
    }
}
