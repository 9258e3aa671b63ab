use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::player::{Player, PlayerTeam, Role};

/// One of the two competing teams. Red always moves first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Red,
    Blue,
}

impl Team {
    pub fn opponent(self) -> Team {
        match self {
            Team::Red => Team::Blue,
            Team::Blue => Team::Red,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Team::Red => "red",
            Team::Blue => "blue",
        }
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Red,
    Blue,
    Neutral,
    Assassin,
}

impl CardType {
    /// The team a card belongs to, if any
    pub fn owner(self) -> Option<Team> {
        match self {
            CardType::Red => Some(Team::Red),
            CardType::Blue => Some(Team::Blue),
            CardType::Neutral | CardType::Assassin => None,
        }
    }

    pub fn for_team(team: Team) -> CardType {
        match team {
            Team::Red => CardType::Red,
            Team::Blue => CardType::Blue,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Waiting,
    Playing,
    Finished,
}

impl GameStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GameStatus::Waiting => "waiting",
            GameStatus::Playing => "playing",
            GameStatus::Finished => "finished",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    pub id: Uuid,
    pub word: String,
    pub card_type: CardType,
    pub revealed: bool,
    pub revealed_by: Option<Uuid>,
    /// Display order on the board, 0..grid size
    pub position: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Hint {
    pub id: Uuid,
    pub player_id: Uuid,
    pub word: String,
    pub count: u8,
    pub team: Team,
    /// Turn epoch the hint was given in
    pub turn_number: u32,
    pub created_at: DateTime<Utc>,
}

/// Authoritative state of one room, from lobby to game over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    pub id: Uuid,
    /// Short shareable code used to join the room
    pub code: String,
    pub name: String,
    pub word_pack_id: Uuid,
    /// Listed in the room browser while the game has not started
    #[serde(default)]
    pub is_public: bool,
    pub status: GameStatus,
    pub current_turn: Option<Team>,
    pub winner: Option<Team>,
    pub cards: Vec<Card>,
    /// Append-only, oldest first. Use [`GameSession::hints_newest_first`] for display order.
    pub hints: Vec<Hint>,
    pub players: Vec<Player>,
    /// Incremented every time the turn changes hands. Zero until the game starts.
    pub turn_number: u32,
    pub turn_started_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency version, bumped on every persisted mutation
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Time of the last persisted change
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl GameSession {
    pub fn new(code: String, name: String, word_pack_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            code,
            name,
            word_pack_id,
            is_public: false,
            status: GameStatus::Waiting,
            current_turn: None,
            winner: None,
            cards: Vec::new(),
            hints: Vec::new(),
            players: Vec::new(),
            turn_number: 0,
            turn_started_at: None,
            version: 0,
            created_at: now,
            started_at: None,
            finished_at: None,
            updated_at: now,
        }
    }

    pub fn player(&self, player_id: Uuid) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn player_mut(&mut self, player_id: Uuid) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == player_id)
    }

    pub fn card(&self, card_id: Uuid) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == card_id)
    }

    pub fn hints_newest_first(&self) -> impl Iterator<Item = &Hint> {
        self.hints.iter().rev()
    }

    /// The hint that currently allows the active team to guess, if one was
    /// given since their turn began.
    pub fn active_hint(&self) -> Option<&Hint> {
        let team = self.current_turn?;
        self.hints_newest_first()
            .next()
            .filter(|h| h.team == team && h.turn_number == self.turn_number)
    }

    pub fn has_hint_for_current_turn(&self) -> bool {
        self.active_hint().is_some()
    }

    pub fn codegiver(&self, team: Team) -> Option<&Player> {
        self.players
            .iter()
            .find(|p| p.team == PlayerTeam::from(team) && p.role == Some(Role::Codegiver))
    }

    pub fn team_members(&self, team: Team) -> impl Iterator<Item = &Player> {
        self.players
            .iter()
            .filter(move |p| p.team == PlayerTeam::from(team))
    }

    pub fn is_finished(&self) -> bool {
        self.status == GameStatus::Finished
    }

    pub fn has_human_players(&self) -> bool {
        self.players.iter().any(|p| !p.is_automated)
    }

    /// Whether nobody is coming back: no human has been seated since
    /// `empty_before`, or the game ended and has been idle since
    /// `finished_before`.
    pub fn is_abandoned(
        &self,
        empty_before: DateTime<Utc>,
        finished_before: DateTime<Utc>,
    ) -> bool {
        if self.is_finished() && self.updated_at <= finished_before {
            return true;
        }
        !self.has_human_players() && self.updated_at <= empty_before
    }
}

/// Revealed/remaining tallies for one team's cards
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TeamCount {
    pub total: usize,
    pub revealed: usize,
    pub remaining: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TeamCounts {
    pub red: TeamCount,
    pub blue: TeamCount,
}

impl TeamCounts {
    pub fn from_cards(cards: &[Card]) -> Self {
        let tally = |team: Team| {
            let kind = CardType::for_team(team);
            let total = cards.iter().filter(|c| c.card_type == kind).count();
            let revealed = cards
                .iter()
                .filter(|c| c.card_type == kind && c.revealed)
                .count();
            TeamCount {
                total,
                revealed,
                remaining: total - revealed,
            }
        };

        Self {
            red: tally(Team::Red),
            blue: tally(Team::Blue),
        }
    }

    pub fn for_team(&self, team: Team) -> TeamCount {
        match team {
            Team::Red => self.red,
            Team::Blue => self.blue,
        }
    }

    /// A team is done once every card of its colour is revealed
    pub fn is_complete(&self, team: Team) -> bool {
        let count = self.for_team(team);
        count.total > 0 && count.remaining == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(card_type: CardType, revealed: bool) -> Card {
        Card {
            id: Uuid::new_v4(),
            word: "WORD".to_string(),
            card_type,
            revealed,
            revealed_by: None,
            position: 0,
        }
    }

    #[test]
    fn test_team_opponent() {
        assert_eq!(Team::Red.opponent(), Team::Blue);
        assert_eq!(Team::Blue.opponent(), Team::Red);
    }

    #[test]
    fn test_card_type_owner() {
        assert_eq!(CardType::Red.owner(), Some(Team::Red));
        assert_eq!(CardType::Blue.owner(), Some(Team::Blue));
        assert_eq!(CardType::Neutral.owner(), None);
        assert_eq!(CardType::Assassin.owner(), None);
    }

    #[test]
    fn test_team_counts() {
        let cards = vec![
            card(CardType::Red, true),
            card(CardType::Red, false),
            card(CardType::Blue, true),
            card(CardType::Neutral, true),
        ];

        let counts = TeamCounts::from_cards(&cards);
        assert_eq!(
            counts.red,
            TeamCount {
                total: 2,
                revealed: 1,
                remaining: 1
            }
        );
        assert!(!counts.is_complete(Team::Red));
        assert!(counts.is_complete(Team::Blue));
    }

    #[test]
    fn test_team_with_no_cards_is_never_complete() {
        let counts = TeamCounts::from_cards(&[card(CardType::Neutral, true)]);
        assert!(!counts.is_complete(Team::Red));
        assert!(!counts.is_complete(Team::Blue));
    }

    #[test]
    fn test_room_with_only_automated_players_is_abandoned() {
        let mut session = GameSession::new("ABCDEF".into(), "Room".into(), Uuid::new_v4());
        let later = session.updated_at + chrono::Duration::seconds(1);
        let earlier = session.updated_at - chrono::Duration::seconds(1);
        assert!(session.is_abandoned(later, earlier));
        assert!(!session.is_abandoned(earlier, earlier));

        session.players.push(Player::automated(Team::Red));
        assert!(session.is_abandoned(later, earlier));

        session.players.push(Player::new("alice", true));
        assert!(!session.is_abandoned(later, later));

        session.status = GameStatus::Finished;
        assert!(session.is_abandoned(earlier, later));
    }

    #[test]
    fn test_snapshot_without_listing_fields_still_loads() {
        let session = GameSession::new("ABCDEF".into(), "Room".into(), Uuid::new_v4());
        let mut value = serde_json::to_value(&session).unwrap();
        let fields = value.as_object_mut().unwrap();
        fields.remove("is_public");
        fields.remove("updated_at");

        let loaded: GameSession = serde_json::from_value(value).unwrap();
        assert!(!loaded.is_public);
        assert_eq!(loaded.code, "ABCDEF");
    }

    #[test]
    fn test_serialized_names_are_lowercase() {
        assert_eq!(serde_json::to_string(&CardType::Assassin).unwrap(), "\"assassin\"");
        assert_eq!(serde_json::to_string(&GameStatus::Playing).unwrap(), "\"playing\"");
        assert_eq!(serde_json::to_string(&Team::Blue).unwrap(), "\"blue\"");
    }
}
