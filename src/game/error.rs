use thiserror::Error;

use crate::models::{GameStatus, Team};

/// Why a hint was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HintError {
    #[error("hint word must not be empty")]
    Empty,
    #[error("hint must be a single word, got '{0}'")]
    MultipleWords(String),
    #[error("'{0}' is a word on the board")]
    OnBoard(String),
    #[error("hint count must be between 0 and 9, got {0}")]
    InvalidCount(i32),
}

/// A rejected engine operation. The session is left untouched whenever one
/// of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("only the host can do that")]
    NotHost,
    #[error("game has already started")]
    AlreadyStarted,
    #[error("game is not in progress (status: {0})")]
    NotPlaying(&'static str),
    #[error("game is over")]
    GameOver,
    #[error("need at least {required} distinct words, word pack has {available}")]
    InsufficientWords { available: usize, required: usize },
    #[error("card not found")]
    CardNotFound,
    #[error("card has already been revealed")]
    AlreadyRevealed,
    #[error("it is {0}'s turn")]
    NotYourTurn(Team),
    #[error("spectators cannot act in the game")]
    Spectator,
    #[error("only a {expected} can do that")]
    WrongRole { expected: &'static str },
    #[error("no hint has been given this turn")]
    NoActiveHint,
    #[error("a hint has already been given this turn")]
    HintAlreadyIssued,
    #[error("{0}")]
    InvalidHint(#[from] HintError),
    #[error("player not found in this room")]
    PlayerNotFound,
    #[error("{0} team already has a codegiver")]
    RoleTaken(Team),
    #[error("room is full ({0} players)")]
    RoomFull(usize),
    #[error("game cannot start yet: {0}")]
    NotReady(String),
    #[error("the active team's codegiver is not automated")]
    NotAutomated,
    #[error("a board of {0} cards cannot be addressed")]
    LayoutTooLarge(usize),
}

impl GameError {
    pub fn not_playing(status: GameStatus) -> Self {
        GameError::NotPlaying(status.as_str())
    }

    /// Stable identifier clients can branch on
    pub fn kind(&self) -> &'static str {
        match self {
            GameError::NotHost => "not_host",
            GameError::AlreadyStarted => "already_started",
            GameError::NotPlaying(_) => "not_playing",
            GameError::GameOver => "game_over",
            GameError::InsufficientWords { .. } => "insufficient_words",
            GameError::CardNotFound => "card_not_found",
            GameError::AlreadyRevealed => "already_revealed",
            GameError::NotYourTurn(_) => "not_your_turn",
            GameError::Spectator => "spectator",
            GameError::WrongRole { .. } => "wrong_role",
            GameError::NoActiveHint => "no_active_hint",
            GameError::HintAlreadyIssued => "hint_already_issued",
            GameError::InvalidHint(HintError::Empty) => "empty_hint",
            GameError::InvalidHint(HintError::MultipleWords(_)) => "multiple_words",
            GameError::InvalidHint(HintError::OnBoard(_)) => "hint_on_board",
            GameError::InvalidHint(HintError::InvalidCount(_)) => "invalid_count",
            GameError::PlayerNotFound => "player_not_found",
            GameError::RoleTaken(_) => "role_taken",
            GameError::RoomFull(_) => "room_full",
            GameError::NotReady(_) => "not_ready",
            GameError::NotAutomated => "not_automated",
            GameError::LayoutTooLarge(_) => "layout_too_large",
        }
    }
}
