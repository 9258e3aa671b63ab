use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    error::GameError,
    grid::GridGenerator,
    layout::LayoutSpec,
    validator::HintValidator,
};
use crate::models::{
    Card, CardType, GameSession, GameStatus, Hint, Player, Role, Team, TeamCounts,
};

/// What happened when a card was flipped
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RevealOutcome {
    pub card: Card,
    /// Team to move next, `None` once the game is over
    pub next_turn: Option<Team>,
    pub winner: Option<Team>,
    /// True when the reveal handed the turn to the other team
    pub turn_changed: bool,
}

/// State transitions for a running game. Every operation either applies
/// completely or returns an error without touching the session.
pub struct TurnEngine;

impl TurnEngine {
    /// Deal the board and hand the first turn to the opening team.
    pub fn start_game<R: Rng + ?Sized>(
        session: &mut GameSession,
        actor_id: Uuid,
        candidates: &[String],
        rng: &mut R,
    ) -> Result<(), GameError> {
        Self::start_game_with(session, actor_id, &LayoutSpec::STANDARD, candidates, rng)
    }

    pub fn start_game_with<R: Rng + ?Sized>(
        session: &mut GameSession,
        actor_id: Uuid,
        spec: &LayoutSpec,
        candidates: &[String],
        rng: &mut R,
    ) -> Result<(), GameError> {
        // Never redeal a board that players may already have seen
        if session.status != GameStatus::Waiting {
            return Err(GameError::AlreadyStarted);
        }

        let actor = session.player(actor_id).ok_or(GameError::PlayerNotFound)?;
        if !actor.is_host {
            return Err(GameError::NotHost);
        }

        let cards = GridGenerator::generate(spec, candidates, rng)?;

        let now = Utc::now();
        session.cards = cards;
        session.status = GameStatus::Playing;
        session.current_turn = Some(spec.first_team);
        session.winner = None;
        session.turn_number = 1;
        session.turn_started_at = Some(now);
        session.started_at = Some(now);
        Ok(())
    }

    /// Flip a card for the guessing team and resolve the consequences.
    pub fn reveal_card(
        session: &mut GameSession,
        card_id: Uuid,
        actor_id: Uuid,
    ) -> Result<RevealOutcome, GameError> {
        let current = Self::ensure_in_progress(session)?;

        let index = session
            .cards
            .iter()
            .position(|c| c.id == card_id)
            .ok_or(GameError::CardNotFound)?;
        if session.cards[index].revealed {
            return Err(GameError::AlreadyRevealed);
        }

        let actor = session.player(actor_id).ok_or(GameError::PlayerNotFound)?;
        let acting_team = Self::ensure_turn(actor, current)?;
        if actor.role != Some(Role::Guesser) {
            return Err(GameError::WrongRole { expected: "guesser" });
        }
        if !session.has_hint_for_current_turn() {
            return Err(GameError::NoActiveHint);
        }

        let card = &mut session.cards[index];
        card.revealed = true;
        card.revealed_by = Some(actor_id);
        let card = card.clone();

        let completed = Self::winner_by_completion(&session.cards, acting_team);

        let (winner, turn_changed) = if card.card_type == CardType::Assassin {
            (Some(acting_team.opponent()), false)
        } else if completed.is_some() {
            (completed, false)
        } else {
            (None, card.card_type.owner() != Some(acting_team))
        };

        if let Some(winner) = winner {
            Self::finish(session, winner);
        } else if turn_changed {
            Self::advance_turn(session);
        }

        Ok(RevealOutcome {
            card,
            next_turn: session.current_turn,
            winner: session.winner,
            turn_changed,
        })
    }

    /// Record a clue from the active team's codegiver.
    pub fn give_hint(
        session: &mut GameSession,
        actor_id: Uuid,
        word: &str,
        count: i32,
    ) -> Result<Hint, GameError> {
        let current = Self::ensure_in_progress(session)?;

        let actor = session.player(actor_id).ok_or(GameError::PlayerNotFound)?;
        if actor.role != Some(Role::Codegiver) {
            return Err(GameError::WrongRole {
                expected: "codegiver",
            });
        }
        let team = Self::ensure_turn(actor, current)?;

        let (word, count) = HintValidator::validate(word, count, &session.cards)?;

        let hint = Hint {
            id: Uuid::new_v4(),
            player_id: actor_id,
            word,
            count,
            team,
            turn_number: session.turn_number,
            created_at: Utc::now(),
        };
        session.hints.push(hint.clone());
        Ok(hint)
    }

    /// End `team`'s turn voluntarily. Returns the team now on turn.
    pub fn pass_turn(session: &mut GameSession, team: Team) -> Result<Team, GameError> {
        let current = Self::ensure_in_progress(session)?;
        if team != current {
            return Err(GameError::NotYourTurn(current));
        }

        Ok(Self::advance_turn(session))
    }

    fn ensure_in_progress(session: &GameSession) -> Result<Team, GameError> {
        match session.status {
            GameStatus::Playing => {}
            GameStatus::Finished => return Err(GameError::GameOver),
            status => return Err(GameError::not_playing(status)),
        }
        if session.winner.is_some() {
            return Err(GameError::GameOver);
        }
        session
            .current_turn
            .ok_or(GameError::not_playing(session.status))
    }

    fn ensure_turn(actor: &Player, current: Team) -> Result<Team, GameError> {
        match actor.team.team() {
            None => Err(GameError::Spectator),
            Some(team) if team != current => Err(GameError::NotYourTurn(current)),
            Some(team) => Ok(team),
        }
    }

    /// A team wins when all of its cards are face up. If one flip completes
    /// both colours at once, the team whose flip it was takes the win.
    fn winner_by_completion(cards: &[Card], acting: Team) -> Option<Team> {
        let counts = TeamCounts::from_cards(cards);
        [acting, acting.opponent()]
            .into_iter()
            .find(|&team| counts.is_complete(team))
    }

    fn advance_turn(session: &mut GameSession) -> Team {
        let next = session
            .current_turn
            .map(Team::opponent)
            .unwrap_or(LayoutSpec::STANDARD.first_team);
        session.current_turn = Some(next);
        session.turn_number += 1;
        session.turn_started_at = Some(Utc::now());
        next
    }

    fn finish(session: &mut GameSession, winner: Team) {
        session.status = GameStatus::Finished;
        session.winner = Some(winner);
        session.current_turn = None;
        session.finished_at = Some(Utc::now());
    }
}
