//! Team and role bookkeeping for a room.
//!
//! These rules hold regardless of game progress: each competing team has at
//! most one codegiver, and spectators never carry a role.

use uuid::Uuid;

use super::error::GameError;
use crate::models::{GameSession, Player, PlayerTeam, Role, Team};

/// Default cap on players per room
pub const MAX_PLAYERS: usize = 12;

pub struct RoomModel;

impl RoomModel {
    /// Add a new spectator to the room
    pub fn join(
        session: &mut GameSession,
        nickname: &str,
        max_players: usize,
    ) -> Result<Player, GameError> {
        if session.players.len() >= max_players {
            return Err(GameError::RoomFull(max_players));
        }

        let is_host = session.players.iter().all(|p| p.is_automated);
        let player = Player::new(nickname.trim(), is_host);
        session.players.push(player.clone());
        Ok(player)
    }

    /// Move a player to `team` with `role`.
    ///
    /// Spectators always end up without a role; a competing team with no role
    /// given defaults to guesser. Reassigning the current codegiver to the
    /// same slot is a no-op rather than a conflict.
    pub fn set_team_and_role(
        session: &mut GameSession,
        player_id: Uuid,
        team: PlayerTeam,
        role: Option<Role>,
    ) -> Result<Player, GameError> {
        let role = match team {
            PlayerTeam::Spectator => None,
            PlayerTeam::Red | PlayerTeam::Blue => Some(role.unwrap_or(Role::Guesser)),
        };

        if session.player(player_id).is_none() {
            return Err(GameError::PlayerNotFound);
        }

        if let (Some(team), Some(Role::Codegiver)) = (team.team(), role) {
            let taken = session
                .players
                .iter()
                .any(|p| p.id != player_id && p.is_codegiver_for(team));
            if taken {
                return Err(GameError::RoleTaken(team));
            }
        }

        let player = session
            .player_mut(player_id)
            .ok_or(GameError::PlayerNotFound)?;
        player.team = team;
        player.role = role;
        Ok(player.clone())
    }

    /// Seat an automated codegiver on `team`. It occupies the same slot a
    /// human codegiver would.
    pub fn add_automated_codegiver(
        session: &mut GameSession,
        team: Team,
        max_players: usize,
    ) -> Result<Player, GameError> {
        if session.codegiver(team).is_some() {
            return Err(GameError::RoleTaken(team));
        }
        if session.players.len() >= max_players {
            return Err(GameError::RoomFull(max_players));
        }

        let player = Player::automated(team);
        session.players.push(player.clone());
        Ok(player)
    }

    /// Remove a player. If the host leaves, the longest-standing human
    /// player inherits the room.
    pub fn remove_player(session: &mut GameSession, player_id: Uuid) -> Result<Player, GameError> {
        let index = session
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(GameError::PlayerNotFound)?;
        let removed = session.players.remove(index);

        if removed.is_host {
            if let Some(next) = session
                .players
                .iter_mut()
                .filter(|p| !p.is_automated)
                .min_by_key(|p| p.joined_at)
            {
                next.is_host = true;
            }
        }

        Ok(removed)
    }

    /// Both teams need at least one player and exactly one codegiver
    pub fn readiness(session: &GameSession) -> Result<(), GameError> {
        for team in [Team::Red, Team::Blue] {
            if session.team_members(team).next().is_none() {
                return Err(GameError::NotReady(format!("{} team has no players", team)));
            }

            let codegivers = session
                .team_members(team)
                .filter(|p| p.role == Some(Role::Codegiver))
                .count();
            if codegivers != 1 {
                return Err(GameError::NotReady(format!(
                    "{} team needs exactly one codegiver, has {}",
                    team, codegivers
                )));
            }
        }
        Ok(())
    }

    pub fn can_start_game(session: &GameSession) -> bool {
        Self::readiness(session).is_ok()
    }
}
