use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::game::Team;

/// Which side of the table a player sits on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PlayerTeam {
    Red,
    Blue,
    Spectator,
}

impl PlayerTeam {
    /// The competing team, or `None` for spectators
    pub fn team(self) -> Option<Team> {
        match self {
            PlayerTeam::Red => Some(Team::Red),
            PlayerTeam::Blue => Some(Team::Blue),
            PlayerTeam::Spectator => None,
        }
    }
}

impl From<Team> for PlayerTeam {
    fn from(team: Team) -> Self {
        match team {
            Team::Red => PlayerTeam::Red,
            Team::Blue => PlayerTeam::Blue,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Gives the one-word clues
    Codegiver,
    /// Picks cards based on the clue
    Guesser,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub id: Uuid,
    pub nickname: String,
    pub team: PlayerTeam,
    /// Always `None` for spectators
    pub role: Option<Role>,
    pub is_host: bool,
    /// Driven by the hint oracle instead of a human
    pub is_automated: bool,
    pub joined_at: DateTime<Utc>,
}

impl Player {
    /// New players join as spectators and pick a side afterwards
    pub fn new(nickname: impl Into<String>, is_host: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            nickname: nickname.into(),
            team: PlayerTeam::Spectator,
            role: None,
            is_host,
            is_automated: false,
            joined_at: Utc::now(),
        }
    }

    pub fn automated(team: Team) -> Self {
        let nickname = match team {
            Team::Red => "Bot Berry",
            Team::Blue => "Bot Sky",
        };
        Self {
            id: Uuid::new_v4(),
            nickname: nickname.to_string(),
            team: PlayerTeam::from(team),
            role: Some(Role::Codegiver),
            is_host: false,
            is_automated: true,
            joined_at: Utc::now(),
        }
    }

    pub fn is_codegiver_for(&self, team: Team) -> bool {
        self.team == PlayerTeam::from(team) && self.role == Some(Role::Codegiver)
    }

    pub fn is_guesser_for(&self, team: Team) -> bool {
        self.team == PlayerTeam::from(team) && self.role == Some(Role::Guesser)
    }
}
