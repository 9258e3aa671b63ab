pub mod game;
pub mod player;
pub mod word_pack;

pub use game::{
    // Board
    Card, CardType, Hint, TeamCount, TeamCounts,
    // Session
    GameSession, GameStatus, Team,
};
pub use player::{Player, PlayerTeam, Role};
pub use word_pack::{WordPack, WordPackChanges, WordPackDetail};
