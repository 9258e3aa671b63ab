// Game engine modules

pub mod engine;
pub mod error;
pub mod grid;
pub mod layout;
pub mod room;
pub mod validator;
pub mod view;
pub mod words;

pub use engine::{RevealOutcome, TurnEngine};
pub use error::{GameError, HintError};
pub use grid::GridGenerator;
pub use layout::{LayoutGenerator, LayoutSpec, GRID_SIZE};
pub use room::RoomModel;
pub use validator::HintValidator;
pub use view::{CardView, RoomSummary, SessionView};
pub use words::WordSelector;
