use rand::Rng;

use crate::{
    models::{CardType, Team},
    utils::shuffle::shuffled,
};

/// Number of cards on a standard board
pub const GRID_SIZE: usize = 25;

/// The team that opens every game
pub const FIRST_TEAM: Team = Team::Red;

/// How many cards of each kind a board holds.
///
/// The first team gets one extra card to offset the advantage of moving first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutSpec {
    pub first_team: Team,
    pub first_team_cards: usize,
    pub second_team_cards: usize,
    pub neutral_cards: usize,
    pub assassin_cards: usize,
}

impl LayoutSpec {
    pub const STANDARD: LayoutSpec = LayoutSpec {
        first_team: FIRST_TEAM,
        first_team_cards: 9,
        second_team_cards: 8,
        neutral_cards: 7,
        assassin_cards: 1,
    };

    pub fn total(&self) -> usize {
        self.first_team_cards + self.second_team_cards + self.neutral_cards + self.assassin_cards
    }

    /// The unshuffled multiset of labels
    fn labels(&self) -> Vec<CardType> {
        let first = CardType::for_team(self.first_team);
        let second = CardType::for_team(self.first_team.opponent());

        let mut labels = Vec::with_capacity(self.total());
        labels.extend(std::iter::repeat_n(first, self.first_team_cards));
        labels.extend(std::iter::repeat_n(second, self.second_team_cards));
        labels.extend(std::iter::repeat_n(CardType::Neutral, self.neutral_cards));
        labels.extend(std::iter::repeat_n(CardType::Assassin, self.assassin_cards));
        labels
    }
}

impl Default for LayoutSpec {
    fn default() -> Self {
        Self::STANDARD
    }
}

pub struct LayoutGenerator;

impl LayoutGenerator {
    /// Generate a uniformly shuffled assignment of card types for `spec`
    pub fn generate<R: Rng + ?Sized>(spec: &LayoutSpec, rng: &mut R) -> Vec<CardType> {
        shuffled(spec.labels(), rng)
    }

    /// Standard 9/8/7/1 layout from the thread-local RNG
    pub fn standard() -> Vec<CardType> {
        Self::generate(&LayoutSpec::STANDARD, &mut rand::rng())
    }
}
