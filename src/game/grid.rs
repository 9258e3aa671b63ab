use rand::Rng;
use uuid::Uuid;

use super::{
    error::GameError,
    layout::{LayoutGenerator, LayoutSpec},
    words::WordSelector,
};
use crate::models::Card;

pub struct GridGenerator;

impl GridGenerator {
    /// Generate a fresh board: sample words, shuffle card types and pair them
    /// up positionally.
    pub fn generate<R: Rng + ?Sized>(
        spec: &LayoutSpec,
        candidates: &[String],
        rng: &mut R,
    ) -> Result<Vec<Card>, GameError> {
        let words = WordSelector::select(candidates, spec.total(), rng)?;
        let layout = LayoutGenerator::generate(spec, rng);

        let cards = words
            .into_iter()
            .zip(layout)
            .enumerate()
            .map(|(position, (word, card_type))| {
                Ok(Card {
                    id: Uuid::new_v4(),
                    word,
                    card_type,
                    revealed: false,
                    revealed_by: None,
                    position: u8::try_from(position)
                        .map_err(|_| GameError::LayoutTooLarge(spec.total()))?,
                })
            })
            .collect::<Result<Vec<_>, GameError>>()?;

        Ok(cards)
    }
}
