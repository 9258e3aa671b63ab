use super::error::HintError;
use crate::models::Card;

/// Largest hint count a codegiver may announce
pub const MAX_HINT_COUNT: i32 = 9;

pub struct HintValidator;

impl HintValidator {
    /// Check a proposed hint against the board. Returns the trimmed word and
    /// the count narrowed to `u8` on success.
    ///
    /// Whether the hint is actually related to any card is left to the
    /// codegiver; only the mechanical rules are enforced here.
    pub fn validate(word: &str, count: i32, cards: &[Card]) -> Result<(String, u8), HintError> {
        let word = word.trim();

        if word.is_empty() {
            return Err(HintError::Empty);
        }

        if word.chars().any(char::is_whitespace) {
            return Err(HintError::MultipleWords(word.to_string()));
        }

        if Self::is_on_board(word, cards) {
            return Err(HintError::OnBoard(word.to_string()));
        }

        if !(0..=MAX_HINT_COUNT).contains(&count) {
            return Err(HintError::InvalidCount(count));
        }

        Ok((word.to_string(), count as u8))
    }

    /// Revealed cards count too: a hint may never repeat a board word
    pub fn is_on_board(word: &str, cards: &[Card]) -> bool {
        let word = word.trim().to_lowercase();
        cards.iter().any(|card| card.word.trim().to_lowercase() == word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CardType;
    use uuid::Uuid;

    fn board() -> Vec<Card> {
        ["Ocean", "Piano", "Moon"]
            .iter()
            .enumerate()
            .map(|(i, w)| Card {
                id: Uuid::new_v4(),
                word: w.to_string(),
                card_type: CardType::Neutral,
                revealed: i == 2,
                revealed_by: None,
                position: i as u8,
            })
            .collect()
    }

    #[test]
    fn test_rejects_board_word_case_insensitive() {
        assert_eq!(
            HintValidator::validate("OCEAN", 2, &board()),
            Err(HintError::OnBoard("OCEAN".to_string()))
        );
        assert_eq!(
            HintValidator::validate("piano", 1, &board()),
            Err(HintError::OnBoard("piano".to_string()))
        );
    }

    #[test]
    fn test_rejects_revealed_board_word() {
        assert!(matches!(
            HintValidator::validate("moon", 1, &board()),
            Err(HintError::OnBoard(_))
        ));
    }

    #[test]
    fn test_count_bounds() {
        for count in 0..=9 {
            assert_eq!(
                HintValidator::validate("water", count, &board()),
                Ok(("water".to_string(), count as u8))
            );
        }
        assert_eq!(
            HintValidator::validate("water", -1, &board()),
            Err(HintError::InvalidCount(-1))
        );
        assert_eq!(
            HintValidator::validate("water", 10, &board()),
            Err(HintError::InvalidCount(10))
        );
    }

    #[test]
    fn test_rejects_empty_and_multi_word_hints() {
        assert_eq!(HintValidator::validate("   ", 1, &board()), Err(HintError::Empty));
        assert!(matches!(
            HintValidator::validate("deep sea", 1, &board()),
            Err(HintError::MultipleWords(_))
        ));
    }

    #[test]
    fn test_trims_accepted_word() {
        assert_eq!(
            HintValidator::validate("  tide ", 3, &board()),
            Ok(("tide".to_string(), 3))
        );
    }
}
