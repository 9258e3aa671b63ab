use std::collections::HashSet;

use rand::Rng;

use super::error::GameError;
use crate::utils::shuffle::sample;

pub struct WordSelector;

impl WordSelector {
    /// Pick `count` distinct words uniformly at random from `candidates`.
    ///
    /// Candidates are trimmed, blanks dropped and duplicates removed
    /// (case-insensitively, first spelling wins) before sampling.
    pub fn select<R: Rng + ?Sized>(
        candidates: &[String],
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<String>, GameError> {
        let distinct = Self::distinct(candidates);

        if distinct.len() < count {
            return Err(GameError::InsufficientWords {
                available: distinct.len(),
                required: count,
            });
        }

        Ok(sample(distinct, count, rng))
    }

    fn distinct(candidates: &[String]) -> Vec<String> {
        let mut seen = HashSet::with_capacity(candidates.len());
        candidates
            .iter()
            .map(|word| word.trim())
            .filter(|word| !word.is_empty())
            .filter(|word| seen.insert(word.to_lowercase()))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn pack(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("WORD{}", i)).collect()
    }

    #[test]
    fn test_selects_distinct_words() {
        let mut rng = StdRng::seed_from_u64(5);
        let words = WordSelector::select(&pack(100), 25, &mut rng).unwrap();
        assert_eq!(words.len(), 25);
        let unique: HashSet<_> = words.iter().collect();
        assert_eq!(unique.len(), 25);
    }

    #[test]
    fn test_exactly_enough_words_uses_all_of_them() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut words = WordSelector::select(&pack(25), 25, &mut rng).unwrap();
        words.sort();
        let mut expected = pack(25);
        expected.sort();
        assert_eq!(words, expected);
    }

    #[test]
    fn test_insufficient_words() {
        let mut rng = StdRng::seed_from_u64(5);
        let err = WordSelector::select(&pack(24), 25, &mut rng).unwrap_err();
        assert_eq!(
            err,
            GameError::InsufficientWords {
                available: 24,
                required: 25
            }
        );
    }

    #[test]
    fn test_duplicates_do_not_count_towards_minimum() {
        let mut candidates = pack(24);
        candidates.push("word0".to_string());
        candidates.push("  ".to_string());
        let mut rng = StdRng::seed_from_u64(5);
        let err = WordSelector::select(&candidates, 25, &mut rng).unwrap_err();
        assert!(matches!(err, GameError::InsufficientWords { available: 24, .. }));
    }

    #[test]
    fn test_words_are_trimmed() {
        let candidates: Vec<String> = (0..25).map(|i| format!("  w{} ", i)).collect();
        let mut rng = StdRng::seed_from_u64(5);
        let words = WordSelector::select(&candidates, 25, &mut rng).unwrap();
        assert!(words.iter().all(|w| !w.starts_with(' ') && !w.ends_with(' ')));
    }
}
