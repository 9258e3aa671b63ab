use rand::{seq::SliceRandom, Rng};

/// Uniformly shuffle `items` (Fisher-Yates) and return them.
///
/// Shared by layout generation and word selection so both draw from the
/// same source of randomness the caller supplies.
pub fn shuffled<T, R: Rng + ?Sized>(mut items: Vec<T>, rng: &mut R) -> Vec<T> {
    items.shuffle(rng);
    items
}

/// Shuffle then keep the first `count` items: sampling without replacement.
pub fn sample<T, R: Rng + ?Sized>(items: Vec<T>, count: usize, rng: &mut R) -> Vec<T> {
    let mut items = shuffled(items, rng);
    items.truncate(count);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut result = shuffled((0..50).collect::<Vec<_>>(), &mut rng);
        result.sort();
        assert_eq!(result, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_order() {
        let a = shuffled((0..25).collect::<Vec<_>>(), &mut StdRng::seed_from_u64(99));
        let b = shuffled((0..25).collect::<Vec<_>>(), &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_sample_takes_requested_count() {
        let mut rng = StdRng::seed_from_u64(3);
        let picked = sample((0..100).collect::<Vec<_>>(), 25, &mut rng);
        assert_eq!(picked.len(), 25);
    }

    #[test]
    fn test_sample_more_than_available_returns_all() {
        let mut rng = StdRng::seed_from_u64(3);
        let picked = sample(vec![1, 2, 3], 10, &mut rng);
        assert_eq!(picked.len(), 3);
    }
}
