//! Deterministic train/test partitioning.
//!
//! The permutation is driven by `Xoshiro256PlusPlus`, whose output stream is
//! fixed by its specification, so a given `(n_rows, test_fraction, seed)`
//! always yields the same row membership.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Partition seed used unless configured otherwise.
pub const DEFAULT_SEED: u64 = 42;

/// Held-out share used unless configured otherwise.
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

/// Row indices of the two partitions, in permuted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Number of held-out rows for `n_rows`.
///
/// `ceil(test_fraction * n_rows)`, but never the whole dataset: at least one
/// row always remains for training when `n_rows >= 1`.
pub fn test_size(n_rows: usize, test_fraction: f64) -> usize {
    debug_assert!((0.0..1.0).contains(&test_fraction));
    if n_rows == 0 {
        return 0;
    }
    let n_test = (test_fraction * n_rows as f64).ceil() as usize;
    n_test.min(n_rows - 1)
}

/// Deterministic train/test split indices.
///
/// Shuffles `0..n_rows` with a seeded Fisher-Yates shuffle; the first
/// [`test_size`] indices are held out and the remainder train.
pub fn split_indices(n_rows: usize, test_fraction: f64, seed: u64) -> Partition {
    let mut idx: Vec<usize> = (0..n_rows).collect();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    idx.shuffle(&mut rng);

    let n_test = test_size(n_rows, test_fraction);
    let train = idx.split_off(n_test);

    tracing::debug!(
        n_rows,
        n_train = train.len(),
        n_test = idx.len(),
        seed,
        "partitioned dataset"
    );

    Partition { train, test: idx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0)]
    #[case(1, 0)]
    #[case(2, 1)]
    #[case(5, 1)]
    #[case(10, 2)]
    #[case(11, 3)]
    #[case(1338, 268)]
    fn test_size_rounds_up_but_keeps_a_training_row(#[case] n_rows: usize, #[case] expected: usize) {
        assert_eq!(test_size(n_rows, DEFAULT_TEST_FRACTION), expected);
    }

    #[test]
    fn same_seed_same_partition() {
        let a = split_indices(100, 0.2, 42);
        let b = split_indices(100, 0.2, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn different_seed_different_partition() {
        let a = split_indices(100, 0.2, 42);
        let b = split_indices(100, 0.2, 7);
        assert_ne!(a.test, b.test);
    }

    #[test]
    fn single_row_goes_to_training() {
        let p = split_indices(1, 0.2, DEFAULT_SEED);
        assert_eq!(p.train, vec![0]);
        assert!(p.test.is_empty());
    }

    #[test]
    fn zero_fraction_keeps_everything() {
        let p = split_indices(10, 0.0, DEFAULT_SEED);
        assert_eq!(p.train.len(), 10);
        assert!(p.test.is_empty());
    }

    proptest! {
        #[test]
        fn partition_covers_every_row_once(n_rows in 0usize..500, seed in any::<u64>()) {
            let p = split_indices(n_rows, DEFAULT_TEST_FRACTION, seed);
            let mut all: Vec<usize> = p.train.iter().chain(p.test.iter()).copied().collect();
            all.sort_unstable();
            prop_assert_eq!(all, (0..n_rows).collect::<Vec<_>>());
            prop_assert_eq!(p.test.len(), test_size(n_rows, DEFAULT_TEST_FRACTION));
        }
    }
}
