//! Seeded train/holdout partitioning.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use noshow_model::{NoShowError, Result};

/// Row positions of the two partitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoldoutSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` and hold out `ceil(test_fraction × n)` rows.
///
/// Both partitions must be non-empty.
pub fn train_test_indices(n: usize, test_fraction: f64, seed: u64) -> Result<HoldoutSplit> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(NoShowError::insufficient(format!(
            "holdout fraction {test_fraction} must be between 0 and 1"
        )));
    }
    let n_test = (test_fraction * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(NoShowError::insufficient(format!(
            "{n} rows cannot be split into non-empty training and holdout partitions"
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);
    let train = order.split_off(n_test);
    Ok(HoldoutSplit { train, test: order })
}
