//! Class balancing by minority resampling with replacement.
//!
//! The minority class is redrawn with replacement until it matches the
//! majority count; the majority class is kept as-is. Draws are seeded, so the
//! same seed always yields the same row multiset.

use polars::prelude::DataFrame;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use noshow_common::take_rows;
use noshow_model::{NoShowError, Result};

use crate::target::outcome_values;

/// Row counts per outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassCounts {
    /// Outcome `0` (attended).
    pub attended: usize,
    /// Outcome `1` (no-show).
    pub no_show: usize,
}

impl ClassCounts {
    pub fn total(self) -> usize {
        self.attended + self.no_show
    }
}

pub fn class_counts(outcomes: &[u8]) -> ClassCounts {
    let no_show = outcomes.iter().filter(|&&label| label == 1).count();
    ClassCounts {
        attended: outcomes.len() - no_show,
        no_show,
    }
}

/// Row indices of the balanced set.
///
/// Majority rows come first in their original order, followed by
/// `majority` draws (with replacement) from the minority rows. When both
/// classes are already the same size no resampling happens.
///
/// Fails when either class is empty.
pub fn balanced_indices(outcomes: &[u8], seed: u64) -> Result<Vec<usize>> {
    if outcomes.is_empty() {
        return Err(NoShowError::insufficient("no rows to balance"));
    }
    let (no_show, attended): (Vec<usize>, Vec<usize>) =
        (0..outcomes.len()).partition(|&idx| outcomes[idx] == 1);
    if no_show.is_empty() || attended.is_empty() {
        let missing = if no_show.is_empty() { 1 } else { 0 };
        return Err(NoShowError::insufficient(format!(
            "outcome class {missing} has no rows; both outcomes are required for training"
        )));
    }

    let (majority, minority) = if no_show.len() > attended.len() {
        (no_show, attended)
    } else {
        (attended, no_show)
    };
    if majority.len() == minority.len() {
        let mut indices = majority;
        indices.extend(minority);
        return Ok(indices);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices = Vec::with_capacity(majority.len() * 2);
    let target = majority.len();
    indices.extend(majority);
    for _ in 0..target {
        indices.push(minority[rng.random_range(0..minority.len())]);
    }
    Ok(indices)
}

/// Balance a resolved dataset on its outcome column.
///
/// The result has `2 × majority` rows, half with each outcome; resampled
/// rows are exact copies.
pub fn balance_classes(df: &DataFrame, target: &str, seed: u64) -> Result<DataFrame> {
    let outcomes = outcome_values(df, target)?;
    let before = class_counts(&outcomes);
    let indices = balanced_indices(&outcomes, seed)?;
    let balanced = take_rows(df, &indices)?;
    info!(
        attended = before.attended,
        no_show = before.no_show,
        balanced_rows = balanced.height(),
        seed,
        "balanced classes"
    );
    Ok(balanced)
}
