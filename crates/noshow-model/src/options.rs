//! Configuration options for training.

use serde::{Deserialize, Serialize};

/// Seed shared by balancing, the holdout split and the forest by default.
pub const DEFAULT_SEED: u64 = 42;

/// Number of trees in the forest by default.
pub const DEFAULT_TREES: usize = 150;

/// Fraction of the balanced set held out for evaluation.
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

/// Number of candidate features examined at each split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MaxFeatures {
    /// `floor(sqrt(n_features))`, at least one.
    #[default]
    Sqrt,
    /// `floor(log2(n_features))`, at least one.
    Log2,
    /// Every feature.
    All,
}

impl MaxFeatures {
    /// Resolve the candidate count for a matrix with `n_features` columns.
    pub fn resolve(self, n_features: usize) -> usize {
        let count = match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().floor() as usize,
            MaxFeatures::Log2 => (n_features as f64).log2().floor() as usize,
            MaxFeatures::All => n_features,
        };
        count.clamp(1, n_features.max(1))
    }
}

/// Options for the random-forest classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestOptions {
    /// Number of decision trees.
    pub n_trees: usize,
    /// Maximum tree depth; `None` grows until leaves are pure.
    pub max_depth: Option<usize>,
    /// Minimum samples required to split a node.
    pub min_samples_split: usize,
    /// Minimum samples required in each child.
    pub min_samples_leaf: usize,
    /// Candidate features per split.
    pub max_features: MaxFeatures,
    /// Draw a bootstrap sample for each tree.
    pub bootstrap: bool,
    /// Seed for bootstrap draws and feature sampling.
    pub seed: u64,
}

impl Default for ForestOptions {
    fn default() -> Self {
        Self {
            n_trees: DEFAULT_TREES,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::default(),
            bootstrap: true,
            seed: DEFAULT_SEED,
        }
    }
}

/// Options controlling a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingOptions {
    /// Seed for class balancing and the holdout split.
    pub seed: u64,
    /// Fraction of the balanced set held out for the classification report.
    pub test_fraction: f64,
    /// Classifier options.
    pub forest: ForestOptions,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            test_fraction: DEFAULT_TEST_FRACTION,
            forest: ForestOptions::default(),
        }
    }
}

impl TrainingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use one seed for balancing, splitting and the forest.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.forest.seed = seed;
        self
    }

    #[must_use]
    pub fn with_trees(mut self, n_trees: usize) -> Self {
        self.forest.n_trees = n_trees;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.forest.max_depth = max_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_run() {
        let options = TrainingOptions::default();
        assert_eq!(options.seed, 42);
        assert_eq!(options.forest.n_trees, 150);
        assert!((options.test_fraction - 0.2).abs() < f64::EPSILON);
        assert_eq!(options.forest.max_features, MaxFeatures::Sqrt);
    }

    #[test]
    fn with_seed_updates_forest() {
        let options = TrainingOptions::new().with_seed(7).with_trees(10);
        assert_eq!(options.seed, 7);
        assert_eq!(options.forest.seed, 7);
        assert_eq!(options.forest.n_trees, 10);
    }

    #[test]
    fn max_features_resolves_at_least_one() {
        assert_eq!(MaxFeatures::Sqrt.resolve(16), 4);
        assert_eq!(MaxFeatures::Sqrt.resolve(1), 1);
        assert_eq!(MaxFeatures::Log2.resolve(1), 1);
        assert_eq!(MaxFeatures::Log2.resolve(8), 3);
        assert_eq!(MaxFeatures::All.resolve(5), 5);
    }

    #[test]
    fn options_serialize() {
        let options = TrainingOptions::default();
        let json = serde_json::to_string(&options).expect("serialize options");
        let round: TrainingOptions = serde_json::from_str(&json).expect("deserialize options");
        assert_eq!(round, options);
    }
}
