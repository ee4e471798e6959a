//! Random-forest classifier for binary outcomes.
//!
//! Each tree is a CART grown on a bootstrap sample with Gini impurity,
//! examining a random subset of features at every split. Leaves store the
//! fraction of no-show samples they received; the forest probability is the
//! mean leaf fraction across trees.

use ndarray::{ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use noshow_model::{ForestOptions, NoShowError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        probability: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A fitted decision tree stored as a flat node list; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Probability of outcome `1` for one feature row.
    pub fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(Node::Leaf { probability }) => return *probability,
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    idx = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                None => return 0.0,
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

/// A node whose children are still to be decided.
struct OpenNode {
    node: usize,
    samples: Vec<usize>,
    depth: usize,
}

struct TreeBuilder<'x, 'y, 'o> {
    x: ArrayView2<'x, f64>,
    y: ArrayView1<'y, u8>,
    options: &'o ForestOptions,
    max_features: usize,
    rng: StdRng,
    nodes: Vec<Node>,
}

fn gini(positives: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let p = positives as f64 / total as f64;
    2.0 * p * (1.0 - p)
}

impl TreeBuilder<'_, '_, '_> {
    /// Grow depth-first from an explicit stack, left subtree before right.
    fn grow(mut self, samples: Vec<usize>) -> DecisionTree {
        let root = self.push_leaf(&samples);
        let mut open = vec![OpenNode {
            node: root,
            samples,
            depth: 0,
        }];
        while let Some(OpenNode {
            node,
            samples,
            depth,
        }) = open.pop()
        {
            let Some(split) = self.split_for(&samples, depth) else {
                continue;
            };
            let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
                .into_iter()
                .partition(|&idx| self.x[[idx, split.feature]] <= split.threshold);
            let left = self.push_leaf(&left_samples);
            let right = self.push_leaf(&right_samples);
            self.nodes[node] = Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
            };
            open.push(OpenNode {
                node: right,
                samples: right_samples,
                depth: depth + 1,
            });
            open.push(OpenNode {
                node: left,
                samples: left_samples,
                depth: depth + 1,
            });
        }
        DecisionTree { nodes: self.nodes }
    }

    fn positives(&self, samples: &[usize]) -> usize {
        samples.iter().filter(|&&idx| self.y[idx] == 1).count()
    }

    fn push_leaf(&mut self, samples: &[usize]) -> usize {
        let probability = self.positives(samples) as f64 / samples.len().max(1) as f64;
        self.nodes.push(Node::Leaf { probability });
        self.nodes.len() - 1
    }

    /// Split for a node, or `None` when it stays a leaf.
    fn split_for(&mut self, samples: &[usize], depth: usize) -> Option<SplitCandidate> {
        let total = samples.len();
        let positives = self.positives(samples);
        let pure = positives == 0 || positives == total;
        let depth_reached = self.options.max_depth.is_some_and(|max| depth >= max);
        if pure
            || depth_reached
            || total < self.options.min_samples_split
            || total < 2 * self.options.min_samples_leaf
        {
            return None;
        }
        self.best_split(samples, positives)
    }

    /// Best Gini split over a random feature subset.
    ///
    /// Features are visited in random order; the search stops once at least
    /// `max_features` were examined and a valid split was found.
    fn best_split(&mut self, samples: &[usize], positives: usize) -> Option<SplitCandidate> {
        let mut features: Vec<usize> = (0..self.x.ncols()).collect();
        features.shuffle(&mut self.rng);

        let total = samples.len();
        let min_leaf = self.options.min_samples_leaf.max(1);
        let mut best: Option<SplitCandidate> = None;
        let mut ordered: Vec<(f64, u8)> = Vec::with_capacity(total);

        for (visited, &feature) in features.iter().enumerate() {
            if visited >= self.max_features && best.is_some() {
                break;
            }
            let column = self.x.column(feature);
            ordered.clear();
            ordered.extend(samples.iter().map(|&idx| (column[idx], self.y[idx])));
            ordered.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_positives = 0usize;
            for split_at in 1..total {
                left_positives += usize::from(ordered[split_at - 1].1);
                let (low, high) = (ordered[split_at - 1].0, ordered[split_at].0);
                if low == high {
                    continue;
                }
                let left_total = split_at;
                let right_total = total - split_at;
                if left_total < min_leaf || right_total < min_leaf {
                    continue;
                }
                let impurity = (left_total as f64 * gini(left_positives, left_total)
                    + right_total as f64 * gini(positives - left_positives, right_total))
                    / total as f64;
                if best.as_ref().is_none_or(|b| impurity < b.impurity) {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: low + (high - low) / 2.0,
                        impurity,
                    });
                }
            }
        }
        best
    }
}

/// Bagged ensemble of decision trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForestClassifier {
    /// Fit on `x` with labels `y` in `{0, 1}`.
    ///
    /// Fails when the inputs disagree in length, are empty, or hold a single
    /// outcome class.
    pub fn fit(
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, u8>,
        options: &ForestOptions,
    ) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(NoShowError::insufficient(format!(
                "{} feature rows but {} labels",
                x.nrows(),
                y.len()
            )));
        }
        let positives = y.iter().filter(|&&label| label == 1).count();
        if positives == 0 || positives == y.len() {
            return Err(NoShowError::insufficient(
                "training data must contain both outcome classes",
            ));
        }
        if options.n_trees == 0 {
            return Err(NoShowError::insufficient("forest needs at least one tree"));
        }

        let n = y.len();
        let max_features = options.max_features.resolve(x.ncols());
        let mut master = StdRng::seed_from_u64(options.seed);
        let trees: Vec<DecisionTree> = (0..options.n_trees)
            .map(|_| {
                let mut rng = StdRng::seed_from_u64(master.random());
                let samples: Vec<usize> = if options.bootstrap {
                    (0..n).map(|_| rng.random_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                TreeBuilder {
                    x,
                    y,
                    options,
                    max_features,
                    rng,
                    nodes: Vec::new(),
                }
                .grow(samples)
            })
            .collect();

        debug!(
            trees = trees.len(),
            rows = n,
            features = x.ncols(),
            max_features,
            nodes = trees.iter().map(DecisionTree::node_count).sum::<usize>(),
            "fitted random forest"
        );
        Ok(Self {
            n_features: x.ncols(),
            trees,
        })
    }

    /// Probability of outcome `1` for each row.
    pub fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Vec<f64>> {
        if self.trees.is_empty() {
            return Err(NoShowError::NotFitted {
                component: "random forest",
            });
        }
        if x.ncols() != self.n_features {
            return Err(NoShowError::FeatureMismatch {
                expected: self.n_features,
                found: x.ncols(),
            });
        }
        let n_trees = self.trees.len() as f64;
        Ok(x.axis_iter(Axis(0))
            .map(|row| self.trees.iter().map(|tree| tree.predict_row(row)).sum::<f64>() / n_trees)
            .collect())
    }

    /// Predicted outcome per row: `1` when the probability exceeds one half.
    pub fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Vec<u8>> {
        Ok(self
            .predict_proba(x)?
            .into_iter()
            .map(|p| u8::from(p > 0.5))
            .collect())
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}
