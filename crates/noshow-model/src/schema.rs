//! Feature-column schema captured when the pipeline is built.

use serde::{Deserialize, Serialize};

/// Numeric and categorical feature columns, in frame order.
///
/// The outcome column is never part of either list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureColumns {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl FeatureColumns {
    pub fn new(numeric: Vec<String>, categorical: Vec<String>) -> Self {
        Self {
            numeric,
            categorical,
        }
    }

    pub fn len(&self) -> usize {
        self.numeric.len() + self.categorical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numeric.is_empty() && self.categorical.is_empty()
    }

    /// All feature columns, numeric first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.numeric
            .iter()
            .chain(self.categorical.iter())
            .map(String::as_str)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.iter().any(|name| name == column)
    }
}
