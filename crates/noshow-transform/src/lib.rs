//! Appointment table transformations.
//!
//! This crate turns a normalized appointment table into a resolved dataset
//! ready for modelling:
//!
//! - **target**: outcome column discovery and label coercion to `{0, 1}`
//! - **datetime**: timestamp parsing and elapsed-day arithmetic
//! - **features**: date parsing, `waiting_days` derivation, dtype filtering
//! - **balance**: minority-class resampling with replacement
//! - **split**: seeded train/holdout partitioning

pub mod balance;
pub mod datetime;
pub mod features;
pub mod split;
pub mod target;

pub use balance::{ClassCounts, balance_classes, balanced_indices, class_counts};
pub use datetime::{elapsed_days, parse_timestamp};
pub use features::{
    ColumnKind, DerivedFeatures, classify_feature_columns, column_kind, derive_features,
    retain_supported_columns,
};
pub use split::{HoldoutSplit, train_test_indices};
pub use target::{
    ResolvedOutcomes, TargetResolution, map_outcome, outcome_values, require_target_column,
    resolve_outcomes, resolve_target_column,
};
