//! Shared domain types for appointment no-show prediction.
//!
//! This crate holds the vocabulary the other crates agree on:
//!
//! - **error**: the error taxonomy surfaced to operators
//! - **risk**: probability to risk-tier mapping
//! - **columns**: well-known column names and match patterns
//! - **schema**: feature-column schema captured at training time
//! - **options**: training and forest configuration

pub mod columns;
pub mod error;
pub mod options;
pub mod risk;
pub mod schema;

pub use error::{NoShowError, Result};
pub use options::{ForestOptions, MaxFeatures, TrainingOptions};
pub use risk::{RiskTier, risk_tier};
pub use schema::FeatureColumns;
