//! CLI library components for the no-show predictor.

pub mod logging;
pub mod types;
pub mod workflow;
