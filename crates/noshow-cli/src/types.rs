use std::path::PathBuf;

use noshow_pipeline::{ScoredBatch, TrainingRun};

/// Default file for holdout diagnostics written by `train`.
pub const DEFAULT_DIAGNOSTICS_FILE: &str = "no_show_predictions.csv";

/// Default file for scored batches written by `predict`.
pub const DEFAULT_PREDICTIONS_FILE: &str = "predicted_appointments.csv";

#[derive(Debug)]
pub struct TrainResult {
    pub input: PathBuf,
    pub model_path: PathBuf,
    pub diagnostics_path: PathBuf,
    pub run: TrainingRun,
}

#[derive(Debug)]
pub struct PredictResult {
    pub input: PathBuf,
    pub model_path: PathBuf,
    pub output_path: PathBuf,
    pub batch: ScoredBatch,
}
