//! Inference run: score a batch with a loaded pipeline and attach risk tiers.

use std::collections::BTreeMap;
use std::time::Instant;

use polars::prelude::DataFrame;
use tracing::{debug, info, info_span};

use noshow_common::{column_names, set_f64_column, set_i64_column, set_string_column};
use noshow_ingest::{NormalizeMode, normalize_columns};
use noshow_model::columns::{PROBABILITY_COLUMN, RISK_LEVEL_COLUMN};
use noshow_model::{NoShowError, Result, RiskTier};
use noshow_transform::{TargetResolution, derive_features, resolve_target_column};

use crate::pipeline::TrainedPipeline;

/// A batch prepared for scoring.
#[derive(Debug, Clone)]
pub struct ScoringFrame {
    /// Normalized input; this is what gets annotated and written out.
    pub output: DataFrame,
    /// Normalized input with derived features and an outcome column.
    pub features: DataFrame,
    /// Outcome column name in `features`.
    pub target: String,
    /// Whether the outcome column was injected as a placeholder.
    pub injected_target: bool,
}

/// Normalize a batch and derive the features the pipeline consumes.
///
/// If no outcome column is present, `target` is added to the scoring copy
/// with every value `0`. Outcome values are display-only: the pipeline never
/// reads them, and the placeholder never reaches [`ScoringFrame::output`].
pub fn prepare_scoring_frame(df: DataFrame, target: &str) -> Result<ScoringFrame> {
    let output = normalize_columns(df, NormalizeMode::LowercaseOnly)?;
    let mut scoring = output.clone();

    let (target, injected_target) = match resolve_target_column(&column_names(&output)) {
        TargetResolution::Found(name) => (name, false),
        TargetResolution::NotFound => {
            let rows = scoring.height();
            set_i64_column(&mut scoring, target, vec![Some(0); rows])?;
            debug!(target_column = target, "injected placeholder outcome column");
            (target.to_string(), true)
        }
    };

    let derived = derive_features(scoring, &target)?;
    Ok(ScoringFrame {
        output,
        features: derived.frame,
        target,
        injected_target,
    })
}

/// A scored batch.
#[derive(Debug, Clone)]
pub struct ScoredBatch {
    /// Normalized input plus the probability and risk-level columns.
    pub frame: DataFrame,
    pub probabilities: Vec<f64>,
    pub tiers: Vec<RiskTier>,
    pub injected_target: bool,
    pub elapsed_ms: u128,
}

impl ScoredBatch {
    /// Number of rows per risk tier; every tier is present.
    pub fn tier_counts(&self) -> BTreeMap<RiskTier, usize> {
        let mut counts: BTreeMap<RiskTier, usize> =
            RiskTier::ALL.iter().map(|tier| (*tier, 0)).collect();
        for tier in &self.tiers {
            *counts.entry(*tier).or_default() += 1;
        }
        counts
    }
}

/// Score every row of `df`.
///
/// Any failure while predicting is wrapped in [`NoShowError::Prediction`];
/// no partial result is returned for a failed batch.
pub fn score_batch(pipeline: &TrainedPipeline, df: DataFrame) -> Result<ScoredBatch> {
    let span = info_span!("predict", rows = df.height());
    let _guard = span.enter();
    let start = Instant::now();

    let prepared = prepare_scoring_frame(df, pipeline.target())?;
    let rows = prepared.features.height();
    let probabilities = pipeline
        .predict_proba(&prepared.features)
        .map_err(|e| NoShowError::prediction(format!("scoring a batch of {rows} rows"), e))?;
    let tiers: Vec<RiskTier> = probabilities
        .iter()
        .map(|p| RiskTier::from_probability(*p))
        .collect();

    let mut frame = prepared.output;
    set_f64_column(
        &mut frame,
        PROBABILITY_COLUMN,
        probabilities.iter().copied().map(Some).collect(),
    )?;
    set_string_column(
        &mut frame,
        RISK_LEVEL_COLUMN,
        tiers.iter().map(|tier| tier.as_str().to_string()).collect(),
    )?;

    let elapsed_ms = start.elapsed().as_millis();
    info!(rows, injected_target = prepared.injected_target, elapsed_ms, "scored batch");
    Ok(ScoredBatch {
        frame,
        probabilities,
        tiers,
        injected_target: prepared.injected_target,
        elapsed_ms,
    })
}
