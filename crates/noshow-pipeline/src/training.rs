//! Training run: raw table to fitted pipeline and holdout diagnostics.

use std::time::Instant;

use polars::prelude::DataFrame;
use tracing::{info, info_span};

use noshow_common::{set_f64_column, set_i64_column, take_rows};
use noshow_ingest::{NormalizeMode, normalize_columns};
use noshow_model::columns::{ACTUAL_COLUMN, PREDICTED_COLUMN, PROBABILITY_COLUMN};
use noshow_model::{FeatureColumns, Result, TrainingOptions};
use noshow_transform::{
    ClassCounts, balance_classes, class_counts, classify_feature_columns, derive_features,
    outcome_values, require_target_column, resolve_outcomes, retain_supported_columns,
    train_test_indices,
};

use crate::metrics::ClassificationReport;
use crate::pipeline::TrainedPipeline;

/// Resolved dataset ready for balancing.
#[derive(Debug, Clone)]
pub struct PreparedFrame {
    /// Normalized rows with a `{0, 1}` outcome and only supported columns.
    pub frame: DataFrame,
    pub target: String,
    pub columns: FeatureColumns,
    /// Rows dropped because their outcome could not be mapped.
    pub dropped_rows: usize,
    /// Columns parsed as timestamps.
    pub date_columns: Vec<String>,
    /// Columns removed because no feature type applies.
    pub dropped_columns: Vec<String>,
    pub waiting_days: bool,
}

/// Normalize, resolve the outcome, derive features and filter columns.
pub fn prepare_training_frame(df: DataFrame) -> Result<PreparedFrame> {
    let df = normalize_columns(df, NormalizeMode::Full)?;
    let target = require_target_column(&df)?;
    let resolved = resolve_outcomes(df, &target)?;
    let derived = derive_features(resolved.frame, &target)?;
    let (frame, dropped_columns) = retain_supported_columns(derived.frame)?;
    let columns = classify_feature_columns(&frame, &target);

    info!(
        target_column = %target,
        rows = frame.height(),
        dropped_rows = resolved.dropped,
        numeric = columns.numeric.len(),
        categorical = columns.categorical.len(),
        "prepared training frame"
    );
    Ok(PreparedFrame {
        frame,
        target,
        columns,
        dropped_rows: resolved.dropped,
        date_columns: derived.date_columns,
        dropped_columns,
        waiting_days: derived.waiting_days,
    })
}

/// Outcome of a training run.
#[derive(Debug, Clone)]
pub struct TrainingRun {
    pub pipeline: TrainedPipeline,
    /// Metrics on the holdout partition.
    pub report: ClassificationReport,
    /// Holdout feature columns with actual outcome, prediction and probability.
    pub diagnostics: DataFrame,
    /// Class counts before balancing.
    pub class_counts: ClassCounts,
    pub balanced_rows: usize,
    pub train_rows: usize,
    pub holdout_rows: usize,
    pub dropped_rows: usize,
    pub dropped_columns: Vec<String>,
    pub elapsed_ms: u128,
}

/// Train a pipeline on a raw appointment table.
///
/// The resolved dataset is balanced, split into training and holdout
/// partitions, and the pipeline is fitted on the training partition only.
/// The holdout report is diagnostic; a poor score does not fail the run.
pub fn train_pipeline(df: DataFrame, options: &TrainingOptions) -> Result<TrainingRun> {
    let span = info_span!("train", rows = df.height(), seed = options.seed);
    let _guard = span.enter();
    let start = Instant::now();

    let prepared = prepare_training_frame(df)?;
    let target = prepared.target.as_str();
    let counts = class_counts(&outcome_values(&prepared.frame, target)?);

    let balanced = balance_classes(&prepared.frame, target, options.seed)?;
    let split = train_test_indices(balanced.height(), options.test_fraction, options.seed)?;
    let train = take_rows(&balanced, &split.train)?;
    let holdout = take_rows(&balanced, &split.test)?;

    let pipeline = TrainedPipeline::fit(&train, target, &prepared.columns, options)?;

    let probabilities = pipeline.predict_proba(&holdout)?;
    let predicted: Vec<u8> = probabilities.iter().map(|p| u8::from(*p > 0.5)).collect();
    let actual = outcome_values(&holdout, target)?;
    let report = ClassificationReport::from_labels(&actual, &predicted)?;

    let mut diagnostics = holdout.select(prepared.columns.iter())?;
    set_i64_column(
        &mut diagnostics,
        ACTUAL_COLUMN,
        actual.iter().map(|v| Some(i64::from(*v))).collect(),
    )?;
    set_i64_column(
        &mut diagnostics,
        PREDICTED_COLUMN,
        predicted.iter().map(|v| Some(i64::from(*v))).collect(),
    )?;
    set_f64_column(
        &mut diagnostics,
        PROBABILITY_COLUMN,
        probabilities.into_iter().map(Some).collect(),
    )?;

    let elapsed_ms = start.elapsed().as_millis();
    info!(
        balanced_rows = balanced.height(),
        train_rows = train.height(),
        holdout_rows = holdout.height(),
        accuracy = report.accuracy,
        elapsed_ms,
        "training complete"
    );

    Ok(TrainingRun {
        pipeline,
        report,
        diagnostics,
        class_counts: counts,
        balanced_rows: balanced.height(),
        train_rows: train.height(),
        holdout_rows: holdout.height(),
        dropped_rows: prepared.dropped_rows,
        dropped_columns: prepared.dropped_columns,
        elapsed_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use noshow_model::NoShowError;
    use noshow_model::columns::WAITING_DAYS_COLUMN;
    use polars::prelude::{Column, IntoColumn, NamedFrom, Series};

    fn raw_frame() -> DataFrame {
        let columns: Vec<Column> = vec![
            Series::new("Gender".into(), vec!["F", "M", "F", "M", "F", "M"]).into_column(),
            Series::new("Age".into(), vec![30i64, 45, 22, 60, 35, 51]).into_column(),
            Series::new(
                "Scheduled Day".into(),
                vec![
                    "2024-01-01",
                    "2024-01-02",
                    "2024-01-03",
                    "2024-01-04",
                    "2024-01-05",
                    "2024-01-06",
                ],
            )
            .into_column(),
            Series::new(
                "Appointment Day".into(),
                vec![
                    "2024-01-02",
                    "2024-01-12",
                    "2024-01-04",
                    "2024-01-20",
                    "2024-01-06",
                    "2024-01-30",
                ],
            )
            .into_column(),
            Series::new("No-show".into(), vec!["No", "Yes", "No", "Yes", "No", "?"]).into_column(),
        ];
        DataFrame::new(columns).unwrap()
    }

    #[test]
    fn prepares_normalized_resolved_frame() {
        let prepared = prepare_training_frame(raw_frame()).unwrap();
        assert_eq!(prepared.target, "no-show");
        assert_eq!(prepared.dropped_rows, 1);
        assert_eq!(prepared.frame.height(), 5);
        assert!(prepared.waiting_days);
        assert_eq!(prepared.dropped_columns, vec!["scheduled_day", "appointment_day"]);
        assert_eq!(prepared.columns.numeric, vec!["age", WAITING_DAYS_COLUMN]);
        assert_eq!(prepared.columns.categorical, vec!["gender"]);
    }

    #[test]
    fn missing_outcome_column_is_schema_error() {
        let df = raw_frame().drop("No-show").unwrap();
        assert!(matches!(
            prepare_training_frame(df),
            Err(NoShowError::Schema { .. })
        ));
    }
}
