//! Training and inference over synthetic appointment tables.

use chrono::{Days, NaiveDate};
use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use tempfile::tempdir;

use noshow_common::{numeric_column, string_column};
use noshow_model::columns::{
    ACTUAL_COLUMN, PREDICTED_COLUMN, PROBABILITY_COLUMN, RISK_LEVEL_COLUMN,
};
use noshow_model::{NoShowError, RiskTier, TrainingOptions, risk_tier};
use noshow_pipeline::{
    DEFAULT_ARTIFACT_FILE, load_pipeline, save_pipeline, score_batch, train_pipeline,
};

const NEIGHBOURHOODS: [&str; 4] = ["CENTRO", "JARDIM", "MARIA ORTIZ", "PRAIA"];

fn day(offset: u64) -> String {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (start + Days::new(offset)).format("%Y-%m-%d").to_string()
}

/// `rows` appointments; the first `no_shows` rows are no-shows with long waits.
fn appointments(rows: usize, no_shows: usize, outcome: bool) -> DataFrame {
    let mut gender = Vec::new();
    let mut age = Vec::new();
    let mut neighbourhood = Vec::new();
    let mut sms = Vec::new();
    let mut scheduled = Vec::new();
    let mut appointment = Vec::new();
    let mut label = Vec::new();
    for i in 0..rows {
        let missed = i < no_shows;
        let offset = (i % 30) as u64;
        let wait = if missed { 20 + (i % 7) as u64 } else { (i % 5) as u64 };
        gender.push(if i % 3 == 0 { "M" } else { "F" });
        age.push(18 + (i * 7 % 60) as i64);
        neighbourhood.push(NEIGHBOURHOODS[i % NEIGHBOURHOODS.len()]);
        sms.push(i64::from(missed || i % 4 == 0));
        scheduled.push(day(offset));
        appointment.push(day(offset + wait));
        label.push(if missed { "Yes" } else { "No" });
    }

    let mut columns: Vec<Column> = vec![
        Series::new("Gender".into(), gender).into_column(),
        Series::new("Age".into(), age).into_column(),
        Series::new("Neighbourhood".into(), neighbourhood).into_column(),
        Series::new("SMS_received".into(), sms).into_column(),
        Series::new("ScheduledDay".into(), scheduled).into_column(),
        Series::new("AppointmentDay".into(), appointment).into_column(),
    ];
    if outcome {
        columns.push(Series::new("No-show".into(), label).into_column());
    }
    DataFrame::new(columns).unwrap()
}

fn options() -> TrainingOptions {
    TrainingOptions::default().with_trees(25)
}

#[test]
fn trains_on_imbalanced_history_and_scores_new_batch() {
    let run = train_pipeline(appointments(100, 10, true), &options()).unwrap();

    assert_eq!(run.class_counts.attended, 90);
    assert_eq!(run.class_counts.no_show, 10);
    assert_eq!(run.balanced_rows, 180);
    assert_eq!(run.holdout_rows, 36);
    assert_eq!(run.train_rows, 144);
    assert_eq!(run.report.support(), 36);
    assert_eq!(run.diagnostics.height(), 36);
    for column in [ACTUAL_COLUMN, PREDICTED_COLUMN, PROBABILITY_COLUMN] {
        assert!(run.diagnostics.column(column).is_ok(), "missing {column}");
    }
    assert!(run.diagnostics.column("no-show").is_err());

    let batch = appointments(10, 3, false);
    let scored = score_batch(&run.pipeline, batch).unwrap();
    assert_eq!(scored.probabilities.len(), 10);
    assert!(scored.injected_target);
    for (p, tier) in scored.probabilities.iter().zip(&scored.tiers) {
        assert!((0.0..=1.0).contains(p));
        assert_eq!(*tier, risk_tier(*p));
    }
    assert_eq!(scored.tier_counts().values().sum::<usize>(), 10);

    let levels = string_column(&scored.frame, RISK_LEVEL_COLUMN).unwrap();
    let written = numeric_column(&scored.frame, PROBABILITY_COLUMN).unwrap();
    for ((level, p), tier) in levels.iter().zip(&written).zip(&scored.tiers) {
        assert_eq!(level, tier.as_str());
        assert!(p.is_some());
    }
    assert!(scored.frame.column("no_show").is_err());
}

#[test]
fn artifact_round_trip_preserves_probabilities() {
    let run = train_pipeline(appointments(100, 10, true), &options()).unwrap();
    let dir = tempdir().unwrap();
    let path = dir.path().join("models").join(DEFAULT_ARTIFACT_FILE);

    save_pipeline(&run.pipeline, &path).unwrap();
    let loaded = load_pipeline(&path).unwrap();
    assert_eq!(loaded.options(), run.pipeline.options());

    let before = score_batch(&run.pipeline, appointments(10, 3, false)).unwrap();
    let after = score_batch(&loaded, appointments(10, 3, false)).unwrap();
    for (a, b) in before.probabilities.iter().zip(&after.probabilities) {
        assert!((a - b).abs() <= 1e-9);
    }
    assert_eq!(before.tiers, after.tiers);
}

#[test]
fn outcome_column_in_batch_does_not_change_scores() {
    let run = train_pipeline(appointments(100, 10, true), &options()).unwrap();

    let mut labelled = appointments(10, 3, true);
    labelled
        .with_column(Series::new("No-show".into(), vec!["Yes"; 10]))
        .unwrap();
    let with_outcome = score_batch(&run.pipeline, labelled).unwrap();
    let without_outcome = score_batch(&run.pipeline, appointments(10, 3, false)).unwrap();

    assert!(!with_outcome.injected_target);
    assert!(without_outcome.injected_target);
    assert_eq!(with_outcome.probabilities, without_outcome.probabilities);
    assert_eq!(with_outcome.tiers, without_outcome.tiers);
    assert!(with_outcome.frame.column("no-show").is_ok());
}

#[test]
fn unseen_category_does_not_fail_scoring() {
    let run = train_pipeline(appointments(60, 12, true), &options()).unwrap();
    let mut batch = appointments(4, 1, false);
    batch
        .with_column(Series::new(
            "Neighbourhood".into(),
            vec!["ILHA DO BOI", "CENTRO", "NOWHERE", "PRAIA"],
        ))
        .unwrap();

    let scored = score_batch(&run.pipeline, batch).unwrap();
    assert_eq!(scored.probabilities.len(), 4);
    assert!(
        scored
            .tiers
            .iter()
            .all(|tier| RiskTier::ALL.contains(tier))
    );
}

#[test]
fn missing_feature_column_is_a_prediction_error() {
    let run = train_pipeline(appointments(60, 12, true), &options()).unwrap();
    let batch = appointments(4, 1, false).drop("Age").unwrap();

    let err = score_batch(&run.pipeline, batch).unwrap_err();
    match err {
        NoShowError::Prediction { source, .. } => {
            assert!(matches!(*source, NoShowError::MissingColumn { ref column } if column == "age"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn single_outcome_history_is_rejected() {
    let err = train_pipeline(appointments(20, 0, true), &options()).unwrap_err();
    assert!(matches!(err, NoShowError::InsufficientData { .. }));
}
