//! The trained pipeline: preprocessor and classifier bound together.

use chrono::Utc;
use ndarray::ArrayView1;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use noshow_model::{FeatureColumns, NoShowError, Result, TrainingOptions};
use noshow_transform::{class_counts, outcome_values};

use crate::forest::RandomForestClassifier;
use crate::preprocess::Preprocessor;

/// Fitted transformer and classifier, persisted and loaded as one unit.
///
/// Immutable once fitted; prediction takes `&self` so one loaded pipeline
/// can score any number of batches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedPipeline {
    target: String,
    preprocessor: Preprocessor,
    forest: RandomForestClassifier,
    options: TrainingOptions,
    trained_at: String,
    training_rows: usize,
}

impl TrainedPipeline {
    /// Fit the preprocessor and forest on `df`.
    ///
    /// `target` must hold `{0, 1}` outcomes with both values present; it is
    /// never used as a feature.
    pub fn fit(
        df: &DataFrame,
        target: &str,
        columns: &FeatureColumns,
        options: &TrainingOptions,
    ) -> Result<Self> {
        if columns.is_empty() {
            return Err(NoShowError::insufficient(
                "no numeric, categorical or boolean feature columns to train on",
            ));
        }
        if columns.contains(target) {
            return Err(NoShowError::insufficient(format!(
                "outcome column '{target}' cannot also be a feature"
            )));
        }
        let labels = outcome_values(df, target)?;
        let counts = class_counts(&labels);
        if counts.attended == 0 || counts.no_show == 0 {
            return Err(NoShowError::insufficient(format!(
                "training partition has a single outcome class ({} attended, {} no-show)",
                counts.attended, counts.no_show
            )));
        }

        let preprocessor = Preprocessor::fit(df, columns)?;
        debug!(features = ?preprocessor.feature_names(), "feature layout");
        let matrix = preprocessor.transform(df)?;
        let forest = RandomForestClassifier::fit(
            matrix.view(),
            ArrayView1::from(labels.as_slice()),
            &options.forest,
        )?;
        info!(
            rows = df.height(),
            features = preprocessor.n_features(),
            trees = forest.trees().len(),
            "fitted pipeline"
        );

        Ok(Self {
            target: target.to_string(),
            preprocessor,
            forest,
            options: options.clone(),
            trained_at: Utc::now().to_rfc3339(),
            training_rows: df.height(),
        })
    }

    /// No-show probability for every row of `df`.
    pub fn predict_proba(&self, df: &DataFrame) -> Result<Vec<f64>> {
        let matrix = self.preprocessor.transform(df)?;
        self.forest.predict_proba(matrix.view())
    }

    /// Predicted outcome (`0`/`1`) for every row of `df`.
    pub fn predict(&self, df: &DataFrame) -> Result<Vec<u8>> {
        let matrix = self.preprocessor.transform(df)?;
        self.forest.predict(matrix.view())
    }

    /// Outcome column name seen during training.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn columns(&self) -> FeatureColumns {
        self.preprocessor.columns()
    }

    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    pub fn forest(&self) -> &RandomForestClassifier {
        &self.forest
    }

    pub fn options(&self) -> &TrainingOptions {
        &self.options
    }

    /// RFC 3339 timestamp of the fit.
    pub fn trained_at(&self) -> &str {
        &self.trained_at
    }

    pub fn training_rows(&self) -> usize {
        self.training_rows
    }
}
