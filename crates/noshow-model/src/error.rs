//! Error types for the no-show pipeline.
//!
//! Every fatal condition in training or inference maps to one variant here.
//! Malformed individual values (unparsable dates, unknown categories) are
//! recovered locally and never reach this type.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Pipeline error.
#[derive(Debug, Error)]
pub enum NoShowError {
    // === Input Errors ===
    /// Input table not found.
    #[error("input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Polars could not parse or write a CSV file.
    #[error("failed to process CSV {path}: {message}")]
    Csv { path: PathBuf, message: String },

    // === Schema Errors ===
    /// No column name matched any of the outcome patterns.
    #[error("could not find a no-show column (expected a name containing one of {patterns:?}; found {available:?})")]
    Schema {
        patterns: Vec<String>,
        available: Vec<String>,
    },

    /// Two source columns normalize to the same key.
    #[error("columns '{first}' and '{second}' both normalize to '{normalized}'")]
    DuplicateColumn {
        first: String,
        second: String,
        normalized: String,
    },

    /// A feature column recorded at training time is absent from the input.
    #[error("feature column '{column}' is missing from the input")]
    MissingColumn { column: String },

    /// A numeric feature column has no numeric values to fit on.
    #[error("numeric column '{column}' contains no numeric values")]
    NonNumericColumn { column: String },

    // === Data Volume Errors ===
    /// Not enough usable rows or classes to continue.
    #[error("insufficient data: {reason}")]
    InsufficientData { reason: String },

    // === Model Errors ===
    /// A feature matrix does not have the width the model was fitted on.
    #[error("feature matrix has {found} columns but the model expects {expected}")]
    FeatureMismatch { expected: usize, found: usize },

    /// A transformer or classifier was used before fitting.
    #[error("{component} has not been fitted")]
    NotFitted { component: &'static str },

    /// Prediction failed on an otherwise readable batch.
    #[error("prediction failed: {context}")]
    Prediction {
        context: String,
        #[source]
        source: Box<NoShowError>,
    },

    // === Artifact Errors ===
    /// No trained pipeline exists at the expected location.
    #[error("no trained pipeline found at {path}")]
    ArtifactNotFound { path: PathBuf },

    /// The artifact exists but is not a readable pipeline.
    #[error("invalid pipeline artifact {path}: {reason}")]
    InvalidArtifact { path: PathBuf, reason: String },

    /// The artifact was written by a newer format version.
    #[error("pipeline artifact version {found} is not supported (maximum: {max_supported})")]
    UnsupportedArtifactVersion { found: u32, max_supported: u32 },

    // === I/O and Library Errors ===
    /// File I/O error.
    #[error("failed to {operation} {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Polars operation failed.
    #[error("dataframe operation failed: {0}")]
    Frame(#[from] PolarsError),

    /// JSON (de)serialization failed.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl NoShowError {
    /// Shorthand for [`NoShowError::InsufficientData`].
    pub fn insufficient(reason: impl Into<String>) -> Self {
        Self::InsufficientData {
            reason: reason.into(),
        }
    }

    /// Wrap an error raised while scoring a batch.
    pub fn prediction(context: impl Into<String>, source: NoShowError) -> Self {
        Self::Prediction {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Operator hint for resolving this error, if there is one.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Schema { .. } => Some(
                "Rename the outcome column so it contains 'no_show', 'no-show' or 'noshow'."
                    .into(),
            ),
            Self::ArtifactNotFound { .. } => {
                Some("Run `noshow train <CSV>` first to create the pipeline.".into())
            }
            Self::InvalidArtifact { .. } | Self::UnsupportedArtifactVersion { .. } => {
                Some("Retrain the pipeline with this version of noshow.".into())
            }
            Self::MissingColumn { column } => Some(format!(
                "The batch must contain every feature column used in training, including '{column}'."
            )),
            Self::Prediction { source, .. } => source.suggestion(),
            _ => None,
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, NoShowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_not_found_names_path() {
        let error = NoShowError::ArtifactNotFound {
            path: PathBuf::from("models/no_show_pipeline.nsp"),
        };
        insta::assert_snapshot!(
            error.to_string(),
            @"no trained pipeline found at models/no_show_pipeline.nsp"
        );
        assert!(error.suggestion().unwrap().contains("noshow train"));
    }

    #[test]
    fn prediction_error_keeps_source_suggestion() {
        let error = NoShowError::prediction(
            "score batch",
            NoShowError::MissingColumn {
                column: "age".to_string(),
            },
        );
        assert_eq!(error.to_string(), "prediction failed: score batch");
        assert!(error.suggestion().unwrap().contains("'age'"));
    }

    #[test]
    fn insufficient_shorthand() {
        let error = NoShowError::insufficient("no rows");
        assert_eq!(error.to_string(), "insufficient data: no rows");
        assert!(error.suggestion().is_none());
    }
}
