//! Preprocessing and model pipeline for appointment no-show prediction.
//!
//! This crate fits, persists and applies the trained pipeline:
//!
//! - **preprocess**: standard scaling and one-hot encoding
//! - **forest**: random-forest classifier
//! - **pipeline**: the preprocessor and classifier bound into one unit
//! - **metrics**: holdout classification report
//! - **artifact**: checksummed artifact save/load
//! - **training**: raw table to fitted pipeline
//! - **inference**: batch scoring with risk tiers
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use noshow_model::TrainingOptions;
//! use noshow_pipeline::{load_pipeline, save_pipeline, score_batch, train_pipeline};
//!
//! let run = train_pipeline(history, &TrainingOptions::default())?;
//! save_pipeline(&run.pipeline, Path::new("no_show_pipeline.nsp"))?;
//!
//! let pipeline = load_pipeline(Path::new("no_show_pipeline.nsp"))?;
//! let scored = score_batch(&pipeline, batch)?;
//! ```

pub mod artifact;
pub mod forest;
pub mod inference;
pub mod metrics;
pub mod pipeline;
pub mod preprocess;
pub mod training;

pub use artifact::{
    ARTIFACT_VERSION, DEFAULT_ARTIFACT_FILE, decode_pipeline, encode_pipeline, load_pipeline,
    save_pipeline,
};
pub use forest::{DecisionTree, RandomForestClassifier};
pub use inference::{ScoredBatch, ScoringFrame, prepare_scoring_frame, score_batch};
pub use metrics::{AveragedMetrics, ClassMetrics, ClassificationReport};
pub use pipeline::TrainedPipeline;
pub use preprocess::{OneHotEncoder, Preprocessor, StandardScaler};
pub use training::{PreparedFrame, TrainingRun, prepare_training_frame, train_pipeline};
