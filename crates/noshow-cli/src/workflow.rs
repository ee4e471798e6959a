//! File-level train and predict workflows.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use noshow_ingest::{read_csv_frame, write_csv_frame};
use noshow_model::{NoShowError, TrainingOptions};
use noshow_pipeline::{load_pipeline, save_pipeline, score_batch, train_pipeline};

use crate::types::{PredictResult, TrainResult};

/// Train on `input`, then write the artifact and the holdout diagnostics.
pub fn run_train(
    input: &Path,
    model_path: &Path,
    diagnostics_path: &Path,
    options: &TrainingOptions,
) -> Result<TrainResult> {
    let raw = read_csv_frame(input)
        .with_context(|| format!("read training data {}", input.display()))?;
    info!(rows = raw.height(), columns = raw.width(), "loaded training data");

    let mut run = train_pipeline(raw, options).context("train pipeline")?;
    save_pipeline(&run.pipeline, model_path)
        .with_context(|| format!("save pipeline to {}", model_path.display()))?;
    write_csv_frame(&mut run.diagnostics, diagnostics_path)
        .with_context(|| format!("write diagnostics to {}", diagnostics_path.display()))?;

    Ok(TrainResult {
        input: input.to_path_buf(),
        model_path: model_path.to_path_buf(),
        diagnostics_path: diagnostics_path.to_path_buf(),
        run,
    })
}

/// Score `input` with the artifact at `model_path` and write the annotated table.
///
/// The artifact is loaded before the batch is read, so a missing model is
/// reported even when the batch is also unreadable.
pub fn run_predict(input: &Path, model_path: &Path, output_path: &Path) -> Result<PredictResult> {
    let pipeline = load_pipeline(model_path)
        .with_context(|| format!("load trained pipeline from {}", model_path.display()))?;
    let raw = read_csv_frame(input)
        .with_context(|| format!("read appointments {}", input.display()))?;
    info!(rows = raw.height(), "loaded appointments");

    let mut batch = score_batch(&pipeline, raw).context("score appointments")?;
    write_csv_frame(&mut batch.frame, output_path)
        .with_context(|| format!("write predictions to {}", output_path.display()))?;

    Ok(PredictResult {
        input: input.to_path_buf(),
        model_path: model_path.to_path_buf(),
        output_path: output_path.to_path_buf(),
        batch,
    })
}

/// Render an error chain for the terminal, with an operator hint when one exists.
pub fn error_message(error: &anyhow::Error) -> String {
    let mut message = format!("error: {error:#}");
    if let Some(hint) = error
        .downcast_ref::<NoShowError>()
        .and_then(NoShowError::suggestion)
    {
        message.push_str("\nhint: ");
        message.push_str(&hint);
    }
    message
}
