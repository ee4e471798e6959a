use anyhow::Result;

use noshow_cli::types::{PredictResult, TrainResult};
use noshow_cli::workflow::{run_predict, run_train};
use noshow_model::TrainingOptions;

use crate::cli::{PredictArgs, TrainArgs};

pub fn train(args: &TrainArgs) -> Result<TrainResult> {
    let mut options = TrainingOptions::new()
        .with_seed(args.seed)
        .with_trees(args.trees)
        .with_max_depth(args.max_depth);
    options.test_fraction = args.test_fraction;
    run_train(&args.input, &args.model, &args.predictions, &options)
}

pub fn predict(args: &PredictArgs) -> Result<PredictResult> {
    run_predict(&args.input, &args.model, &args.output)
}
