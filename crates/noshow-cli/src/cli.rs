//! CLI argument definitions for the no-show predictor.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use noshow_model::options::{DEFAULT_SEED, DEFAULT_TEST_FRACTION, DEFAULT_TREES};
use noshow_pipeline::DEFAULT_ARTIFACT_FILE;

use noshow_cli::types::{DEFAULT_DIAGNOSTICS_FILE, DEFAULT_PREDICTIONS_FILE};

#[derive(Parser)]
#[command(
    name = "noshow",
    version,
    about = "Appointment no-show prediction - train a model and score new appointments",
    long_about = "Predict whether scheduled appointments will be missed.\n\n\
                  `train` fits a random-forest pipeline on historical appointments\n\
                  with a no-show outcome column; `predict` scores a new batch and\n\
                  assigns each appointment a Low, Medium or High risk tier."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Train the pipeline on historical appointments.
    Train(TrainArgs),

    /// Score new appointments with a trained pipeline.
    Predict(PredictArgs),
}

#[derive(Parser)]
pub struct TrainArgs {
    /// Historical appointments CSV with a no-show outcome column.
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Where to write the trained pipeline.
    #[arg(long = "model", value_name = "PATH", default_value = DEFAULT_ARTIFACT_FILE)]
    pub model: PathBuf,

    /// Where to write holdout predictions.
    #[arg(long = "predictions", value_name = "PATH", default_value = DEFAULT_DIAGNOSTICS_FILE)]
    pub predictions: PathBuf,

    /// Seed for balancing, the holdout split and the forest.
    #[arg(long = "seed", default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Number of trees in the forest.
    #[arg(long = "trees", default_value_t = DEFAULT_TREES)]
    pub trees: usize,

    /// Maximum tree depth (unlimited when omitted).
    #[arg(long = "max-depth", value_name = "DEPTH")]
    pub max_depth: Option<usize>,

    /// Fraction of the balanced set held out for evaluation.
    #[arg(long = "test-fraction", default_value_t = DEFAULT_TEST_FRACTION)]
    pub test_fraction: f64,
}

#[derive(Parser)]
pub struct PredictArgs {
    /// Appointments CSV to score.
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Trained pipeline to load.
    #[arg(long = "model", value_name = "PATH", default_value = DEFAULT_ARTIFACT_FILE)]
    pub model: PathBuf,

    /// Where to write the scored appointments.
    #[arg(long = "output", value_name = "PATH", default_value = DEFAULT_PREDICTIONS_FILE)]
    pub output: PathBuf,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn train_defaults() {
        let cli = Cli::try_parse_from(["noshow", "train", "appointments.csv"]).unwrap();
        let Command::Train(args) = cli.command else {
            panic!("expected train");
        };
        assert_eq!(args.model, PathBuf::from("no_show_pipeline.nsp"));
        assert_eq!(args.predictions, PathBuf::from("no_show_predictions.csv"));
        assert_eq!(args.seed, 42);
        assert_eq!(args.trees, 150);
        assert_eq!(args.max_depth, None);
    }

    #[test]
    fn predict_overrides() {
        let cli = Cli::try_parse_from([
            "noshow",
            "predict",
            "batch.csv",
            "--model",
            "models/p.nsp",
            "--output",
            "out/scored.csv",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert!(matches!(cli.log_format, LogFormatArg::Json));
        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(args.model, PathBuf::from("models/p.nsp"));
        assert_eq!(args.output, PathBuf::from("out/scored.csv"));
    }
}
