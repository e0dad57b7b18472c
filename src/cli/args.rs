// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use clap::{Args, Parser, Subcommand};

use crate::config::ModelPaths;

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Examples:
    exercise-form analyze --source frames.jsonl
    exercise-form analyze --source - --mode squat --output reports.jsonl
    exercise-form analyze -s frames.jsonl --models-dir /srv/models --knee-angle-min 160
    exercise-form calibrate --data squat_model/data/train.csv
    exercise-form inspect --meta plank_model/model/meta.json --exercise plank"#)]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a recorded landmark stream frame by frame
    Analyze(AnalyzeArgs),
    /// Derive squat form thresholds from a reference dataset
    Calibrate(CalibrateArgs),
    /// Show how a classifier's feature schema is decoded
    Inspect(InspectArgs),
}

/// Arguments for the analyze command.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Landmark stream in JSON Lines format (`-` for stdin)
    #[arg(short, long)]
    pub source: String,

    /// Exercise mode at start (plank or squat)
    #[arg(long, default_value = "plank")]
    pub mode: String,

    /// Directory containing the plank_model/ and squat_model/ artifacts
    #[arg(long, default_value = ".")]
    pub models_dir: String,

    /// Override the plank classifier path
    #[arg(long)]
    pub plank_model: Option<String>,

    /// Override the plank metadata path
    #[arg(long)]
    pub plank_meta: Option<String>,

    /// Override the squat stage classifier path
    #[arg(long)]
    pub squat_model: Option<String>,

    /// Override the squat metadata path
    #[arg(long)]
    pub squat_meta: Option<String>,

    /// Override the squat thresholds path
    #[arg(long)]
    pub thresholds: Option<String>,

    /// Write frame reports here instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    /// Lower-body visibility floor
    #[arg(long, default_value_t = 0.6)]
    pub min_visibility: f32,

    /// Minimum knee angle in degrees for the standing check
    #[arg(long, default_value_t = 155.0)]
    pub knee_angle_min: f64,

    /// Number of ONNX Runtime intra-op threads (0 = auto)
    #[arg(long, default_value_t = 0)]
    pub threads: usize,

    /// Show verbose output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}

impl AnalyzeArgs {
    /// Artifact paths: the standard layout under `models_dir`, with overrides.
    #[must_use]
    pub fn model_paths(&self) -> ModelPaths {
        let mut paths = ModelPaths::from_root(&self.models_dir);
        let overrides = [
            (&self.plank_model, &mut paths.plank_model),
            (&self.plank_meta, &mut paths.plank_meta),
            (&self.squat_model, &mut paths.squat_model),
            (&self.squat_meta, &mut paths.squat_meta),
            (&self.thresholds, &mut paths.squat_thresholds),
        ];
        for (value, slot) in overrides {
            if let Some(value) = value {
                *slot = value.into();
            }
        }
        paths
    }
}

/// Arguments for the calibrate command.
#[derive(Args, Debug)]
pub struct CalibrateArgs {
    /// Squat reference dataset (CSV with a header row)
    #[arg(short, long)]
    pub data: String,

    /// Where to write the thresholds
    #[arg(short, long, default_value = ModelPaths::SQUAT_THRESHOLDS)]
    pub output: String,

    /// Show verbose output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}

/// Arguments for the inspect command.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Classifier metadata file (meta.json)
    #[arg(short, long)]
    pub meta: String,

    /// Exercise the classifier recognizes (plank or squat)
    #[arg(short, long)]
    pub exercise: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_analyze_args_defaults() {
        let args = Cli::parse_from(["app", "analyze", "--source", "frames.jsonl"]);
        match args.command {
            Commands::Analyze(analyze_args) => {
                assert_eq!(analyze_args.source, "frames.jsonl");
                assert_eq!(analyze_args.mode, "plank");
                assert!((analyze_args.min_visibility - 0.6).abs() < f32::EPSILON);
                assert!((analyze_args.knee_angle_min - 155.0).abs() < f64::EPSILON);
                assert!(analyze_args.verbose);
                assert!(analyze_args.output.is_none());
                assert_eq!(analyze_args.model_paths(), ModelPaths::from_root("."));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_analyze_args_overrides() {
        let args = Cli::parse_from([
            "app",
            "analyze",
            "-s",
            "-",
            "--mode",
            "squat",
            "--models-dir",
            "/srv/models",
            "--thresholds",
            "custom.json",
            "--verbose",
            "false",
        ]);
        match args.command {
            Commands::Analyze(analyze_args) => {
                assert_eq!(analyze_args.source, "-");
                assert_eq!(analyze_args.mode, "squat");
                assert!(!analyze_args.verbose);
                let paths = analyze_args.model_paths();
                assert_eq!(paths.squat_thresholds, PathBuf::from("custom.json"));
                assert_eq!(
                    paths.squat_model,
                    PathBuf::from("/srv/models/squat_model/model/squat_stage_mlp.onnx")
                );
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_calibrate_args_defaults() {
        let args = Cli::parse_from(["app", "calibrate", "--data", "train.csv"]);
        match args.command {
            Commands::Calibrate(calibrate_args) => {
                assert_eq!(calibrate_args.data, "train.csv");
                assert_eq!(calibrate_args.output, ModelPaths::SQUAT_THRESHOLDS);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_inspect_requires_meta() {
        assert!(Cli::try_parse_from(["app", "inspect", "--exercise", "plank"]).is_err());
    }
}
