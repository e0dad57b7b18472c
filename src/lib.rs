// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![allow(clippy::multiple_crate_versions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Exercise Form Library
//!
//! Real-time exercise form feedback from body landmarks. Given the tracked
//! joints of one person per video frame, the library classifies plank form,
//! tracks the squat stage, judges squat feet and knee spacing against
//! calibrated bands, and counts squat repetitions that were performed with
//! correct form.
//!
//! Pose estimation itself is external: frames arrive as landmark sets in the
//! MediaPipe 33-point order (normalized image coordinates plus visibility).
//!
//! ## Quick Start (Library)
//!
//! ```no_run
//! use exercise_form::{Exercise, ExerciseSession, LandmarkSource, ModelPaths, SessionConfig, Source};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = ExerciseSession::load(&ModelPaths::from_root("."), SessionConfig::default())?;
//!     session.set_mode(Exercise::Squat);
//!
//!     for frame in LandmarkSource::open(&Source::from("frames.jsonl"))? {
//!         let report = session.process(frame?.landmarks.as_ref())?;
//!         println!("{}", report.summary());
//!     }
//!     println!("{} reps", session.rep_count());
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Replay a recorded landmark stream; one JSON report per frame on stdout
//! exercise-form analyze --source frames.jsonl --mode squat
//!
//! # Read landmarks from another process
//! pose-tracker --jsonl | exercise-form analyze --source - --output reports.jsonl
//!
//! # Rebuild squat thresholds from the reference dataset
//! exercise-form calibrate --data squat_model/data/train.csv
//!
//! # Check how a classifier's feature schema is decoded
//! exercise-form inspect --meta plank_model/model/meta.json --exercise plank
//! ```
//!
//! ## Artifacts
//!
//! | Path | Content |
//! |------|---------|
//! | `plank_model/model/plank_mlp.onnx` | plank form classifier |
//! | `plank_model/model/meta.json` | plank feature columns and labels |
//! | `squat_model/model/squat_stage_mlp.onnx` | squat stage classifier |
//! | `squat_model/model/meta.json` | squat feature columns and labels |
//! | `squat_model/model/squat_thresholds.json` | calibrated feet/knee bands |
//!
//! ## Hardware Acceleration
//!
//! ```bash
//! # Apple CoreML
//! cargo build --release --features coreml
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`landmarks`] | Joint vocabulary and [`LandmarkSet`] |
//! | [`features`] | Feature builders driven by the classifier schema |
//! | [`classifier`] | [`PoseClassifier`] and the ONNX Runtime model |
//! | [`form`] | Squat spacing verdicts and posture checks |
//! | [`rep_counter`] | Squat repetition state machine |
//! | [`calibration`] | Offline threshold calibration |
//! | [`session`] | [`ExerciseSession`] per-frame pipeline |
//! | [`source`] | JSON Lines landmark replay |

pub mod calibration;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod exercise;
pub mod features;
pub mod form;
pub mod landmarks;
pub mod metadata;
pub mod rep_counter;
pub mod results;
pub mod session;
pub mod source;
pub mod thresholds;
pub mod utils;

pub use calibration::{CalibrationReport, ReferenceRow, calibrate};
pub use classifier::{OnnxModel, PoseClassifier, ProbabilityModel};
pub use config::{ModelPaths, SessionConfig};
pub use error::{FormError, Result};
pub use exercise::Exercise;
pub use features::{BuildFeatures, FeatureBuilder, FeatureVector};
pub use form::{FormAssessment, FormStatus, FormVerdict};
pub use landmarks::{Joint, Landmark, LandmarkSet};
pub use metadata::ModelMetadata;
pub use rep_counter::{RepCounterState, RepInputs, RepState, StageVocabulary};
pub use results::{FrameReport, Prediction, Probs, Speed};
pub use session::ExerciseSession;
pub use source::{LandmarkSource, Source, SourceFrame};
pub use thresholds::CalibratedThresholds;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "exercise-form");
    }
}
