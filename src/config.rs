// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Session configuration and artifact locations.
//!
//! [`SessionConfig`] holds the tunable constants of the per-frame pipeline;
//! [`ModelPaths`] locates the classifier and calibration artifacts on disk.

use std::path::{Path, PathBuf};

use crate::rep_counter::StageVocabulary;

/// Configuration for an exercise session.
///
/// # Example
///
/// ```rust
/// use exercise_form::SessionConfig;
///
/// let config = SessionConfig::new()
///     .with_min_visibility(0.7)
///     .with_knee_angle_min(160.0)
///     .with_threads(2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Visibility floor for hips, knees and ankles (0.0 to 1.0).
    /// Squat frames below it drop the current rep back to `none` and keep
    /// the count.
    pub min_visibility: f32,
    /// Minimum knee angle in degrees for the standing check.
    pub knee_angle_min: f64,
    /// Stage labels that mean "bottom of the squat" (substring match).
    pub down_labels: Vec<String>,
    /// Stage labels that mean "standing up" (substring match).
    pub up_labels: Vec<String>,
    /// Plank label that counts as correct form.
    pub plank_correct_label: String,
    /// Number of intra-op threads for ONNX Runtime.
    /// Setting this to `0` allows ONNX Runtime to choose.
    pub num_threads: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            min_visibility: 0.6,
            knee_angle_min: 155.0,
            down_labels: vec!["down".to_string(), "bottom".to_string()],
            up_labels: vec!["up".to_string(), "stand".to_string(), "top".to_string()],
            plank_correct_label: "C".to_string(),
            num_threads: 0,
        }
    }
}

impl SessionConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the lower-body visibility floor.
    #[must_use]
    pub const fn with_min_visibility(mut self, min_visibility: f32) -> Self {
        self.min_visibility = min_visibility;
        self
    }

    /// Set the minimum knee angle (degrees) for the standing check.
    #[must_use]
    pub const fn with_knee_angle_min(mut self, degrees: f64) -> Self {
        self.knee_angle_min = degrees;
        self
    }

    /// Replace the down and up stage vocabularies.
    #[must_use]
    pub fn with_stage_labels<S: Into<String>>(
        mut self,
        down: impl IntoIterator<Item = S>,
        up: impl IntoIterator<Item = S>,
    ) -> Self {
        self.down_labels = down.into_iter().map(Into::into).collect();
        self.up_labels = up.into_iter().map(Into::into).collect();
        self
    }

    /// Set the plank label that counts as correct form.
    #[must_use]
    pub fn with_plank_correct_label(mut self, label: impl Into<String>) -> Self {
        self.plank_correct_label = label.into();
        self
    }

    /// Set the number of threads for inference.
    ///
    /// # Arguments
    ///
    /// * `threads` - The number of intra-op threads. Set to `0` for auto-configuration.
    #[must_use]
    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }

    /// Stage vocabulary with labels lower-cased for matching.
    #[must_use]
    pub fn stage_vocabulary(&self) -> StageVocabulary {
        StageVocabulary::new(&self.down_labels, &self.up_labels)
    }
}

/// On-disk locations of the classifier and calibration artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPaths {
    pub plank_model: PathBuf,
    pub plank_meta: PathBuf,
    pub squat_model: PathBuf,
    pub squat_meta: PathBuf,
    pub squat_thresholds: PathBuf,
}

impl ModelPaths {
    pub const PLANK_MODEL: &'static str = "plank_model/model/plank_mlp.onnx";
    pub const PLANK_META: &'static str = "plank_model/model/meta.json";
    pub const SQUAT_MODEL: &'static str = "squat_model/model/squat_stage_mlp.onnx";
    pub const SQUAT_META: &'static str = "squat_model/model/meta.json";
    pub const SQUAT_THRESHOLDS: &'static str = "squat_model/model/squat_thresholds.json";

    /// Standard artifact layout below `root`.
    #[must_use]
    pub fn from_root<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref();
        Self {
            plank_model: root.join(Self::PLANK_MODEL),
            plank_meta: root.join(Self::PLANK_META),
            squat_model: root.join(Self::SQUAT_MODEL),
            squat_meta: root.join(Self::SQUAT_META),
            squat_thresholds: root.join(Self::SQUAT_THRESHOLDS),
        }
    }
}

impl Default for ModelPaths {
    fn default() -> Self {
        Self::from_root(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = SessionConfig::default();
        assert!((config.min_visibility - 0.6).abs() < f32::EPSILON);
        assert!((config.knee_angle_min - 155.0).abs() < f64::EPSILON);
        assert_eq!(config.down_labels, ["down", "bottom"]);
        assert_eq!(config.up_labels, ["up", "stand", "top"]);
        assert_eq!(config.plank_correct_label, "C");
        assert_eq!(config.num_threads, 0);
    }

    #[test]
    fn test_config_builder() {
        let config = SessionConfig::new()
            .with_min_visibility(0.5)
            .with_knee_angle_min(160.0)
            .with_stage_labels(["Low"], ["High", "Rise"])
            .with_plank_correct_label("correct")
            .with_threads(4);

        assert!((config.min_visibility - 0.5).abs() < f32::EPSILON);
        assert!((config.knee_angle_min - 160.0).abs() < f64::EPSILON);
        assert_eq!(config.plank_correct_label, "correct");
        assert_eq!(config.num_threads, 4);

        let vocabulary = config.stage_vocabulary();
        assert_eq!(vocabulary.down_labels(), ["low"]);
        assert_eq!(vocabulary.up_labels(), ["high", "rise"]);
    }

    #[test]
    fn test_model_paths_layout() {
        let paths = ModelPaths::from_root("/srv/models");
        assert_eq!(paths.plank_model, PathBuf::from("/srv/models/plank_model/model/plank_mlp.onnx"));
        assert_eq!(
            paths.squat_thresholds,
            PathBuf::from("/srv/models/squat_model/model/squat_thresholds.json")
        );
    }
}
