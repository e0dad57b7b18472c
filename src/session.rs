// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Per-frame exercise pipeline.
//!
//! An [`ExerciseSession`] owns both classifiers, the squat thresholds and the
//! rep counter. Each call to [`ExerciseSession::process`] handles one frame
//! synchronously; mode switches and resets take effect at frame boundaries.

use std::time::Instant;

use crate::classifier::{OnnxModel, PoseClassifier, ProbabilityModel};
use crate::config::{ModelPaths, SessionConfig};
use crate::error::{FormError, Result};
use crate::exercise::Exercise;
use crate::form::{self, FormAssessment, FormStatus};
use crate::landmarks::LandmarkSet;
use crate::rep_counter::{RepCounterState, RepInputs, StageVocabulary};
use crate::results::{FrameReport, Prediction};
use crate::thresholds::CalibratedThresholds;

/// Live session state for one user.
#[derive(Debug)]
pub struct ExerciseSession<M = OnnxModel> {
    plank: PoseClassifier<M>,
    squat: PoseClassifier<M>,
    thresholds: Option<CalibratedThresholds>,
    config: SessionConfig,
    vocabulary: StageVocabulary,
    mode: Exercise,
    reps: RepCounterState,
    frame: usize,
}

impl ExerciseSession<OnnxModel> {
    /// Load both classifiers and the squat thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::ResourceNotFound`] if any artifact is missing,
    /// including the thresholds file. A thresholds file with unusable content
    /// is accepted and leaves squat form verdicts `unknown`.
    pub fn load(paths: &ModelPaths, config: SessionConfig) -> Result<Self> {
        let plank = PoseClassifier::load(
            Exercise::Plank,
            &paths.plank_model,
            &paths.plank_meta,
            config.num_threads,
        )?;
        let squat = PoseClassifier::load(
            Exercise::Squat,
            &paths.squat_model,
            &paths.squat_meta,
            config.num_threads,
        )?;
        let thresholds = CalibratedThresholds::load(&paths.squat_thresholds)?;
        Self::new(plank, squat, thresholds, config)
    }
}

impl<M: ProbabilityModel> ExerciseSession<M> {
    /// Assemble a session from loaded parts. The session starts in plank mode.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::ConfigError`] if a classifier is passed in the
    /// wrong slot.
    pub fn new(
        plank: PoseClassifier<M>,
        squat: PoseClassifier<M>,
        thresholds: Option<CalibratedThresholds>,
        config: SessionConfig,
    ) -> Result<Self> {
        for (classifier, expected) in [(&plank, Exercise::Plank), (&squat, Exercise::Squat)] {
            if classifier.exercise() != expected {
                return Err(FormError::ConfigError(format!(
                    "expected a {expected} classifier, got {}",
                    classifier.exercise()
                )));
            }
        }

        let vocabulary = config.stage_vocabulary();
        Ok(Self {
            plank,
            squat,
            thresholds,
            config,
            vocabulary,
            mode: Exercise::default(),
            reps: RepCounterState::new(),
            frame: 0,
        })
    }

    /// Process one frame's landmarks (`None` when no pose was detected).
    ///
    /// # Errors
    ///
    /// Returns an error only if the active classifier fails.
    pub fn process(&mut self, landmarks: Option<&LandmarkSet>) -> Result<FrameReport> {
        let report = match self.mode {
            Exercise::Plank => self.process_plank(landmarks)?,
            Exercise::Squat => self.process_squat(landmarks)?,
        };
        self.frame += 1;
        Ok(report)
    }

    fn process_plank(&mut self, landmarks: Option<&LandmarkSet>) -> Result<FrameReport> {
        let prediction = self.plank.predict(landmarks)?;

        let start_postprocess = Instant::now();
        let form = prediction.label.as_deref().map_or(FormStatus::Undetermined, |label| {
            if label.trim().to_uppercase() == self.config.plank_correct_label.trim().to_uppercase() {
                FormStatus::Correct
            } else {
                FormStatus::Incorrect
            }
        });
        let postprocess_time = start_postprocess.elapsed().as_secs_f64() * 1000.0;

        Ok(self.report(prediction, form, postprocess_time))
    }

    fn process_squat(&mut self, landmarks: Option<&LandmarkSet>) -> Result<FrameReport> {
        let prediction = self.squat.predict(landmarks)?;

        let start_postprocess = Instant::now();
        let lower_body_visible = form::lower_body_visible(landmarks, self.config.min_visibility);
        let standing = form::is_standing(landmarks, self.config.knee_angle_min);
        let assessment = landmarks.map_or_else(FormAssessment::unknown, |landmarks| {
            form::analyze(landmarks, self.thresholds.as_ref())
        });

        self.reps = self.reps.update(
            &RepInputs {
                label: prediction.label.as_deref(),
                lower_body_visible,
                standing_now: standing,
                form_correct: assessment.is_correct(),
            },
            &self.vocabulary,
        );
        let postprocess_time = start_postprocess.elapsed().as_secs_f64() * 1000.0;

        let mut report = self.report(prediction, assessment.status(), postprocess_time);
        report.feet = Some(assessment.feet);
        report.knee = Some(assessment.knee);
        report.lower_body_visible = Some(lower_body_visible);
        report.standing = Some(standing);
        report.rep_state = Some(self.reps.state);
        report.rep_count = Some(self.reps.count);
        Ok(report)
    }

    fn report(&self, prediction: Prediction, form: FormStatus, postprocess_time: f64) -> FrameReport {
        let mut speed = prediction.speed;
        speed.postprocess = Some(postprocess_time);

        FrameReport {
            frame: self.frame,
            mode: self.mode,
            label: prediction.label,
            probability: prediction.probability,
            form,
            feet: None,
            knee: None,
            lower_body_visible: None,
            standing: None,
            rep_state: None,
            rep_count: None,
            speed,
        }
    }

    /// Switch exercise mode. The rep counter is kept.
    pub fn set_mode(&mut self, mode: Exercise) {
        if mode != self.mode {
            crate::verbose!("Switched to {mode} mode");
        }
        self.mode = mode;
    }

    /// Reset the rep counter to its initial state.
    pub fn reset(&mut self) {
        self.reps = RepCounterState::new();
    }

    /// Active exercise mode.
    #[must_use]
    pub const fn mode(&self) -> Exercise {
        self.mode
    }

    /// Repetitions credited so far.
    #[must_use]
    pub const fn rep_count(&self) -> u32 {
        self.reps.count
    }

    /// Current rep counter state.
    #[must_use]
    pub const fn rep_state(&self) -> RepCounterState {
        self.reps
    }

    /// Number of frames processed.
    #[must_use]
    pub const fn frames_processed(&self) -> usize {
        self.frame
    }

    /// Classifier for `exercise`.
    #[must_use]
    pub const fn classifier(&self, exercise: Exercise) -> &PoseClassifier<M> {
        match exercise {
            Exercise::Plank => &self.plank,
            Exercise::Squat => &self.squat,
        }
    }

    /// Squat thresholds in use, if any.
    #[must_use]
    pub const fn thresholds(&self) -> Option<&CalibratedThresholds> {
        self.thresholds.as_ref()
    }

    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }
}
