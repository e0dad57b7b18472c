// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Per-frame output types.
//!
//! A [`FrameReport`] is the plain record handed to whatever presents feedback
//! (overlay, log, network). It serializes to one JSON object per frame.

use ndarray::Array1;
use serde::Serialize;

use crate::exercise::Exercise;
use crate::form::{FormStatus, FormVerdict};
use crate::rep_counter::RepState;

/// Timing information for one frame (in milliseconds).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Speed {
    /// Time spent building the feature vector.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preprocess: Option<f64>,
    /// Time spent in the classifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inference: Option<f64>,
    /// Time spent on form analysis and rep counting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postprocess: Option<f64>,
}

impl Speed {
    /// Create a new Speed instance with all timings.
    #[must_use]
    pub const fn new(preprocess: f64, inference: f64, postprocess: f64) -> Self {
        Self {
            preprocess: Some(preprocess),
            inference: Some(inference),
            postprocess: Some(postprocess),
        }
    }
}

/// Classification probabilities over a classifier's label set.
#[derive(Debug, Clone, PartialEq)]
pub struct Probs {
    /// Probability data with shape (`num_classes`,).
    pub data: Array1<f32>,
}

impl Probs {
    #[must_use]
    pub const fn new(data: Array1<f32>) -> Self {
        Self { data }
    }

    /// Build a distribution from raw classifier output.
    ///
    /// NaN entries become `0.0`. If the values do not already sum to roughly
    /// one (exports without a terminal softmax), softmax is applied.
    #[must_use]
    pub fn from_raw(raw: &[f32]) -> Self {
        let values: Vec<f32> = raw
            .iter()
            .map(|&v| if v.is_nan() { 0.0 } else { v })
            .collect();

        let sum: f32 = values.iter().sum();
        if (sum - 1.0).abs() > 0.1 && !values.is_empty() {
            let max_val = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            let exp_vals: Vec<f32> = values.iter().map(|&v| (v - max_val).exp()).collect();
            let exp_sum: f32 = exp_vals.iter().sum();
            return Self::new(exp_vals.into_iter().map(|v| v / exp_sum).collect());
        }

        Self::new(Array1::from_vec(values))
    }

    /// Number of classes in the distribution.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the classifier produced no scores.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the index of the top-1 class (first index wins ties).
    #[must_use]
    pub fn top1(&self) -> usize {
        self.data
            .iter()
            .enumerate()
            .fold(None::<(usize, f32)>, |best, (i, &p)| match best {
                Some((_, best_p)) if best_p >= p => best,
                _ => Some((i, p)),
            })
            .map_or(0, |(i, _)| i)
    }

    /// Get the confidence of the top-1 class.
    #[must_use]
    pub fn top1conf(&self) -> f32 {
        self.data.get(self.top1()).copied().unwrap_or(0.0)
    }
}

/// Classifier output for one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Prediction {
    /// Winning label, or `None` when the frame had no detection.
    pub label: Option<String>,
    /// Probability of the winning label (`0.0` when absent).
    pub probability: f32,
    /// Full distribution, or `None` when the frame had no detection.
    pub probs: Option<Probs>,
    /// Feature-building and inference timings.
    pub speed: Speed,
}

impl Prediction {
    /// The `(absent, 0.0, absent)` result for a frame without landmarks.
    #[must_use]
    pub fn absent() -> Self {
        Self::default()
    }

    /// True when the classifier was not invoked for this frame.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        self.label.is_none()
    }
}

/// Everything known about one processed frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    /// Zero-based frame index within the session.
    pub frame: usize,
    /// Active exercise mode.
    pub mode: Exercise,
    /// Classifier label, if the frame was classified.
    pub label: Option<String>,
    /// Probability of `label`.
    pub probability: f32,
    /// Overall form judgement for this frame.
    pub form: FormStatus,
    /// Feet spacing verdict (squat mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feet: Option<FormVerdict>,
    /// Knee spacing verdict (squat mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knee: Option<FormVerdict>,
    /// Whether hips, knees and ankles were all visible (squat mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_body_visible: Option<bool>,
    /// Whether the standing-posture check passed (squat mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standing: Option<bool>,
    /// Rep counter state after this frame (squat mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rep_state: Option<RepState>,
    /// Repetitions credited so far (squat mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rep_count: Option<u32>,
    /// Frame timings.
    pub speed: Speed,
}

impl FrameReport {
    /// One-line human summary, e.g. `squat: up (0.93) form=correct reps=3`.
    #[must_use]
    pub fn summary(&self) -> String {
        let label = self.label.as_ref().map_or_else(
            || "no pose".to_string(),
            |label| format!("{label} ({:.2})", self.probability),
        );
        let mut line = format!("{}: {label} form={}", self.mode, self.form);
        if let (Some(feet), Some(knee)) = (self.feet, self.knee) {
            line.push_str(&format!(" feet={feet} knee={knee}"));
        }
        if let Some(count) = self.rep_count {
            line.push_str(&format!(" reps={count}"));
        }
        line
    }
}
