// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Squat form analysis and posture checks.
//!
//! Feet spacing is judged relative to shoulder width, knee spacing relative to
//! feet width, each against a calibrated `[min, max]` band. Distances here are
//! full planar (x, y) distances, while the offline calibrator measures along x
//! only; the two are kept as they are so the bands reproduce the deployed
//! behavior.

use std::fmt;

use serde::Serialize;

use crate::landmarks::{Joint, LandmarkSet};
use crate::thresholds::CalibratedThresholds;
use crate::utils::{EPS, Point, angle_deg};

/// Verdict for one spacing ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormVerdict {
    Correct,
    TooNarrow,
    TooWide,
    Unknown,
}

impl FormVerdict {
    /// Place `ratio` against the inclusive band `[min, max]`.
    #[must_use]
    pub fn classify(ratio: f64, min: f64, max: f64) -> Self {
        if ratio < min {
            Self::TooNarrow
        } else if ratio > max {
            Self::TooWide
        } else {
            Self::Correct
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Correct => "correct",
            Self::TooNarrow => "too_narrow",
            Self::TooWide => "too_wide",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FormVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Overall form judgement reported per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStatus {
    Correct,
    Incorrect,
    /// Nothing could be judged (no pose, or only unknown verdicts).
    #[default]
    Undetermined,
}

impl fmt::Display for FormStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Correct => "correct",
            Self::Incorrect => "incorrect",
            Self::Undetermined => "undetermined",
        };
        write!(f, "{text}")
    }
}

/// Feet and knee verdicts for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormAssessment {
    pub feet: FormVerdict,
    pub knee: FormVerdict,
}

impl FormAssessment {
    /// Both verdicts `unknown`.
    #[must_use]
    pub const fn unknown() -> Self {
        Self {
            feet: FormVerdict::Unknown,
            knee: FormVerdict::Unknown,
        }
    }

    /// True only when both verdicts are `correct`.
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.feet == FormVerdict::Correct && self.knee == FormVerdict::Correct
    }

    #[must_use]
    pub fn status(&self) -> FormStatus {
        if self.is_correct() {
            FormStatus::Correct
        } else if self.feet == FormVerdict::Unknown && self.knee == FormVerdict::Unknown {
            FormStatus::Undetermined
        } else {
            FormStatus::Incorrect
        }
    }
}

/// Judge feet and knee spacing against calibrated bands.
///
/// Degenerate geometry (shoulder or feet width below [`EPS`]) and missing
/// thresholds both yield `unknown` for the two verdicts.
#[must_use]
pub fn analyze(landmarks: &LandmarkSet, thresholds: Option<&CalibratedThresholds>) -> FormAssessment {
    let p = |joint: Joint| Point::from(landmarks.get(joint));

    let shoulder_width = p(Joint::LeftShoulder).distance(p(Joint::RightShoulder));
    let feet_width = p(Joint::LeftAnkle).distance(p(Joint::RightAnkle));
    let knee_width = p(Joint::LeftKnee).distance(p(Joint::RightKnee));

    if shoulder_width < EPS || feet_width < EPS {
        return FormAssessment::unknown();
    }

    let Some(thresholds) = thresholds else {
        return FormAssessment::unknown();
    };

    let feet_ratio = feet_width / (shoulder_width + EPS);
    let knee_ratio = knee_width / (feet_width + EPS);

    FormAssessment {
        feet: FormVerdict::classify(feet_ratio, thresholds.feet_ratio_min, thresholds.feet_ratio_max),
        knee: FormVerdict::classify(knee_ratio, thresholds.knee_ratio_min, thresholds.knee_ratio_max),
    }
}

/// True when hips, knees and ankles all reach `min_visibility`.
#[must_use]
pub fn lower_body_visible(landmarks: Option<&LandmarkSet>, min_visibility: f32) -> bool {
    landmarks.is_some_and(|landmarks| landmarks.all_visible(&Joint::LOWER_BODY, min_visibility))
}

/// True when both legs are upright and nearly straight.
///
/// Each leg needs `hip.y < knee.y < ankle.y` (y grows downward) and a knee
/// angle of at least `knee_angle_min` degrees.
#[must_use]
pub fn is_standing(landmarks: Option<&LandmarkSet>, knee_angle_min: f64) -> bool {
    let Some(landmarks) = landmarks else {
        return false;
    };
    let p = |joint: Joint| Point::from(landmarks.get(joint));

    let legs = [
        (Joint::LeftHip, Joint::LeftKnee, Joint::LeftAnkle),
        (Joint::RightHip, Joint::RightKnee, Joint::RightAnkle),
    ];

    legs.iter().all(|&(hip, knee, ankle)| {
        let (hip, knee, ankle) = (p(hip), p(knee), p(ankle));
        hip.y < knee.y && knee.y < ankle.y && angle_deg(hip, knee, ankle) >= knee_angle_min
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::Landmark;

    fn thresholds() -> CalibratedThresholds {
        CalibratedThresholds {
            feet_ratio_min: 0.8,
            feet_ratio_max: 1.6,
            knee_ratio_min: 0.7,
            knee_ratio_max: 1.2,
        }
    }

    /// Frontal standing pose; `feet` and `knees` are half-widths around x = 0.5.
    fn standing_pose(feet: f32, knees: f32) -> LandmarkSet {
        let lm = |x: f32, y: f32| Landmark::new(x, y, 0.0, 0.95);
        LandmarkSet::default()
            .with(Joint::LeftShoulder, lm(0.4, 0.30))
            .with(Joint::RightShoulder, lm(0.6, 0.30))
            .with(Joint::LeftHip, lm(0.45, 0.55))
            .with(Joint::RightHip, lm(0.55, 0.55))
            .with(Joint::LeftKnee, lm(0.5 - knees, 0.72))
            .with(Joint::RightKnee, lm(0.5 + knees, 0.72))
            .with(Joint::LeftAnkle, lm(0.5 - feet, 0.90))
            .with(Joint::RightAnkle, lm(0.5 + feet, 0.90))
    }

    #[test]
    fn test_classify_band_inclusive() {
        assert_eq!(FormVerdict::classify(1.0, 1.0, 2.0), FormVerdict::Correct);
        assert_eq!(FormVerdict::classify(2.0, 1.0, 2.0), FormVerdict::Correct);
        assert_eq!(FormVerdict::classify(0.99, 1.0, 2.0), FormVerdict::TooNarrow);
        assert_eq!(FormVerdict::classify(2.01, 1.0, 2.0), FormVerdict::TooWide);
    }

    #[test]
    fn test_analyze_correct() {
        // shoulders 0.2 apart, feet 0.24 (ratio 1.2), knees 0.22 (ratio ~0.92)
        let assessment = analyze(&standing_pose(0.12, 0.11), Some(&thresholds()));
        assert_eq!(assessment.feet, FormVerdict::Correct);
        assert_eq!(assessment.knee, FormVerdict::Correct);
        assert!(assessment.is_correct());
        assert_eq!(assessment.status(), FormStatus::Correct);
    }

    #[test]
    fn test_analyze_narrow_and_wide() {
        // feet 0.1 (ratio 0.5) -> too narrow; knees 0.2 vs feet 0.1 (ratio 2.0) -> too wide
        let assessment = analyze(&standing_pose(0.05, 0.10), Some(&thresholds()));
        assert_eq!(assessment.feet, FormVerdict::TooNarrow);
        assert_eq!(assessment.knee, FormVerdict::TooWide);
        assert_eq!(assessment.status(), FormStatus::Incorrect);
    }

    #[test]
    fn test_analyze_zero_shoulder_width_is_unknown() {
        let mut pose = standing_pose(0.12, 0.11);
        let shoulder = Landmark::new(0.5, 0.3, 0.0, 0.9);
        pose.set(Joint::LeftShoulder, shoulder);
        pose.set(Joint::RightShoulder, shoulder);

        let assessment = analyze(&pose, Some(&thresholds()));
        assert_eq!(assessment, FormAssessment::unknown());
        assert_eq!(assessment.status(), FormStatus::Undetermined);
    }

    #[test]
    fn test_analyze_zero_feet_width_is_unknown() {
        let assessment = analyze(&standing_pose(0.0, 0.11), Some(&thresholds()));
        assert_eq!(assessment, FormAssessment::unknown());
    }

    #[test]
    fn test_analyze_without_thresholds_is_unknown() {
        let assessment = analyze(&standing_pose(0.12, 0.11), None);
        assert_eq!(assessment, FormAssessment::unknown());
    }

    #[test]
    fn test_analyze_uses_planar_distance() {
        // Feet at the same x but vertically apart still have non-zero width.
        let mut pose = standing_pose(0.0, 0.11);
        pose.set(Joint::LeftAnkle, Landmark::new(0.5, 0.78, 0.0, 0.9));
        let assessment = analyze(&pose, Some(&thresholds()));
        assert_ne!(assessment.feet, FormVerdict::Unknown);
    }

    #[test]
    fn test_lower_body_visible() {
        let pose = standing_pose(0.12, 0.11);
        assert!(lower_body_visible(Some(&pose), 0.6));
        assert!(!lower_body_visible(None, 0.6));

        let hidden = pose.with(Joint::RightAnkle, Landmark::new(0.62, 0.9, 0.0, 0.3));
        assert!(!lower_body_visible(Some(&hidden), 0.6));
    }

    #[test]
    fn test_is_standing() {
        let pose = standing_pose(0.12, 0.11);
        assert!(is_standing(Some(&pose), 155.0));
        assert!(!is_standing(None, 155.0));
    }

    #[test]
    fn test_bent_knee_is_not_standing() {
        // Left knee pushed far forward: roughly 90 degrees at the knee.
        let pose = standing_pose(0.12, 0.11)
            .with(Joint::LeftHip, Landmark::new(0.20, 0.55, 0.0, 0.9))
            .with(Joint::LeftKnee, Landmark::new(0.38, 0.72, 0.0, 0.9))
            .with(Joint::LeftAnkle, Landmark::new(0.38 - 0.17, 0.90, 0.0, 0.9));
        assert!(!is_standing(Some(&pose), 155.0));
    }

    #[test]
    fn test_inverted_order_is_not_standing() {
        let pose = standing_pose(0.12, 0.11)
            .with(Joint::RightKnee, Landmark::new(0.61, 0.50, 0.0, 0.9));
        assert!(!is_standing(Some(&pose), 155.0));
    }
}
