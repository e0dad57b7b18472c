// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Feature builders.
//!
//! A feature builder turns one frame's [`LandmarkSet`] into the fixed-order
//! `f32` vector a classifier was trained on. The column schema comes from the
//! classifier's metadata and is decoded once, at load time, into compact
//! column specs; per frame only arithmetic and lookups remain.
//!
//! Element `i` of every built vector corresponds to schema column `i`. The
//! order is never re-sorted. Columns that cannot be decoded contribute `0.0`,
//! mirroring what the training stage fed the network for them.

pub mod generic;
pub mod plank;

use ndarray::Array1;

use crate::exercise::Exercise;
use crate::landmarks::LandmarkSet;

pub use generic::{GenericColumn, GenericFeatureBuilder};
pub use plank::{PlankAngle, PlankColumn, PlankFeatureBuilder};

/// A classifier input vector, in schema order.
pub type FeatureVector = Array1<f32>;

/// Shared contract of the feature builders.
pub trait BuildFeatures {
    /// Number of schema columns (and therefore vector elements).
    fn num_features(&self) -> usize;

    /// Build the vector for a detected pose.
    fn build_from(&self, landmarks: &LandmarkSet) -> FeatureVector;

    /// Build the vector, or `None` when the frame had no detection.
    fn build(&self, landmarks: Option<&LandmarkSet>) -> Option<FeatureVector> {
        landmarks.map(|landmarks| self.build_from(landmarks))
    }

    /// Human-readable description of each decoded column.
    fn describe(&self) -> Vec<String>;

    /// Number of columns that decode to zero-fill.
    fn num_zero_filled(&self) -> usize;
}

/// Feature builder selected from a classifier's exercise identity.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureBuilder {
    /// Engineered relative-coordinate and angle features.
    Plank(PlankFeatureBuilder),
    /// Raw landmark coordinates and visibility.
    Generic(GenericFeatureBuilder),
}

impl FeatureBuilder {
    /// Decode `columns` with the builder that matches `exercise`.
    #[must_use]
    pub fn for_exercise<S: AsRef<str>>(exercise: Exercise, columns: &[S]) -> Self {
        if exercise.uses_engineered_features() {
            Self::Plank(PlankFeatureBuilder::from_columns(columns))
        } else {
            Self::Generic(GenericFeatureBuilder::from_columns(columns))
        }
    }

    fn inner(&self) -> &dyn BuildFeatures {
        match self {
            Self::Plank(builder) => builder,
            Self::Generic(builder) => builder,
        }
    }
}

impl BuildFeatures for FeatureBuilder {
    fn num_features(&self) -> usize {
        self.inner().num_features()
    }

    fn build_from(&self, landmarks: &LandmarkSet) -> FeatureVector {
        self.inner().build_from(landmarks)
    }

    fn describe(&self) -> Vec<String> {
        self.inner().describe()
    }

    fn num_zero_filled(&self) -> usize {
        self.inner().num_zero_filled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_selection() {
        let columns = ["left_hip_x_rel", "body_angle_norm"];
        assert!(matches!(
            FeatureBuilder::for_exercise(Exercise::Plank, &columns),
            FeatureBuilder::Plank(_)
        ));

        let columns = ["left_hip_x", "left_hip_visibility"];
        assert!(matches!(
            FeatureBuilder::for_exercise(Exercise::Squat, &columns),
            FeatureBuilder::Generic(_)
        ));
    }

    #[test]
    fn test_absent_landmarks_yield_absent_vector() {
        let builder = FeatureBuilder::for_exercise(Exercise::Squat, &["nose_x"]);
        assert!(builder.build(None).is_none());
        assert_eq!(builder.build(Some(&LandmarkSet::default())).unwrap().len(), 1);
    }
}
