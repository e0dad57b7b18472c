// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Raw-coordinate feature builder used by the squat stage classifier.
//!
//! Column names follow `<joint>_<coord>` (for example `left_knee_y` or
//! `right_ankle_visibility`). Values pass through unchanged; the classifier
//! was trained on the same raw convention.

use std::fmt;

use super::{BuildFeatures, FeatureVector};
use crate::landmarks::{Coord, Joint, LandmarkSet};

/// A decoded raw feature column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenericColumn {
    /// One coordinate of one joint.
    Landmark { joint: Joint, coord: Coord },
    /// Unparseable or unknown column; always `0.0`.
    Zero,
}

impl GenericColumn {
    /// Decode a column name. Unknown joints and coordinates become [`Self::Zero`].
    #[must_use]
    pub fn parse(column: &str) -> Self {
        let Some((joint_name, coord_name)) = column.rsplit_once('_') else {
            return Self::Zero;
        };
        match (Joint::from_name(joint_name), coord_name.parse::<Coord>()) {
            (Some(joint), Ok(coord)) => Self::Landmark { joint, coord },
            _ => Self::Zero,
        }
    }

    #[must_use]
    pub fn value(&self, landmarks: &LandmarkSet) -> f32 {
        match *self {
            Self::Landmark { joint, coord } => landmarks.get(joint).coord(coord),
            Self::Zero => 0.0,
        }
    }
}

impl fmt::Display for GenericColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Landmark { joint, coord } => write!(f, "raw {joint}.{coord:?}"),
            Self::Zero => write!(f, "zero"),
        }
    }
}

/// Builds raw landmark feature vectors in schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericFeatureBuilder {
    columns: Vec<GenericColumn>,
}

impl GenericFeatureBuilder {
    #[must_use]
    pub fn from_columns<S: AsRef<str>>(columns: &[S]) -> Self {
        Self {
            columns: columns
                .iter()
                .map(|column| GenericColumn::parse(column.as_ref()))
                .collect(),
        }
    }

    /// Decoded columns, in schema order.
    #[must_use]
    pub fn columns(&self) -> &[GenericColumn] {
        &self.columns
    }
}

impl BuildFeatures for GenericFeatureBuilder {
    fn num_features(&self) -> usize {
        self.columns.len()
    }

    fn build_from(&self, landmarks: &LandmarkSet) -> FeatureVector {
        self.columns
            .iter()
            .map(|column| column.value(landmarks))
            .collect()
    }

    fn describe(&self) -> Vec<String> {
        self.columns.iter().map(ToString::to_string).collect()
    }

    fn num_zero_filled(&self) -> usize {
        self.columns
            .iter()
            .filter(|column| matches!(column, GenericColumn::Zero))
            .count()
    }
}
