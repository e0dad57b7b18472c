// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Engineered feature builder used by the plank classifier.
//!
//! Per frame, from shoulders, hips, knees and ankles:
//!
//! 1. `shoulder_mid`, `hip_mid`, `ankle_mid` are left/right means.
//! 2. `center` is the mean of `shoulder_mid` and `hip_mid`; `body_scale` is
//!    `|shoulder_mid - ankle_mid| + EPS`.
//! 3. Each key joint contributes `(p - center) / body_scale` per axis, which
//!    removes translation and scale.
//! 4. Left hip, right hip and body (mid-points) angles are taken at the hip
//!    vertex of shoulder-hip-ankle and divided by 180.
//!
//! Schema columns select from these values: `<joint>_x_rel`, `<joint>_y_rel`,
//! `left_hip_angle_norm`, `right_hip_angle_norm`, `body_angle_norm`. Anything
//! else is zero-filled.

use std::fmt;

use super::{BuildFeatures, FeatureVector};
use crate::landmarks::{Coord, Joint, LandmarkSet};
use crate::utils::{EPS, Point, angle_deg};

/// One of the three normalized angle features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlankAngle {
    LeftHip,
    RightHip,
    Body,
}

/// A decoded plank feature column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlankColumn {
    /// Relative, scale-normalized coordinate of a key joint (`Coord::X` or `Coord::Y`).
    Relative { joint: Joint, axis: Coord },
    /// Normalized angle in `[0, 1]`.
    Angle(PlankAngle),
    /// Any other column; always `0.0`.
    Zero,
}

impl PlankColumn {
    /// Decode a column name by its fixed suffix or name.
    #[must_use]
    pub fn parse(column: &str) -> Self {
        let relative = |joint_name: &str, axis: Coord| {
            Joint::from_name(joint_name)
                .filter(|joint| Joint::PLANK_KEY_JOINTS.contains(joint))
                .map_or(Self::Zero, |joint| Self::Relative { joint, axis })
        };

        if let Some(joint_name) = column.strip_suffix("_x_rel") {
            return relative(joint_name, Coord::X);
        }
        if let Some(joint_name) = column.strip_suffix("_y_rel") {
            return relative(joint_name, Coord::Y);
        }
        match column {
            "left_hip_angle_norm" => Self::Angle(PlankAngle::LeftHip),
            "right_hip_angle_norm" => Self::Angle(PlankAngle::RightHip),
            "body_angle_norm" => Self::Angle(PlankAngle::Body),
            _ => Self::Zero,
        }
    }
}

impl fmt::Display for PlankColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relative { joint, axis } => write!(f, "relative {joint}.{axis:?}"),
            Self::Angle(angle) => write!(f, "angle {angle:?}"),
            Self::Zero => write!(f, "zero"),
        }
    }
}

/// Per-frame engineered values, computed once and then read by column.
#[derive(Debug, Clone, Copy)]
struct PlankGeometry {
    relative: [Point; Joint::COUNT],
    left_hip_angle: f64,
    right_hip_angle: f64,
    body_angle: f64,
}

impl PlankGeometry {
    fn compute(landmarks: &LandmarkSet) -> Self {
        let p = |joint: Joint| Point::from(landmarks.get(joint));

        let shoulder_mid = p(Joint::LeftShoulder).midpoint(p(Joint::RightShoulder));
        let hip_mid = p(Joint::LeftHip).midpoint(p(Joint::RightHip));
        let ankle_mid = p(Joint::LeftAnkle).midpoint(p(Joint::RightAnkle));

        let center = shoulder_mid.midpoint(hip_mid);
        let body_scale = shoulder_mid.distance(ankle_mid) + EPS;

        let mut relative = [Point::default(); Joint::COUNT];
        for joint in Joint::PLANK_KEY_JOINTS {
            let point = p(joint);
            relative[joint as usize] = Point::new(
                (point.x - center.x) / body_scale,
                (point.y - center.y) / body_scale,
            );
        }

        Self {
            relative,
            left_hip_angle: angle_deg(
                p(Joint::LeftShoulder),
                p(Joint::LeftHip),
                p(Joint::LeftAnkle),
            ),
            right_hip_angle: angle_deg(
                p(Joint::RightShoulder),
                p(Joint::RightHip),
                p(Joint::RightAnkle),
            ),
            body_angle: angle_deg(shoulder_mid, hip_mid, ankle_mid),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn value(&self, column: PlankColumn) -> f32 {
        let value = match column {
            PlankColumn::Relative { joint, axis } => {
                let point = self.relative[joint as usize];
                match axis {
                    Coord::X => point.x,
                    Coord::Y => point.y,
                    Coord::Z | Coord::Visibility => 0.0,
                }
            }
            PlankColumn::Angle(PlankAngle::LeftHip) => self.left_hip_angle / 180.0,
            PlankColumn::Angle(PlankAngle::RightHip) => self.right_hip_angle / 180.0,
            PlankColumn::Angle(PlankAngle::Body) => self.body_angle / 180.0,
            PlankColumn::Zero => 0.0,
        };
        value as f32
    }
}

/// Builds engineered plank feature vectors in schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlankFeatureBuilder {
    columns: Vec<PlankColumn>,
}

impl PlankFeatureBuilder {
    #[must_use]
    pub fn from_columns<S: AsRef<str>>(columns: &[S]) -> Self {
        Self {
            columns: columns
                .iter()
                .map(|column| PlankColumn::parse(column.as_ref()))
                .collect(),
        }
    }

    /// Decoded columns, in schema order.
    #[must_use]
    pub fn columns(&self) -> &[PlankColumn] {
        &self.columns
    }
}

impl BuildFeatures for PlankFeatureBuilder {
    fn num_features(&self) -> usize {
        self.columns.len()
    }

    fn build_from(&self, landmarks: &LandmarkSet) -> FeatureVector {
        let geometry = PlankGeometry::compute(landmarks);
        self.columns
            .iter()
            .map(|&column| geometry.value(column))
            .collect()
    }

    fn describe(&self) -> Vec<String> {
        self.columns.iter().map(ToString::to_string).collect()
    }

    fn num_zero_filled(&self) -> usize {
        self.columns
            .iter()
            .filter(|column| matches!(column, PlankColumn::Zero))
            .count()
    }
}
