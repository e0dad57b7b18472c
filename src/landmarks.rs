// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Body landmark types.
//!
//! The pose estimator is an external collaborator. Whatever it is, it hands the
//! core one [`LandmarkSet`] per frame (or nothing, on a detection gap). The set
//! always carries every joint of the vocabulary; low confidence is expressed
//! through `visibility`, never by leaving a joint out.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FormError, Result};

/// Joint vocabulary tracked by the feature builders and form checks.
///
/// Discriminants index into [`LandmarkSet`]; [`Joint::mediapipe_index`] maps
/// each joint onto the 33-point MediaPipe Pose layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Joint {
    Nose = 0,
    LeftShoulder = 1,
    RightShoulder = 2,
    LeftHip = 3,
    RightHip = 4,
    LeftKnee = 5,
    RightKnee = 6,
    LeftAnkle = 7,
    RightAnkle = 8,
}

impl Joint {
    pub const COUNT: usize = 9;

    /// All joints in vocabulary order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Nose,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];

    /// The eight joints used by the plank relative-coordinate features.
    pub const PLANK_KEY_JOINTS: [Self; 8] = [
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];

    /// Hips, knees and ankles; all must be visible for rep counting.
    pub const LOWER_BODY: [Self; 6] = [
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];

    /// Column-name spelling of the joint (e.g. `left_shoulder`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
        }
    }

    /// Index of this joint in the MediaPipe Pose 33-landmark output.
    #[must_use]
    pub const fn mediapipe_index(&self) -> usize {
        match self {
            Self::Nose => 0,
            Self::LeftShoulder => 11,
            Self::RightShoulder => 12,
            Self::LeftHip => 23,
            Self::RightHip => 24,
            Self::LeftKnee => 25,
            Self::RightKnee => 26,
            Self::LeftAnkle => 27,
            Self::RightAnkle => 28,
        }
    }

    /// Look up a joint by its column-name spelling.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|joint| joint.as_str() == name)
    }
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coordinate selector used by raw feature columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Coord {
    X = 0,
    Y = 1,
    Z = 2,
    Visibility = 3,
}

impl FromStr for Coord {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "x" => Ok(Self::X),
            "y" => Ok(Self::Y),
            "z" => Ok(Self::Z),
            "v" | "visibility" => Ok(Self::Visibility),
            _ => Err(()),
        }
    }
}

/// A single landmark in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    /// Horizontal position, image-relative.
    pub x: f32,
    /// Vertical position, image-relative (grows downward).
    pub y: f32,
    /// Depth relative to the hips.
    #[serde(default)]
    pub z: f32,
    /// Estimator confidence that the joint is visible (0.0 to 1.0).
    #[serde(default, alias = "v")]
    pub visibility: f32,
}

impl Landmark {
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self { x, y, z, visibility }
    }

    /// Read one coordinate.
    #[must_use]
    pub const fn coord(&self, coord: Coord) -> f32 {
        match coord {
            Coord::X => self.x,
            Coord::Y => self.y,
            Coord::Z => self.z,
            Coord::Visibility => self.visibility,
        }
    }
}

/// Landmarks for every joint of the vocabulary, for one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LandmarkSet {
    landmarks: [Landmark; Joint::COUNT],
}

impl LandmarkSet {
    #[must_use]
    pub const fn new(landmarks: [Landmark; Joint::COUNT]) -> Self {
        Self { landmarks }
    }

    /// Build a set from the estimator's MediaPipe-ordered landmark list.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is too short to contain every joint.
    pub fn from_mediapipe(points: &[Landmark]) -> Result<Self> {
        let mut landmarks = [Landmark::default(); Joint::COUNT];
        for joint in Joint::ALL {
            let index = joint.mediapipe_index();
            landmarks[joint as usize] = *points.get(index).ok_or_else(|| {
                FormError::SourceError(format!(
                    "expected at least {} landmarks, got {} ({joint} missing)",
                    index + 1,
                    points.len()
                ))
            })?;
        }
        Ok(Self { landmarks })
    }

    /// Get a joint's landmark.
    #[must_use]
    pub const fn get(&self, joint: Joint) -> &Landmark {
        &self.landmarks[joint as usize]
    }

    /// Replace a joint's landmark.
    pub const fn set(&mut self, joint: Joint, landmark: Landmark) {
        self.landmarks[joint as usize] = landmark;
    }

    /// Builder-style variant of [`LandmarkSet::set`].
    #[must_use]
    pub const fn with(mut self, joint: Joint, landmark: Landmark) -> Self {
        self.set(joint, landmark);
        self
    }

    /// Iterate `(joint, landmark)` pairs in vocabulary order.
    pub fn iter(&self) -> impl Iterator<Item = (Joint, &Landmark)> {
        Joint::ALL.into_iter().zip(self.landmarks.iter())
    }

    /// True when every listed joint reaches `min_visibility`.
    #[must_use]
    pub fn all_visible(&self, joints: &[Joint], min_visibility: f32) -> bool {
        joints
            .iter()
            .all(|&joint| self.get(joint).visibility >= min_visibility)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_from_name() {
        assert_eq!(Joint::from_name("left_knee"), Some(Joint::LeftKnee));
        assert_eq!(Joint::from_name("nose"), Some(Joint::Nose));
        assert_eq!(Joint::from_name("left_elbow"), None);
        assert_eq!(Joint::from_name(""), None);
    }

    #[test]
    fn test_joint_order_matches_discriminant() {
        for (i, joint) in Joint::ALL.iter().enumerate() {
            assert_eq!(*joint as usize, i);
        }
    }

    #[test]
    fn test_coord_from_str() {
        assert_eq!("x".parse::<Coord>(), Ok(Coord::X));
        assert_eq!("v".parse::<Coord>(), Ok(Coord::Visibility));
        assert_eq!("visibility".parse::<Coord>(), Ok(Coord::Visibility));
        assert!("w".parse::<Coord>().is_err());
    }

    #[test]
    fn test_from_mediapipe() {
        let points: Vec<Landmark> = (0..33)
            .map(|i| Landmark::new(i as f32, 0.0, 0.0, 1.0))
            .collect();
        let set = LandmarkSet::from_mediapipe(&points).unwrap();
        assert_eq!(set.get(Joint::Nose).x, 0.0);
        assert_eq!(set.get(Joint::LeftShoulder).x, 11.0);
        assert_eq!(set.get(Joint::RightAnkle).x, 28.0);
    }

    #[test]
    fn test_from_mediapipe_too_short() {
        let points = vec![Landmark::default(); 20];
        let err = LandmarkSet::from_mediapipe(&points).unwrap_err();
        assert!(matches!(err, FormError::SourceError(_)));
    }

    #[test]
    fn test_all_visible() {
        let set = LandmarkSet::default()
            .with(Joint::LeftHip, Landmark::new(0.0, 0.0, 0.0, 0.9))
            .with(Joint::RightHip, Landmark::new(0.0, 0.0, 0.0, 0.6));
        assert!(set.all_visible(&[Joint::LeftHip, Joint::RightHip], 0.6));
        assert!(!set.all_visible(&[Joint::LeftHip, Joint::RightHip], 0.7));
        assert!(!set.all_visible(&Joint::LOWER_BODY, 0.6));
    }
}
