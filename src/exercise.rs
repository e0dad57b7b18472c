// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Supported exercises.
//!
//! The exercise identity of a classifier decides, once at load time, which
//! feature builder turns landmarks into that classifier's input vector.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Exercise modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Exercise {
    /// Static hold; the classifier judges form directly.
    #[default]
    Plank,
    /// Repetitions; the classifier reports the stage (down / up).
    Squat,
}

impl Exercise {
    /// Returns the string representation used in model identities and output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Plank => "plank",
            Self::Squat => "squat",
        }
    }

    /// Returns whether this exercise feeds engineered (relative + angle) features.
    #[must_use]
    pub const fn uses_engineered_features(&self) -> bool {
        matches!(self, Self::Plank)
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Exercise {
    type Err = ExerciseParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plank" => Ok(Self::Plank),
            "squat" | "squat_stage" => Ok(Self::Squat),
            _ => Err(ExerciseParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid exercise string.
#[derive(Debug, Clone)]
pub struct ExerciseParseError(String);

impl fmt::Display for ExerciseParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid exercise '{}', expected one of: plank, squat",
            self.0
        )
    }
}

impl std::error::Error for ExerciseParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exercise_from_str() {
        assert_eq!("plank".parse::<Exercise>().unwrap(), Exercise::Plank);
        assert_eq!("squat".parse::<Exercise>().unwrap(), Exercise::Squat);
        assert_eq!("Squat_Stage".parse::<Exercise>().unwrap(), Exercise::Squat);
        assert!("pushup".parse::<Exercise>().is_err());
    }

    #[test]
    fn test_exercise_display() {
        assert_eq!(Exercise::Plank.to_string(), "plank");
        assert_eq!(Exercise::Squat.to_string(), "squat");
    }

    #[test]
    fn test_exercise_capabilities() {
        assert!(Exercise::Plank.uses_engineered_features());
        assert!(!Exercise::Squat.uses_engineered_features());
    }
}
