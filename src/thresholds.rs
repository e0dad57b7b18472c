// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Calibrated squat form thresholds.
//!
//! Stored as a flat JSON object with four keys:
//!
//! ```json
//! {
//!   "feet_ratio_min": 0.92,
//!   "feet_ratio_max": 1.71,
//!   "knee_ratio_min": 0.68,
//!   "knee_ratio_max": 1.14
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FormError, Result};

/// Acceptance bands for the feet and knee spacing ratios.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibratedThresholds {
    pub feet_ratio_min: f64,
    pub feet_ratio_max: f64,
    pub knee_ratio_min: f64,
    pub knee_ratio_max: f64,
}

impl CalibratedThresholds {
    /// Key names, in file order.
    pub const KEYS: [&'static str; 4] = [
        "feet_ratio_min",
        "feet_ratio_max",
        "knee_ratio_min",
        "knee_ratio_max",
    ];

    /// Load thresholds from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::ResourceNotFound`] if the file does not exist and
    /// [`FormError::Io`] if it cannot be read.
    ///
    /// Content problems are not errors: malformed JSON or a missing or
    /// non-numeric key yields `Ok(None)` (with a warning), and squat form
    /// verdicts then stay `unknown`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(FormError::ResourceNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let thresholds = Self::from_json_str(&content);
        if thresholds.is_none() {
            crate::warn!(
                "Unusable calibration data in {}; squat form verdicts will be unknown",
                path.display()
            );
        }
        Ok(thresholds)
    }

    /// Parse thresholds from JSON text, returning `None` on any content problem.
    #[must_use]
    pub fn from_json_str(content: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(content).ok()?;
        let field = |key: &str| value.get(key).and_then(Value::as_f64);

        Some(Self {
            feet_ratio_min: field("feet_ratio_min")?,
            feet_ratio_max: field("feet_ratio_max")?,
            knee_ratio_min: field("knee_ratio_min")?,
            knee_ratio_max: field("knee_ratio_max")?,
        })
    }

    /// Write thresholds as pretty-printed JSON, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_complete() {
        let json = r#"{"feet_ratio_min": 0.9, "feet_ratio_max": 1.7,
                       "knee_ratio_min": 0.6, "knee_ratio_max": 1.1}"#;
        let thresholds = CalibratedThresholds::from_json_str(json).unwrap();
        assert!((thresholds.feet_ratio_min - 0.9).abs() < 1e-12);
        assert!((thresholds.knee_ratio_max - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_parse_integers_accepted() {
        let json = r#"{"feet_ratio_min": 1, "feet_ratio_max": 2,
                       "knee_ratio_min": 0, "knee_ratio_max": 1}"#;
        assert!(CalibratedThresholds::from_json_str(json).is_some());
    }

    #[test]
    fn test_parse_missing_key_degrades() {
        let json = r#"{"feet_ratio_min": 0.9, "feet_ratio_max": 1.7, "knee_ratio_min": 0.6}"#;
        assert!(CalibratedThresholds::from_json_str(json).is_none());
    }

    #[test]
    fn test_parse_malformed_degrades() {
        assert!(CalibratedThresholds::from_json_str("{not json").is_none());
        assert!(CalibratedThresholds::from_json_str("[1, 2, 3, 4]").is_none());
        let json = r#"{"feet_ratio_min": "a", "feet_ratio_max": 1.7,
                       "knee_ratio_min": 0.6, "knee_ratio_max": 1.1}"#;
        assert!(CalibratedThresholds::from_json_str(json).is_none());
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let result = CalibratedThresholds::load("does/not/exist/squat_thresholds.json");
        assert!(matches!(result, Err(FormError::ResourceNotFound(_))));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model").join("squat_thresholds.json");
        let thresholds = CalibratedThresholds {
            feet_ratio_min: 0.95,
            feet_ratio_max: 1.65,
            knee_ratio_min: 0.7,
            knee_ratio_max: 1.2,
        };
        thresholds.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        for key in CalibratedThresholds::KEYS {
            assert!(text.contains(key));
        }
        assert_eq!(CalibratedThresholds::load(&path).unwrap(), Some(thresholds));
    }

    #[test]
    fn test_load_malformed_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("squat_thresholds.json");
        std::fs::write(&path, "{}").unwrap();
        assert_eq!(CalibratedThresholds::load(&path).unwrap(), None);
    }
}
