// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Error types for the exercise form library.

use std::fmt;
use std::path::PathBuf;

/// Result type alias for exercise form operations.
pub type Result<T> = std::result::Result<T, FormError>;

/// Main error type for the exercise form library.
///
/// Only startup and offline failures surface here. Per-frame problems such as
/// detection gaps or degenerate geometry are absorbed into `None` and
/// [`crate::form::FormVerdict::Unknown`] instead.
#[derive(Debug)]
pub enum FormError {
    /// A required artifact (model, metadata, thresholds, dataset) is missing.
    ResourceNotFound(PathBuf),
    /// Error loading the ONNX classifier.
    ModelLoadError(String),
    /// Error during classifier inference.
    InferenceError(String),
    /// Error parsing model metadata.
    MetadataError(String),
    /// Threshold calibration could not produce a result.
    CalibrationError(String),
    /// The reference dataset is missing columns or holds bad values.
    DatasetError(String),
    /// A landmark stream record could not be decoded.
    SourceError(String),
    /// Invalid configuration provided.
    ConfigError(String),
    /// Wrapped `std::io::Error`
    Io(std::io::Error),
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResourceNotFound(path) => write!(f, "Resource not found: {}", path.display()),
            Self::ModelLoadError(msg) => write!(f, "Model load error: {msg}"),
            Self::InferenceError(msg) => write!(f, "Inference error: {msg}"),
            Self::MetadataError(msg) => write!(f, "Metadata error: {msg}"),
            Self::CalibrationError(msg) => write!(f, "Calibration error: {msg}"),
            Self::DatasetError(msg) => write!(f, "Dataset error: {msg}"),
            Self::SourceError(msg) => write!(f, "Source error: {msg}"),
            Self::ConfigError(msg) => write!(f, "Config error: {msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
        }
    }
}

impl std::error::Error for FormError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FormError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for FormError {
    fn from(err: serde_json::Error) -> Self {
        Self::MetadataError(err.to_string())
    }
}

impl From<csv::Error> for FormError {
    fn from(err: csv::Error) -> Self {
        Self::DatasetError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FormError::ModelLoadError("test".to_string());
        assert_eq!(err.to_string(), "Model load error: test");

        let err = FormError::ResourceNotFound(PathBuf::from("squat_model/model/meta.json"));
        assert_eq!(err.to_string(), "Resource not found: squat_model/model/meta.json");
    }

    #[test]
    fn test_io_error_source() {
        use std::error::Error;

        let err = FormError::from(std::io::Error::other("boom"));
        assert!(err.source().is_some());
        assert!(FormError::ConfigError("x".to_string()).source().is_none());
    }
}
