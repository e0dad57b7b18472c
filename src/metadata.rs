// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Classifier metadata parsing.
//!
//! The training stage writes a `meta.json` next to each exported classifier:
//!
//! ```json
//! {
//!   "feature_columns": ["left_shoulder_x_rel", "left_shoulder_y_rel", "..."],
//!   "label_mapping": {"0": "C", "1": "H", "2": "L"}
//! }
//! ```
//!
//! Column order is the classifier's input order and is kept exactly as loaded.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{FormError, Result};

/// Raw on-disk shape of `meta.json`. JSON object keys are always strings, so
/// class indices are parsed separately.
#[derive(Debug, Deserialize)]
struct RawMetadata {
    feature_columns: Vec<String>,
    label_mapping: BTreeMap<String, String>,
}

/// Metadata describing a classifier's input schema and output labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelMetadata {
    /// Feature column names, in classifier input order.
    pub feature_columns: Vec<String>,
    /// Class index to label mapping.
    pub label_mapping: BTreeMap<usize, String>,
}

impl ModelMetadata {
    /// Load metadata from a `meta.json` file.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::ResourceNotFound`] if the file does not exist, or a
    /// metadata error if it is malformed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(FormError::ResourceNotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text).map_err(|e| {
            FormError::MetadataError(format!("{}: {e}", path.display()))
        })
    }

    /// Parse metadata from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, a label key is not an
    /// integer, the label mapping is not bijective, or no feature columns exist.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawMetadata = serde_json::from_str(json)?;

        if raw.feature_columns.is_empty() {
            return Err(FormError::MetadataError(
                "feature_columns is empty".to_string(),
            ));
        }

        let mut label_mapping = BTreeMap::new();
        for (key, label) in raw.label_mapping {
            let class_id = key.trim().parse::<usize>().map_err(|_| {
                FormError::MetadataError(format!("Invalid class index in label_mapping: {key}"))
            })?;
            if label_mapping.values().any(|existing| existing == &label) {
                return Err(FormError::MetadataError(format!(
                    "Label '{label}' is mapped to more than one class"
                )));
            }
            label_mapping.insert(class_id, label);
        }

        Ok(Self {
            feature_columns: raw.feature_columns,
            label_mapping,
        })
    }

    /// Get the number of input features.
    #[must_use]
    pub fn num_features(&self) -> usize {
        self.feature_columns.len()
    }

    /// Get the number of classes in this model.
    #[must_use]
    pub fn num_classes(&self) -> usize {
        self.label_mapping.len()
    }

    /// Get a class label by index.
    #[must_use]
    pub fn class_name(&self, class_id: usize) -> Option<&str> {
        self.label_mapping.get(&class_id).map(String::as_str)
    }
}
