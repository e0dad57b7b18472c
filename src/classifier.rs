// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Pose classifiers.
//!
//! A [`PoseClassifier`] pairs a probability model with the metadata it was
//! trained against: the metadata's column schema drives the feature builder,
//! and its label mapping names the winning class. The probability model sits
//! behind the [`ProbabilityModel`] trait; [`OnnxModel`] is the ONNX Runtime
//! implementation used in deployment.

use std::path::Path;
use std::time::Instant;

use ndarray::Axis;
use ort::session::Session;
#[cfg(feature = "coreml")]
use ort::execution_providers::CoreMLExecutionProvider;
use ort::value::TensorRef;

use crate::error::{FormError, Result};
use crate::exercise::Exercise;
use crate::features::{BuildFeatures, FeatureBuilder, FeatureVector};
use crate::landmarks::LandmarkSet;
use crate::metadata::ModelMetadata;
use crate::results::{Prediction, Probs, Speed};

/// Anything that maps a feature vector to per-class scores.
pub trait ProbabilityModel {
    /// Score one feature vector. Element `i` of the result belongs to class `i`.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be evaluated.
    fn predict_proba(&mut self, features: &FeatureVector) -> Result<Vec<f32>>;
}

/// A feed-forward classifier evaluated with ONNX Runtime.
pub struct OnnxModel {
    /// ONNX Runtime session.
    session: Session,
    /// Input tensor name.
    input_name: String,
    /// Output tensor names.
    output_names: Vec<String>,
}

impl OnnxModel {
    /// Load an ONNX classifier.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the ONNX model file.
    /// * `num_threads` - Intra-op threads; `0` lets ONNX Runtime decide.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::ResourceNotFound`] if the file doesn't exist, or a
    /// model load error if ONNX Runtime rejects it.
    pub fn load<P: AsRef<Path>>(path: P, num_threads: usize) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(FormError::ResourceNotFound(path.to_path_buf()));
        }

        #[allow(unused_mut)]
        let mut builder = Session::builder()
            .map_err(|e| FormError::ModelLoadError(format!("Failed to create session builder: {e}")))?;

        #[cfg(feature = "coreml")]
        {
            builder = builder
                .with_execution_providers([CoreMLExecutionProvider::default().build()])
                .map_err(|e| FormError::ModelLoadError(format!("Failed to register CoreML EP: {e}")))?;
        }

        let session = builder
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)
            .map_err(|e| FormError::ModelLoadError(format!("Failed to set optimization level: {e}")))?
            .with_intra_threads(num_threads)
            .map_err(|e| FormError::ModelLoadError(format!("Failed to set intra-thread count: {e}")))?
            .commit_from_file(path)
            .map_err(|e| FormError::ModelLoadError(format!("Failed to load {}: {e}", path.display())))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| FormError::ModelLoadError(format!("{} has no inputs", path.display())))?;

        let output_names: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();
        if output_names.is_empty() {
            return Err(FormError::ModelLoadError(format!("{} has no outputs", path.display())));
        }

        Ok(Self {
            session,
            input_name,
            output_names,
        })
    }
}

impl ProbabilityModel for OnnxModel {
    fn predict_proba(&mut self, features: &FeatureVector) -> Result<Vec<f32>> {
        // Batch of one: (1, num_features)
        let batch = features.view().insert_axis(Axis(0));
        let input_contiguous = batch.as_standard_layout();

        let input_tensor = TensorRef::from_array_view(&input_contiguous)
            .map_err(|e| FormError::InferenceError(format!("Failed to create input tensor: {e}")))?;

        let inputs = ort::inputs![&self.input_name => input_tensor];

        let outputs = self
            .session
            .run(inputs)
            .map_err(|e| FormError::InferenceError(format!("Inference failed: {e}")))?;

        let output_name = &self.output_names[0];
        let output = outputs
            .get(output_name.as_str())
            .ok_or_else(|| FormError::InferenceError(format!("Output '{output_name}' not found")))?;

        let (_shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| FormError::InferenceError(format!("Failed to extract output: {e}")))?;

        Ok(data.to_vec())
    }
}

impl std::fmt::Debug for OnnxModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxModel")
            .field("input_name", &self.input_name)
            .field("output_names", &self.output_names)
            .finish_non_exhaustive()
    }
}

/// Classifier gateway for one exercise.
///
/// # Example
///
/// ```no_run
/// use exercise_form::{Exercise, PoseClassifier};
///
/// let mut plank = PoseClassifier::load(
///     Exercise::Plank,
///     "plank_model/model/plank_mlp.onnx",
///     "plank_model/model/meta.json",
///     0,
/// )?;
/// let prediction = plank.predict(None)?;
/// assert!(prediction.is_absent());
/// # Ok::<(), exercise_form::FormError>(())
/// ```
#[derive(Debug)]
pub struct PoseClassifier<M = OnnxModel> {
    exercise: Exercise,
    metadata: ModelMetadata,
    features: FeatureBuilder,
    model: M,
}

impl PoseClassifier<OnnxModel> {
    /// Load an ONNX classifier and its metadata.
    ///
    /// Both files are checked before anything is loaded.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::ResourceNotFound`] naming the first missing file,
    /// or the error from loading the metadata or the model.
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(
        exercise: Exercise,
        model_path: P,
        meta_path: Q,
        num_threads: usize,
    ) -> Result<Self> {
        let (model_path, meta_path) = (model_path.as_ref(), meta_path.as_ref());
        for path in [model_path, meta_path] {
            if !path.exists() {
                return Err(FormError::ResourceNotFound(path.to_path_buf()));
            }
        }

        let metadata = ModelMetadata::load(meta_path)?;
        let model = OnnxModel::load(model_path, num_threads)?;
        Ok(Self::from_parts(exercise, metadata, model))
    }
}

impl<M: ProbabilityModel> PoseClassifier<M> {
    /// Assemble a classifier from already-loaded parts.
    pub fn from_parts(exercise: Exercise, metadata: ModelMetadata, model: M) -> Self {
        let features = FeatureBuilder::for_exercise(exercise, &metadata.feature_columns);
        let zero_filled = features.num_zero_filled();
        if zero_filled > 0 {
            crate::warn!(
                "{exercise} classifier: {zero_filled} of {} feature columns are not recognized and will be zero-filled",
                features.num_features()
            );
        }

        Self {
            exercise,
            metadata,
            features,
            model,
        }
    }

    /// Classify one frame.
    ///
    /// A frame without landmarks returns [`Prediction::absent`] without
    /// invoking the model. An arg-max index missing from the label mapping is
    /// reported as `class_<idx>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the model fails or produces no scores.
    pub fn predict(&mut self, landmarks: Option<&LandmarkSet>) -> Result<Prediction> {
        let start_preprocess = Instant::now();
        let Some(features) = self.features.build(landmarks) else {
            return Ok(Prediction::absent());
        };
        let preprocess_time = start_preprocess.elapsed().as_secs_f64() * 1000.0;

        let start_inference = Instant::now();
        let raw = self.model.predict_proba(&features)?;
        let inference_time = start_inference.elapsed().as_secs_f64() * 1000.0;

        let probs = Probs::from_raw(&raw);
        if probs.is_empty() {
            return Err(FormError::InferenceError(format!(
                "{} classifier returned no scores",
                self.exercise
            )));
        }

        let top1 = probs.top1();
        let label = self
            .metadata
            .class_name(top1)
            .map_or_else(|| format!("class_{top1}"), str::to_string);

        Ok(Prediction {
            label: Some(label),
            probability: probs.top1conf(),
            probs: Some(probs),
            speed: Speed {
                preprocess: Some(preprocess_time),
                inference: Some(inference_time),
                postprocess: None,
            },
        })
    }

    /// Exercise this classifier recognizes.
    #[must_use]
    pub const fn exercise(&self) -> Exercise {
        self.exercise
    }

    /// Get the classifier metadata.
    #[must_use]
    pub const fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// Get the decoded feature builder.
    #[must_use]
    pub const fn features(&self) -> &FeatureBuilder {
        &self.features
    }

    /// Get the number of classes.
    #[must_use]
    pub fn num_classes(&self) -> usize {
        self.metadata.num_classes()
    }
}
