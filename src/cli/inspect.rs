// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::process;

use crate::cli::args::InspectArgs;
use crate::error::{FormError, Result};
use crate::features::{BuildFeatures, FeatureBuilder};
use crate::{Exercise, ModelMetadata};
use crate::{error, info, section, warn};

/// Run the inspect command, exiting the process on failure.
pub fn run_inspect(args: &InspectArgs) {
    if let Err(e) = inspect(args) {
        error!("{e}");
        process::exit(1);
    }
}

/// Print how a classifier's metadata is decoded.
///
/// # Errors
///
/// Returns an error if the exercise name is invalid or the metadata cannot be
/// loaded.
pub fn inspect(args: &InspectArgs) -> Result<()> {
    let exercise: Exercise = args
        .exercise
        .parse()
        .map_err(|e| FormError::ConfigError(format!("{e}")))?;
    let metadata = ModelMetadata::load(&args.meta)?;

    for line in describe_schema(exercise, &metadata) {
        info!("{line}");
    }

    let builder = FeatureBuilder::for_exercise(exercise, &metadata.feature_columns);
    let zero_filled = builder.num_zero_filled();
    if zero_filled > 0 {
        warn!("{zero_filled} column(s) are not recognized and will be zero-filled");
    }

    section!("Labels");
    for (class_id, label) in &metadata.label_mapping {
        info!("  {class_id}: {label}");
    }
    Ok(())
}

/// One line per schema column: `index  name -> decoded kind`.
#[must_use]
pub fn describe_schema(exercise: Exercise, metadata: &ModelMetadata) -> Vec<String> {
    let builder = FeatureBuilder::for_exercise(exercise, &metadata.feature_columns);
    let mut lines = vec![format!(
        "{exercise} schema: {} columns, {} classes",
        builder.num_features(),
        metadata.num_classes()
    )];
    lines.extend(
        metadata
            .feature_columns
            .iter()
            .zip(builder.describe())
            .enumerate()
            .map(|(i, (name, kind))| format!("  {i:>3}  {name:<28} -> {kind}")),
    );
    lines
}
