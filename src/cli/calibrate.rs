// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::process;

use crate::calibration::{CalibrationReport, calibrate, load_reference_dataset};
use crate::cli::args::CalibrateArgs;
use crate::error::Result;
use crate::{error, section, success, verbose, warn};

/// Run the calibrate command, exiting the process on failure.
pub fn run_calibrate(args: &CalibrateArgs) {
    if let Err(e) = calibrate_from_args(args) {
        error!("{e}");
        process::exit(1);
    }
}

/// Calibrate thresholds from the reference dataset and write them out.
///
/// # Errors
///
/// Returns an error if the dataset is missing or unusable, or the thresholds
/// cannot be written.
pub fn calibrate_from_args(args: &CalibrateArgs) -> Result<CalibrationReport> {
    verbose!("Reading reference dataset {}", args.data);
    let rows = load_reference_dataset(&args.data)?;
    let report = calibrate(&rows)?;

    if report.rows_excluded > 0 {
        warn!(
            "{} of {} rows excluded (zero shoulder or feet width)",
            report.rows_excluded,
            rows.len()
        );
    }

    let t = &report.thresholds;
    section!("Squat thresholds ({} rows)", report.rows_used);
    verbose!("feet_ratio: [{:.4}, {:.4}]", t.feet_ratio_min, t.feet_ratio_max);
    verbose!("knee_ratio: [{:.4}, {:.4}]", t.knee_ratio_min, t.knee_ratio_max);

    t.save(&args.output)?;
    success!("Saved thresholds to {}", args.output);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thresholds::CalibratedThresholds;

    #[test]
    fn test_calibrate_writes_thresholds() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("train.csv");
        let output = dir.path().join("model").join("squat_thresholds.json");
        std::fs::write(
            &data,
            "label,left_shoulder_x,right_shoulder_x,left_knee_x,right_knee_x,left_ankle_x,right_ankle_x\n\
             up,0.40,0.60,0.39,0.61,0.38,0.62\n\
             down,0.40,0.60,0.37,0.63,0.36,0.64\n\
             up,0.41,0.59,0.40,0.60,0.40,0.60\n\
             up,0.50,0.50,0.40,0.60,0.38,0.62\n",
        )
        .unwrap();

        let args = CalibrateArgs {
            data: data.to_string_lossy().to_string(),
            output: output.to_string_lossy().to_string(),
            verbose: false,
        };
        let report = calibrate_from_args(&args).unwrap();
        assert_eq!(report.rows_used, 3);
        assert_eq!(report.rows_excluded, 1);

        let saved = CalibratedThresholds::load(&output).unwrap().unwrap();
        assert_eq!(saved, report.thresholds);
    }

    #[test]
    fn test_calibrate_missing_dataset() {
        let args = CalibrateArgs {
            data: "no/such/train.csv".to_string(),
            output: "unused.json".to_string(),
            verbose: false,
        };
        assert!(calibrate_from_args(&args).is_err());
    }
}
