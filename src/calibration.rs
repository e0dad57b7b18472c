// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Offline calibration of the squat form thresholds.
//!
//! The reference dataset is the squat training CSV (one row per recorded
//! pose, assumed mostly well-formed). Widths are measured along x only, and
//! the acceptance bands are the 5th and 95th percentiles of the ratios.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{FormError, Result};
use crate::thresholds::CalibratedThresholds;
use crate::utils::{EPS, percentile};

/// Columns the calibrator reads from the reference dataset.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "left_shoulder_x",
    "right_shoulder_x",
    "left_knee_x",
    "right_knee_x",
    "left_ankle_x",
    "right_ankle_x",
];

/// Lower percentile of the acceptance bands.
pub const LOWER_PERCENTILE: f64 = 5.0;
/// Upper percentile of the acceptance bands.
pub const UPPER_PERCENTILE: f64 = 95.0;

/// The x coordinates of one reference pose.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReferenceRow {
    pub left_shoulder_x: f64,
    pub right_shoulder_x: f64,
    pub left_knee_x: f64,
    pub right_knee_x: f64,
    pub left_ankle_x: f64,
    pub right_ankle_x: f64,
}

impl ReferenceRow {
    /// Build a row from values in [`REQUIRED_COLUMNS`] order.
    #[must_use]
    pub const fn from_values(values: [f64; 6]) -> Self {
        Self {
            left_shoulder_x: values[0],
            right_shoulder_x: values[1],
            left_knee_x: values[2],
            right_knee_x: values[3],
            left_ankle_x: values[4],
            right_ankle_x: values[5],
        }
    }

    /// Feet and knee ratios, or `None` when the row is degenerate.
    ///
    /// A row is usable only if both shoulder and feet widths exceed [`EPS`];
    /// missing (NaN) coordinates fail that test too.
    #[must_use]
    pub fn ratios(&self) -> Option<(f64, f64)> {
        let shoulder_width = (self.right_shoulder_x - self.left_shoulder_x).abs();
        let feet_width = (self.right_ankle_x - self.left_ankle_x).abs();
        let knee_width = (self.right_knee_x - self.left_knee_x).abs();

        if !(shoulder_width > EPS && feet_width > EPS) {
            return None;
        }

        let feet_ratio = feet_width / (shoulder_width + EPS);
        let knee_ratio = knee_width / (feet_width + EPS);
        (feet_ratio.is_finite() && knee_ratio.is_finite()).then_some((feet_ratio, knee_ratio))
    }
}

/// Calibration output with row accounting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationReport {
    pub thresholds: CalibratedThresholds,
    /// Rows that contributed to the percentiles.
    pub rows_used: usize,
    /// Degenerate rows that were skipped.
    pub rows_excluded: usize,
}

/// Derive the acceptance bands from reference rows.
///
/// # Errors
///
/// Returns [`FormError::CalibrationError`] if no row survives the degeneracy
/// filter.
pub fn calibrate(rows: &[ReferenceRow]) -> Result<CalibrationReport> {
    let (feet_ratios, knee_ratios): (Vec<f64>, Vec<f64>) =
        rows.iter().filter_map(ReferenceRow::ratios).unzip();

    let rows_used = feet_ratios.len();
    let band = |values: &[f64]| {
        percentile(values, LOWER_PERCENTILE).zip(percentile(values, UPPER_PERCENTILE))
    };

    let (Some((feet_ratio_min, feet_ratio_max)), Some((knee_ratio_min, knee_ratio_max))) =
        (band(&feet_ratios), band(&knee_ratios))
    else {
        return Err(FormError::CalibrationError(format!(
            "no usable rows among {} (every row has zero shoulder or feet width)",
            rows.len()
        )));
    };

    Ok(CalibrationReport {
        thresholds: CalibratedThresholds {
            feet_ratio_min,
            feet_ratio_max,
            knee_ratio_min,
            knee_ratio_max,
        },
        rows_used,
        rows_excluded: rows.len() - rows_used,
    })
}

/// Read reference rows from CSV text with a header line.
///
/// Columns whose header starts with `unnamed` (any case) are ignored, as are
/// all columns not in [`REQUIRED_COLUMNS`]. Empty cells read as NaN and make
/// their row degenerate.
///
/// # Errors
///
/// Returns [`FormError::DatasetError`] if a required column is missing or a
/// cell is not a number.
pub fn read_reference_csv<R: Read>(reader: R) -> Result<Vec<ReferenceRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let mut indices = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, name) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| !h.to_lowercase().starts_with("unnamed") && h == name)
            .ok_or_else(|| {
                FormError::DatasetError(format!("column '{name}' not found in reference dataset"))
            })?;
    }

    let mut rows = Vec::new();
    for (line, record) in csv_reader.records().enumerate() {
        let record = record?;
        let mut values = [f64::NAN; REQUIRED_COLUMNS.len()];
        for ((value, &index), name) in values.iter_mut().zip(&indices).zip(REQUIRED_COLUMNS) {
            let cell = record.get(index).unwrap_or("");
            if cell.is_empty() {
                continue;
            }
            *value = cell.parse().map_err(|_| {
                FormError::DatasetError(format!(
                    "row {}: column '{name}' is not a number: '{cell}'",
                    line + 1
                ))
            })?;
        }
        rows.push(ReferenceRow::from_values(values));
    }

    Ok(rows)
}

/// Read reference rows from a CSV file.
///
/// # Errors
///
/// Returns [`FormError::ResourceNotFound`] if the file does not exist, or any
/// error from [`read_reference_csv`].
pub fn load_reference_dataset<P: AsRef<Path>>(path: P) -> Result<Vec<ReferenceRow>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(FormError::ResourceNotFound(path.to_path_buf()));
    }
    let file = File::open(path)?;
    read_reference_csv(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(shoulders: f64, knees: f64, feet: f64) -> ReferenceRow {
        ReferenceRow {
            left_shoulder_x: 0.5 - shoulders / 2.0,
            right_shoulder_x: 0.5 + shoulders / 2.0,
            left_knee_x: 0.5 - knees / 2.0,
            right_knee_x: 0.5 + knees / 2.0,
            left_ankle_x: 0.5 - feet / 2.0,
            right_ankle_x: 0.5 + feet / 2.0,
        }
    }

    #[test]
    fn test_ratios() {
        let (feet, knee) = row(0.2, 0.2, 0.3).ratios().unwrap();
        assert!((feet - 1.5).abs() < 1e-4);
        assert!((knee - 0.2 / 0.3).abs() < 1e-4);
    }

    #[test]
    fn test_degenerate_rows_excluded() {
        assert!(row(0.0, 0.2, 0.3).ratios().is_none());
        assert!(row(0.2, 0.2, 0.0).ratios().is_none());
        let mut missing = row(0.2, 0.2, 0.3);
        missing.left_ankle_x = f64::NAN;
        assert!(missing.ratios().is_none());
    }

    #[test]
    fn test_calibrate_matches_percentiles() {
        let rows: Vec<ReferenceRow> = (1..=20)
            .map(|i| row(0.2, 0.15 + f64::from(i) * 0.005, 0.2 + f64::from(i) * 0.01))
            .collect();
        let report = calibrate(&rows).unwrap();

        let (feet, knee): (Vec<f64>, Vec<f64>) = rows.iter().filter_map(ReferenceRow::ratios).unzip();
        let t = report.thresholds;
        assert!((t.feet_ratio_min - percentile(&feet, 5.0).unwrap()).abs() < 1e-12);
        assert!((t.feet_ratio_max - percentile(&feet, 95.0).unwrap()).abs() < 1e-12);
        assert!((t.knee_ratio_min - percentile(&knee, 5.0).unwrap()).abs() < 1e-12);
        assert!((t.knee_ratio_max - percentile(&knee, 95.0).unwrap()).abs() < 1e-12);
        assert!(t.feet_ratio_min <= t.feet_ratio_max);
        assert_eq!(report.rows_used, 20);
        assert_eq!(report.rows_excluded, 0);
    }

    #[test]
    fn test_calibrate_counts_exclusions() {
        let rows = vec![row(0.2, 0.2, 0.3), row(0.0, 0.2, 0.3), row(0.2, 0.25, 0.35)];
        let report = calibrate(&rows).unwrap();
        assert_eq!(report.rows_used, 2);
        assert_eq!(report.rows_excluded, 1);
    }

    #[test]
    fn test_degenerate_rows_do_not_shift_thresholds() {
        let clean: Vec<ReferenceRow> = (1..=12)
            .map(|i| row(0.2, 0.15 + f64::from(i) * 0.004, 0.22 + f64::from(i) * 0.008))
            .collect();

        // Shoulder width of exactly EPS sits on the excluded side of the edge.
        let shoulder_at_eps = ReferenceRow {
            left_shoulder_x: 0.0,
            right_shoulder_x: EPS,
            ..row(0.2, 0.9, 0.9)
        };
        assert!(shoulder_at_eps.ratios().is_none());

        let mut mixed = Vec::new();
        for (i, clean_row) in clean.iter().enumerate() {
            mixed.push(*clean_row);
            match i % 3 {
                0 => mixed.push(row(0.0, 0.5, 0.9)),
                1 => mixed.push(row(0.2, 0.5, 0.0)),
                _ => mixed.push(shoulder_at_eps),
            }
        }

        let expected = calibrate(&clean).unwrap();
        let report = calibrate(&mixed).unwrap();
        assert_eq!(report.thresholds, expected.thresholds);
        assert_eq!(report.rows_used, 12);
        assert_eq!(report.rows_excluded, 12);
    }

    #[test]
    fn test_calibrate_all_excluded_is_error() {
        let rows = vec![row(0.0, 0.2, 0.3), row(0.2, 0.2, 0.0)];
        assert!(matches!(calibrate(&rows), Err(FormError::CalibrationError(_))));
        assert!(matches!(calibrate(&[]), Err(FormError::CalibrationError(_))));
    }

    #[test]
    fn test_read_csv_ignores_unnamed_and_extra_columns() {
        let csv = "Unnamed: 0,label,left_shoulder_x,right_shoulder_x,left_knee_x,right_knee_x,left_ankle_x,right_ankle_x,nose_y\n\
                   0,up,0.4,0.6,0.42,0.58,0.38,0.62,0.1\n\
                   1,down,0.4,0.6,0.41,0.59,,0.62,0.2\n";
        let rows = read_reference_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert!((rows[0].right_ankle_x - 0.62).abs() < 1e-12);
        assert!(rows[1].left_ankle_x.is_nan());

        let report = calibrate(&rows).unwrap();
        assert_eq!(report.rows_used, 1);
        assert_eq!(report.rows_excluded, 1);
    }

    #[test]
    fn test_read_csv_missing_column() {
        let csv = "left_shoulder_x,right_shoulder_x,left_knee_x,right_knee_x,left_ankle_x\n0.4,0.6,0.4,0.6,0.4\n";
        let err = read_reference_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, FormError::DatasetError(_)));
        assert!(err.to_string().contains("right_ankle_x"));
    }

    #[test]
    fn test_read_csv_non_numeric_cell() {
        let csv = "left_shoulder_x,right_shoulder_x,left_knee_x,right_knee_x,left_ankle_x,right_ankle_x\n0.4,abc,0.4,0.6,0.4,0.6\n";
        assert!(matches!(read_reference_csv(csv.as_bytes()), Err(FormError::DatasetError(_))));
    }

    #[test]
    fn test_load_missing_dataset() {
        assert!(matches!(
            load_reference_dataset("no/such/train.csv"),
            Err(FormError::ResourceNotFound(_))
        ));
    }
}
