// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Command-line interface.
//!
//! This module contains argument parsing, console logging and the bodies of
//! the `analyze`, `calibrate` and `inspect` commands.

// Modules
/// Stream analysis.
pub mod analyze;

/// CLI arguments.
pub mod args;

/// Threshold calibration.
pub mod calibrate;

/// Metadata inspection.
pub mod inspect;

/// Console logging.
pub mod logging;
