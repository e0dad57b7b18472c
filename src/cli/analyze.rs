// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process;
use std::time::Instant;

use crate::cli::args::AnalyzeArgs;
use crate::source::{LandmarkSource, Source};
use crate::{Exercise, ExerciseSession, FormError, FrameReport, Result, SessionConfig, VERSION};
use crate::{error, section, verbose};

/// Totals gathered over one analyze run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyzeSummary {
    pub frames: usize,
    pub detections: usize,
    pub rep_count: u32,
    pub total_preprocess: f64,
    pub total_inference: f64,
    pub total_postprocess: f64,
    pub elapsed_secs: f64,
}

impl AnalyzeSummary {
    fn record(&mut self, report: &FrameReport) {
        self.frames += 1;
        if report.label.is_some() {
            self.detections += 1;
        }
        if let Some(count) = report.rep_count {
            self.rep_count = count;
        }
        self.total_preprocess += report.speed.preprocess.unwrap_or(0.0);
        self.total_inference += report.speed.inference.unwrap_or(0.0);
        self.total_postprocess += report.speed.postprocess.unwrap_or(0.0);
    }

    /// Mean per-frame timings `(preprocess, inference, postprocess)` in ms.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_speed(&self) -> (f64, f64, f64) {
        let n = self.frames.max(1) as f64;
        (
            self.total_preprocess / n,
            self.total_inference / n,
            self.total_postprocess / n,
        )
    }

    /// Effective frames per second over the whole run.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fps(&self) -> f64 {
        if self.elapsed_secs > 0.0 {
            self.frames as f64 / self.elapsed_secs
        } else {
            0.0
        }
    }
}

/// Run the analyze command, exiting the process on failure.
pub fn run_analyze(args: &AnalyzeArgs) {
    if let Err(e) = analyze(args) {
        error!("{e}");
        process::exit(1);
    }
}

/// Load the session, replay the landmark stream and write one report per frame.
///
/// # Errors
///
/// Returns an error if an artifact is missing, the stream is malformed, a
/// classifier fails, or the reports cannot be written.
pub fn analyze(args: &AnalyzeArgs) -> Result<AnalyzeSummary> {
    let mode: Exercise = args
        .mode
        .parse()
        .map_err(|e: crate::exercise::ExerciseParseError| FormError::ConfigError(e.to_string()))?;

    let config = SessionConfig::new()
        .with_min_visibility(args.min_visibility)
        .with_knee_angle_min(args.knee_angle_min)
        .with_threads(args.threads);

    let paths = args.model_paths();
    let mut session = ExerciseSession::load(&paths, config)?;
    session.set_mode(mode);

    verbose!("Exercise Form {VERSION} 🚀 Rust ONNX CPU");
    for exercise in [Exercise::Plank, Exercise::Squat] {
        let classifier = session.classifier(exercise);
        verbose!(
            "{exercise} classifier: {} features, {} classes, labels {:?}",
            classifier.metadata().num_features(),
            classifier.num_classes(),
            classifier.metadata().label_mapping.values().collect::<Vec<_>>()
        );
    }
    if session.thresholds().is_none() {
        verbose!("squat thresholds unavailable; feet/knee verdicts will be unknown");
    }

    let source = Source::from(args.source.as_str());
    let frames = LandmarkSource::open(&source)?;

    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    let mut summary = AnalyzeSummary::default();
    let start = Instant::now();
    for frame in frames {
        let frame = frame?;
        if frame.reset {
            session.reset();
        }
        if let Some(mode) = frame.mode {
            session.set_mode(mode);
        }

        let report = session.process(frame.landmarks.as_ref())?;
        serde_json::to_writer(&mut writer, &report).map_err(|e| FormError::Io(e.into()))?;
        writeln!(writer)?;

        verbose!("frame {}: {}", report.frame, report.summary());
        summary.record(&report);
    }
    writer.flush()?;
    summary.elapsed_secs = start.elapsed().as_secs_f64();

    let (preprocess, inference, postprocess) = summary.mean_speed();
    section!("Summary ({source})");
    verbose!(
        "{} frames, {} with a detected pose, {} reps",
        summary.frames,
        summary.detections,
        summary.rep_count
    );
    verbose!(
        "Speed: {preprocess:.2}ms features, {inference:.2}ms inference, {postprocess:.2}ms analysis per frame ({:.1} FPS)",
        summary.fps()
    );
    if let Some(path) = &args.output {
        verbose!("Reports saved to {path}");
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormStatus;
    use crate::results::Speed;

    fn report(label: Option<&str>, rep_count: Option<u32>) -> FrameReport {
        FrameReport {
            frame: 0,
            mode: Exercise::Squat,
            label: label.map(str::to_string),
            probability: 0.9,
            form: FormStatus::Undetermined,
            feet: None,
            knee: None,
            lower_body_visible: None,
            standing: None,
            rep_state: None,
            rep_count,
            speed: Speed::new(1.0, 2.0, 3.0),
        }
    }

    #[test]
    fn test_summary_accumulates() {
        let mut summary = AnalyzeSummary::default();
        summary.record(&report(Some("down"), Some(0)));
        summary.record(&report(None, Some(0)));
        summary.record(&report(Some("up"), Some(1)));
        summary.elapsed_secs = 0.5;

        assert_eq!(summary.frames, 3);
        assert_eq!(summary.detections, 2);
        assert_eq!(summary.rep_count, 1);
        let (pre, inf, post) = summary.mean_speed();
        assert!((pre - 1.0).abs() < 1e-9);
        assert!((inf - 2.0).abs() < 1e-9);
        assert!((post - 3.0).abs() < 1e-9);
        assert!((summary.fps() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_summary() {
        let summary = AnalyzeSummary::default();
        assert!((summary.fps()).abs() < 1e-9);
        assert_eq!(summary.mean_speed(), (0.0, 0.0, 0.0));
    }
}
