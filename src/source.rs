// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Recorded pose-estimator output.
//!
//! Landmarks arrive as JSON Lines, one frame per line:
//!
//! ```json
//! {"frame": 0, "landmarks": [{"x": 0.51, "y": 0.12, "z": -0.3, "visibility": 0.99}, ...]}
//! {"frame": 1, "landmarks": null}
//! {"mode": "squat", "reset": true, "landmarks": [...]}
//! ```
//!
//! `landmarks` holds the estimator's 33 points in MediaPipe order (at least
//! up to the right ankle); `null`, an empty list or a missing key marks a
//! frame without a detection. The optional `mode` and `reset` keys are
//! session commands applied before the frame is processed. Blank lines are
//! skipped.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{FormError, Result};
use crate::exercise::Exercise;
use crate::landmarks::{Landmark, LandmarkSet};

/// Where landmark records are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A JSON Lines file.
    File(PathBuf),
    /// Standard input.
    Stdin,
}

impl From<&str> for Source {
    fn from(s: &str) -> Self {
        if s == "-" {
            Self::Stdin
        } else {
            Self::File(PathBuf::from(s))
        }
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Self::from(path.to_string_lossy().as_ref())
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Stdin => write!(f, "<stdin>"),
        }
    }
}

/// On-disk shape of one record.
#[derive(Debug, Deserialize)]
struct FrameRecord {
    #[serde(default)]
    frame: Option<usize>,
    #[serde(default)]
    landmarks: Option<Vec<Landmark>>,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    reset: bool,
}

/// One decoded input frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceFrame {
    /// Line number in the input (1-based).
    pub line: usize,
    /// Frame index carried by the record, if any.
    pub frame_idx: Option<usize>,
    /// Tracked joints, or `None` when nothing was detected.
    pub landmarks: Option<LandmarkSet>,
    /// Mode to switch to before processing this frame.
    pub mode: Option<Exercise>,
    /// Reset the rep counter before processing this frame.
    pub reset: bool,
}

/// Iterator over the frames of a landmark stream.
pub struct LandmarkSource {
    lines: Lines<Box<dyn BufRead>>,
    line: usize,
}

impl LandmarkSource {
    /// Open a source for reading.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::ResourceNotFound`] if a file source does not exist.
    pub fn open(source: &Source) -> Result<Self> {
        let reader: Box<dyn BufRead> = match source {
            Source::File(path) => {
                if !path.exists() {
                    return Err(FormError::ResourceNotFound(path.clone()));
                }
                Box::new(BufReader::new(File::open(path)?))
            }
            Source::Stdin => Box::new(BufReader::new(io::stdin())),
        };
        Ok(Self::from_reader(reader))
    }

    /// Read records from any buffered reader.
    #[must_use]
    pub fn from_reader(reader: Box<dyn BufRead>) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }

    fn parse_line(&self, text: &str) -> Result<SourceFrame> {
        let record: FrameRecord = serde_json::from_str(text)
            .map_err(|e| FormError::SourceError(format!("line {}: {e}", self.line)))?;

        let landmarks = match record.landmarks.as_deref() {
            None | Some([]) => None,
            Some(points) => Some(
                LandmarkSet::from_mediapipe(points)
                    .map_err(|e| FormError::SourceError(format!("line {}: {e}", self.line)))?,
            ),
        };

        let mode = record
            .mode
            .map(|mode| {
                mode.parse::<Exercise>()
                    .map_err(|e| FormError::SourceError(format!("line {}: {e}", self.line)))
            })
            .transpose()?;

        Ok(SourceFrame {
            line: self.line,
            frame_idx: record.frame,
            landmarks,
            mode,
            reset: record.reset,
        })
    }
}

impl Iterator for LandmarkSource {
    type Item = Result<SourceFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let text = match self.lines.next()? {
                Ok(text) => text,
                Err(e) => return Some(Err(e.into())),
            };
            self.line += 1;
            if text.trim().is_empty() {
                continue;
            }
            return Some(self.parse_line(&text));
        }
    }
}

impl std::fmt::Debug for LandmarkSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LandmarkSource").field("line", &self.line).finish_non_exhaustive()
    }
}
