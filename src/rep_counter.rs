// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Squat repetition counter.
//!
//! A rep is credited on the transition from a down stage to an up stage, and
//! only when the lower body is visible, the posture check confirms standing,
//! and the form analyzer judged both spacings correct on that frame. Losing
//! the lower body abandons the current cycle. The update is a pure function
//! of the previous state and the frame inputs.

use serde::Serialize;

/// Phase of the current repetition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RepState {
    #[default]
    None,
    Down,
    Up,
}

impl RepState {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Down => "down",
            Self::Up => "up",
        }
    }
}

impl std::fmt::Display for RepState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Counter state carried between frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RepCounterState {
    pub state: RepState,
    pub count: u32,
}

/// Stage label vocabularies, lower-cased once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageVocabulary {
    down: Vec<String>,
    up: Vec<String>,
}

impl StageVocabulary {
    #[must_use]
    pub fn new<S: AsRef<str>>(down: &[S], up: &[S]) -> Self {
        let lower = |labels: &[S]| -> Vec<String> {
            labels.iter().map(|l| l.as_ref().to_lowercase()).collect()
        };
        Self {
            down: lower(down),
            up: lower(up),
        }
    }

    /// True when the lower-cased label contains any down keyword.
    #[must_use]
    pub fn is_down(&self, label: &str) -> bool {
        let label = label.to_lowercase();
        self.down.iter().any(|keyword| label.contains(keyword.as_str()))
    }

    /// True when the lower-cased label contains any up keyword.
    #[must_use]
    pub fn is_up(&self, label: &str) -> bool {
        let label = label.to_lowercase();
        self.up.iter().any(|keyword| label.contains(keyword.as_str()))
    }

    #[must_use]
    pub fn down_labels(&self) -> &[String] {
        &self.down
    }

    #[must_use]
    pub fn up_labels(&self) -> &[String] {
        &self.up
    }
}

impl Default for StageVocabulary {
    fn default() -> Self {
        Self::new(&["down", "bottom"], &["up", "stand", "top"])
    }
}

/// Per-frame inputs to the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RepInputs<'a> {
    /// Stage classifier label, `None` when no pose was detected.
    pub label: Option<&'a str>,
    pub lower_body_visible: bool,
    pub standing_now: bool,
    /// Both form verdicts were `correct` on this frame.
    pub form_correct: bool,
}

impl RepCounterState {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: RepState::None,
            count: 0,
        }
    }

    /// Advance the counter by one frame.
    ///
    /// Losing sight of the lower body drops the cycle back to `None`. A frame
    /// without a label leaves the state untouched. A down label moves to `Down`
    /// unless already there; otherwise an up label while standing completes a
    /// rep from `Down` only if form was correct. The count never decreases.
    #[must_use]
    pub fn update(self, inputs: &RepInputs<'_>, vocabulary: &StageVocabulary) -> Self {
        if !inputs.lower_body_visible {
            return Self {
                state: RepState::None,
                ..self
            };
        }
        let Some(label) = inputs.label else {
            return self;
        };

        let is_down = vocabulary.is_down(label);
        let is_up = vocabulary.is_up(label) && inputs.standing_now;

        if is_down && self.state != RepState::Down {
            Self {
                state: RepState::Down,
                ..self
            }
        } else if is_up && self.state == RepState::Down && inputs.form_correct {
            Self {
                state: RepState::Up,
                count: self.count.saturating_add(1),
            }
        } else {
            self
        }
    }
}
