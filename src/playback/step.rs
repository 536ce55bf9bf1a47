//! Step definitions and per-step runtime state

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::{InvalidReason, PlaybackError};

const PROGRESS_EPSILON: f64 = 1e-6;

/// Static description of one simulated processing step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    /// Short label shown on the step card
    pub title: String,
    /// Explanatory text shown while the step is processing
    #[serde(default)]
    pub description: String,
    /// Nominal wall-clock duration of the step, in seconds
    pub duration_secs: f64,
    /// Impact note revealed once the step completes
    #[serde(default)]
    pub impact: String,
}

impl StepDefinition {
    pub fn new(title: impl Into<String>, duration_secs: f64) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            duration_secs,
            impact: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_impact(mut self, impact: impl Into<String>) -> Self {
        self.impact = impact.into();
        self
    }

    /// Nominal duration as a `Duration`. Only meaningful after validation.
    pub fn nominal_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.duration_secs).unwrap_or(Duration::ZERO)
    }
}

/// Check an ordered step list before a session is built from it
pub fn validate_definitions(definitions: &[StepDefinition]) -> Result<(), PlaybackError> {
    if definitions.is_empty() {
        return Err(PlaybackError::InvalidConfiguration(InvalidReason::NoSteps));
    }

    let mut total = Duration::ZERO;
    for (index, def) in definitions.iter().enumerate() {
        if def.title.trim().is_empty() {
            return Err(PlaybackError::InvalidConfiguration(
                InvalidReason::EmptyTitle { index },
            ));
        }
        // NaN is not finite
        if !def.duration_secs.is_finite() || def.duration_secs <= 0.0 {
            return Err(PlaybackError::InvalidConfiguration(
                InvalidReason::NonPositiveDuration { index },
            ));
        }

        // Too large for a Duration, or so small it rounds to zero
        let duration = Duration::try_from_secs_f64(def.duration_secs)
            .ok()
            .filter(|d| !d.is_zero());
        total = match duration.and_then(|d| total.checked_add(d)) {
            Some(total) => total,
            None => {
                return Err(PlaybackError::InvalidConfiguration(
                    InvalidReason::DurationOutOfRange { index },
                ))
            }
        };
    }

    Ok(())
}

/// Sum of durations, saturating instead of panicking on overflow
pub(crate) fn saturating_total(durations: impl IntoIterator<Item = Duration>) -> Duration {
    durations
        .into_iter()
        .fold(Duration::ZERO, Duration::saturating_add)
}

/// Processing status of a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Processing,
    Complete,
}

impl StepStatus {
    /// Glyph used on step cards
    pub fn glyph(&self) -> &'static str {
        match self {
            StepStatus::Pending => "○",
            StepStatus::Processing => "◐",
            StepStatus::Complete => "●",
        }
    }
}

/// Runtime state of one step within a playback session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub title: String,
    pub description: String,
    pub nominal_duration: Duration,
    pub impact_note: String,
    /// Progress through the step, in `[0, 100]`
    pub progress_percent: f64,
    pub status: StepStatus,
}

impl Step {
    pub(crate) fn from_definition(def: &StepDefinition) -> Self {
        Self {
            title: def.title.clone(),
            description: def.description.clone(),
            nominal_duration: def.nominal_duration(),
            impact_note: def.impact.clone(),
            progress_percent: 0.0,
            status: StepStatus::Pending,
        }
    }

    /// Impact note, only once the step has completed
    pub fn visible_impact(&self) -> Option<&str> {
        if self.status == StepStatus::Complete && !self.impact_note.is_empty() {
            Some(&self.impact_note)
        } else {
            None
        }
    }

    pub(crate) fn clear(&mut self) {
        self.progress_percent = 0.0;
        self.status = StepStatus::Pending;
    }

    /// Advance progress by `elapsed` of wall-clock time. Returns true when the
    /// step has reached exactly 100.
    pub(crate) fn advance(&mut self, elapsed: Duration) -> bool {
        let total = self.nominal_duration.as_secs_f64();
        let delta = if total > 0.0 {
            elapsed.as_secs_f64() / total * 100.0
        } else {
            100.0
        };
        let next = self.progress_percent + delta;
        // Snap float drift so N equal ticks land on exactly 100
        self.progress_percent = if next >= 100.0 - PROGRESS_EPSILON {
            100.0
        } else {
            next
        };
        self.progress_percent >= 100.0
    }
}
