//! Errors raised when building a playback engine

use thiserror::Error;

/// Why a step list was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidReason {
    /// The step list has no entries
    NoSteps,
    /// A step has a zero or negative nominal duration
    NonPositiveDuration { index: usize },
    /// A step's duration cannot be represented, or pushes the total
    /// past what a `Duration` holds
    DurationOutOfRange { index: usize },
    /// A step has an empty or whitespace-only title
    EmptyTitle { index: usize },
}

impl std::fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidReason::NoSteps => write!(f, "step list is empty"),
            InvalidReason::NonPositiveDuration { index } => {
                write!(f, "step {} has a non-positive duration", index)
            }
            InvalidReason::DurationOutOfRange { index } => {
                write!(f, "step {} has a duration out of range", index)
            }
            InvalidReason::EmptyTitle { index } => write!(f, "step {} has an empty title", index),
        }
    }
}

/// Errors specific to the playback engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("invalid playback configuration: {0}")]
    InvalidConfiguration(InvalidReason),
}
