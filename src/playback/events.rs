//! Lifecycle events emitted by the playback engine

use std::time::Duration;

/// Event emitted on a playback lifecycle transition
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// A run began; step 0 is now processing
    Started { run_id: u64 },
    /// A step became the processing step
    StepStarted { run_id: u64, index: usize },
    /// A step reached 100% and is complete
    StepCompleted { run_id: u64, index: usize },
    /// Every step is complete. Fired exactly once per finished run.
    Completed { run_id: u64, total_elapsed: Duration },
    /// The session was returned to idle
    Reset,
}

impl PlaybackEvent {
    /// Run this event belongs to (`None` for resets)
    pub fn run_id(&self) -> Option<u64> {
        match self {
            PlaybackEvent::Started { run_id }
            | PlaybackEvent::StepStarted { run_id, .. }
            | PlaybackEvent::StepCompleted { run_id, .. }
            | PlaybackEvent::Completed { run_id, .. } => Some(*run_id),
            PlaybackEvent::Reset => None,
        }
    }

    pub fn is_completion(&self) -> bool {
        matches!(self, PlaybackEvent::Completed { .. })
    }
}
