//! Simulated multi-step demo playback.
//!
//! A [`PlaybackController`] wraps a [`StepSequencer`], which owns a
//! [`PlaybackSession`] and the single timer chain that advances it. Hosts
//! observe state through snapshot receivers and [`PlaybackEvent`]s.

pub mod controller;
pub mod error;
pub mod events;
pub mod sequencer;
pub mod session;
pub mod step;

pub use controller::{PlaybackController, PlaybackTiming};
pub use error::{InvalidReason, PlaybackError};
pub use events::PlaybackEvent;
pub use sequencer::StepSequencer;
pub use session::{PlaybackAction, PlaybackPhase, PlaybackSession};
pub use step::{Step, StepDefinition, StepStatus};
