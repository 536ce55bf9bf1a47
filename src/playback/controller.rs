//! Playback controller: maps host activation and user controls onto the
//! step sequencer.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::debug;

use super::error::PlaybackError;
use super::events::PlaybackEvent;
use super::sequencer::{StepSequencer, DEFAULT_TICK_INTERVAL};
use super::session::PlaybackSession;
use super::step::StepDefinition;
use crate::config::PlaybackConfig;

/// Default pause between activation and the first tick
pub const DEFAULT_SETTLING_DELAY: Duration = Duration::from_millis(300);

/// Timing knobs for one controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackTiming {
    pub tick_interval: Duration,
    pub settling_delay: Duration,
    /// Start automatically when the host activates the widget
    pub auto_start: bool,
}

impl Default for PlaybackTiming {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            settling_delay: DEFAULT_SETTLING_DELAY,
            auto_start: true,
        }
    }
}

impl From<&PlaybackConfig> for PlaybackTiming {
    fn from(config: &PlaybackConfig) -> Self {
        Self {
            tick_interval: Duration::from_millis(config.tick_interval_ms),
            settling_delay: Duration::from_millis(config.settling_delay_ms),
            auto_start: config.auto_start,
        }
    }
}

/// Owns the auto-start policy for one demo widget
pub struct PlaybackController {
    sequencer: StepSequencer,
    settling_delay: Duration,
    auto_start: bool,
    active: bool,
}

impl PlaybackController {
    /// Build a controller for a step list. Fails with
    /// `InvalidConfiguration` for an empty list or a non-positive duration.
    pub fn new(
        definitions: &[StepDefinition],
        timing: PlaybackTiming,
    ) -> Result<Self, PlaybackError> {
        let sequencer = StepSequencer::new(definitions, timing.tick_interval)?;
        Ok(Self {
            sequencer,
            settling_delay: timing.settling_delay,
            auto_start: timing.auto_start,
            active: false,
        })
    }

    pub fn with_event_sender(mut self, tx: mpsc::UnboundedSender<PlaybackEvent>) -> Self {
        self.sequencer = self.sequencer.with_event_sender(tx);
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn settling_delay(&self) -> Duration {
        self.settling_delay
    }

    pub fn snapshot(&self) -> PlaybackSession {
        self.sequencer.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackSession> {
        self.sequencer.subscribe()
    }

    pub fn sequencer(&self) -> &StepSequencer {
        &self.sequencer
    }

    /// True while a run is in progress or about to start
    pub fn is_busy(&self) -> bool {
        self.sequencer.is_running() || self.sequencer.has_pending_start()
    }

    /// Forward the host's `is_active` signal
    pub fn set_active(&mut self, active: bool) {
        if active {
            self.on_activate();
        } else {
            self.on_deactivate();
        }
    }

    /// Host made the widget visible. Schedules a run after the settling
    /// delay when the session is idle.
    pub fn on_activate(&mut self) {
        self.active = true;
        if !self.auto_start {
            return;
        }

        let session = self.sequencer.snapshot();
        if !session.is_idle() || self.sequencer.has_pending_start() {
            debug!(
                phase = ?session.phase(),
                "Activation ignored, session not idle"
            );
            return;
        }

        self.sequencer.start_after(self.settling_delay);
    }

    /// Host hid the widget. An in-flight run is discarded so that the next
    /// activation starts from step 0; a completed session is kept.
    pub fn on_deactivate(&mut self) {
        self.active = false;
        self.sequencer.cancel_pending_start();
        if self.sequencer.is_running() {
            debug!("Deactivated mid-run, resetting playback");
            self.sequencer.reset();
        }
    }

    /// User pressed start/replay. Returns false if a run was already in
    /// progress.
    pub fn on_request_start(&mut self) -> bool {
        if self.sequencer.is_running() {
            debug!("Start requested while running, ignoring");
            return false;
        }

        if self.sequencer.snapshot().is_complete() {
            self.sequencer.reset();
        }
        self.sequencer.run_to_completion();
        true
    }

    /// User pressed reset. Safe at any time.
    pub fn on_request_reset(&mut self) {
        if self.sequencer.is_running() {
            debug!("Reset requested while running");
        }
        self.sequencer.reset();
    }
}
