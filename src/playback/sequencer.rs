//! Step sequencer: drives a playback session with a single cancellable timer.
//!
//! All state lives behind one `std::sync::Mutex` that is never held across an
//! `.await`. The timer task and the delayed-start task both re-check their
//! cancellation token and the session's run id under that lock before
//! mutating anything, so a superseded chain cannot leak ticks into a newer
//! run or into a session that has been reset.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use super::error::PlaybackError;
use super::events::PlaybackEvent;
use super::session::{PlaybackAction, PlaybackSession};
use super::step::StepDefinition;

/// Default interval between progress ticks
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

struct Shared {
    session: PlaybackSession,
    /// Token for the timer chain of the current run
    run_token: Option<CancellationToken>,
    /// Token for a start scheduled with `start_after`
    pending_start: Option<CancellationToken>,
    snapshot_tx: watch::Sender<PlaybackSession>,
    event_tx: Option<mpsc::UnboundedSender<PlaybackEvent>>,
}

impl Shared {
    fn apply(&mut self, action: PlaybackAction) {
        let events = self.session.apply(action);
        self.snapshot_tx.send_replace(self.session.clone());

        for event in events {
            match &event {
                PlaybackEvent::Completed {
                    run_id,
                    total_elapsed,
                } => info!(run_id, elapsed = ?total_elapsed, "Playback complete"),
                PlaybackEvent::StepStarted { run_id, index } => {
                    debug!(run_id, step = index, "Step started")
                }
                PlaybackEvent::StepCompleted { run_id, index } => {
                    debug!(run_id, step = index, "Step complete")
                }
                _ => {}
            }
            if let Some(tx) = &self.event_tx {
                if tx.send(event).is_err() {
                    trace!("Playback event receiver dropped");
                }
            }
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(token) = self.run_token.take() {
            token.cancel();
        }
    }

    fn cancel_pending_start(&mut self) -> bool {
        match self.pending_start.take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}

struct Core {
    shared: Mutex<Shared>,
    tick_interval: Duration,
}

impl Core {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a fresh run. Caller holds the lock.
    fn start_locked(self: &Arc<Self>, shared: &mut Shared) -> u64 {
        shared.cancel_timer();
        if shared.session.is_running() {
            debug!(
                run_id = shared.session.run_id(),
                "Restarting playback, cancelling active run"
            );
            shared.apply(PlaybackAction::Reset);
        }
        shared.apply(PlaybackAction::Start);

        let run_id = shared.session.run_id();
        let token = CancellationToken::new();
        shared.run_token = Some(token.clone());

        info!(run_id, steps = shared.session.steps().len(), "Playback started");
        tokio::spawn(drive_run(
            Arc::downgrade(self),
            token,
            run_id,
            self.tick_interval,
        ));
        run_id
    }
}

/// Timer chain for one run. Exits on cancellation, completion, or once the
/// sequencer has been dropped.
async fn drive_run(core: Weak<Core>, token: CancellationToken, run_id: u64, tick: Duration) {
    let mut interval = tokio::time::interval_at(Instant::now() + tick, tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                trace!(run_id, "Timer chain cancelled");
                return;
            }
            _ = interval.tick() => {}
        }

        let Some(core) = core.upgrade() else {
            return;
        };
        let mut shared = core.lock();
        if token.is_cancelled() || shared.session.run_id() != run_id {
            return;
        }

        shared.apply(PlaybackAction::Tick(tick));
        if !shared.session.is_running() {
            shared.run_token = None;
            return;
        }
    }
}

/// Owns one playback session and the timer chain that advances it
pub struct StepSequencer {
    core: Arc<Core>,
}

impl StepSequencer {
    /// Build an idle sequencer for an ordered list of step definitions
    pub fn new(
        definitions: &[StepDefinition],
        tick_interval: Duration,
    ) -> Result<Self, PlaybackError> {
        let session = PlaybackSession::new(definitions)?;
        let (snapshot_tx, _) = watch::channel(session.clone());
        let tick_interval = if tick_interval.is_zero() {
            DEFAULT_TICK_INTERVAL
        } else {
            tick_interval
        };

        Ok(Self {
            core: Arc::new(Core {
                shared: Mutex::new(Shared {
                    session,
                    run_token: None,
                    pending_start: None,
                    snapshot_tx,
                    event_tx: None,
                }),
                tick_interval,
            }),
        })
    }

    /// Route lifecycle events to the given channel
    pub fn with_event_sender(self, tx: mpsc::UnboundedSender<PlaybackEvent>) -> Self {
        self.core.lock().event_tx = Some(tx);
        self
    }

    pub fn tick_interval(&self) -> Duration {
        self.core.tick_interval
    }

    /// Receiver that observes a fresh snapshot after every state change
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSession> {
        self.core.lock().snapshot_tx.subscribe()
    }

    /// Copy of the current session state
    pub fn snapshot(&self) -> PlaybackSession {
        self.core.lock().session.clone()
    }

    pub fn is_running(&self) -> bool {
        self.core.lock().session.is_running()
    }

    /// Begin a run from step 0 and return its run id.
    ///
    /// Does not block: progress is driven by a spawned task, so this must be
    /// called from within a tokio runtime. An active run is cancelled and
    /// discarded first.
    pub fn run_to_completion(&self) -> u64 {
        let mut shared = self.core.lock();
        shared.cancel_pending_start();
        self.core.start_locked(&mut shared)
    }

    /// Begin a run once `delay` has elapsed, unless cancelled first.
    /// Replaces any previously scheduled start.
    pub(crate) fn start_after(&self, delay: Duration) {
        let mut shared = self.core.lock();
        shared.cancel_pending_start();

        let token = CancellationToken::new();
        shared.pending_start = Some(token.clone());
        let core = Arc::downgrade(&self.core);
        debug!(delay = ?delay, "Playback start scheduled");

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }

            let Some(core) = core.upgrade() else {
                return;
            };
            let mut shared = core.lock();
            if token.is_cancelled() {
                return;
            }
            shared.pending_start = None;
            core.start_locked(&mut shared);
        });
    }

    /// Cancel a start scheduled with `start_after`. Returns true if one was
    /// pending.
    pub(crate) fn cancel_pending_start(&self) -> bool {
        self.core.lock().cancel_pending_start()
    }

    pub fn has_pending_start(&self) -> bool {
        self.core.lock().pending_start.is_some()
    }

    /// Cancel any in-flight timers and return to idle. Idempotent.
    pub fn reset(&self) {
        let mut shared = self.core.lock();
        shared.cancel_pending_start();
        shared.cancel_timer();
        shared.apply(PlaybackAction::Reset);
    }

    /// Wait until no run is in progress and return the final snapshot.
    /// Resolves immediately when idle or complete.
    pub async fn wait_for_completion(&self) -> PlaybackSession {
        let mut rx = self.subscribe();
        loop {
            {
                let session = rx.borrow_and_update();
                if !session.is_running() {
                    return session.clone();
                }
            }
            if rx.changed().await.is_err() {
                return self.snapshot();
            }
        }
    }
}

impl Drop for StepSequencer {
    fn drop(&mut self) {
        let mut shared = self.core.lock();
        shared.cancel_pending_start();
        shared.cancel_timer();
    }
}
