//! Playback session state and its transition function.
//!
//! The session is a small state machine (`Idle`, `Running { step }`,
//! `Complete`) whose only mutation path is [`PlaybackSession::apply`]. Timers
//! live outside this module and feed `Tick` actions in, so every transition
//! can be exercised synchronously in tests.

use serde::Serialize;
use std::time::Duration;

use super::error::PlaybackError;
use super::events::PlaybackEvent;
use super::step::{saturating_total, validate_definitions, Step, StepDefinition, StepStatus};

/// Phase of the playback state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum PlaybackPhase {
    Idle,
    Running { step: usize },
    Complete,
}

/// Input to the transition function
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackAction {
    /// Begin a run from step 0. Ignored while running; clears a completed
    /// session first.
    Start,
    /// Wall-clock time elapsed since the previous tick
    Tick(Duration),
    /// Return to idle
    Reset,
}

/// Full runtime state of one playback engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSession {
    steps: Vec<Step>,
    phase: PlaybackPhase,
    total_elapsed: Duration,
    run_id: u64,
}

impl PlaybackSession {
    /// Build an idle session from an ordered step list
    pub fn new(definitions: &[StepDefinition]) -> Result<Self, PlaybackError> {
        validate_definitions(definitions)?;
        Ok(Self {
            steps: definitions.iter().map(Step::from_definition).collect(),
            phase: PlaybackPhase::Idle,
            total_elapsed: Duration::ZERO,
            run_id: 0,
        })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    /// Index of the step being processed, or of the last step once complete.
    /// `None` while idle.
    pub fn current_step_index(&self) -> Option<usize> {
        match self.phase {
            PlaybackPhase::Idle => None,
            PlaybackPhase::Running { step } => Some(step),
            PlaybackPhase::Complete => Some(self.steps.len() - 1),
        }
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.current_step_index().and_then(|i| self.steps.get(i))
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, PlaybackPhase::Running { .. })
    }

    pub fn is_idle(&self) -> bool {
        self.phase == PlaybackPhase::Idle
    }

    /// True iff every step has completed
    pub fn is_complete(&self) -> bool {
        self.steps.iter().all(|s| s.status == StepStatus::Complete)
    }

    pub fn total_elapsed(&self) -> Duration {
        self.total_elapsed
    }

    /// Number of runs started so far. Also identifies the current run.
    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    /// Sum of the nominal durations of all steps
    pub fn nominal_total(&self) -> Duration {
        saturating_total(self.steps.iter().map(|s| s.nominal_duration))
    }

    /// Overall progress across all steps, weighted by nominal duration
    pub fn overall_percent(&self) -> f64 {
        let total = self.nominal_total().as_secs_f64();
        if total <= 0.0 {
            return 0.0;
        }
        let done: f64 = self
            .steps
            .iter()
            .map(|s| s.nominal_duration.as_secs_f64() * s.progress_percent / 100.0)
            .sum();
        (done / total * 100.0).min(100.0)
    }

    /// Apply one action and return the lifecycle events it produced
    pub fn apply(&mut self, action: PlaybackAction) -> Vec<PlaybackEvent> {
        match action {
            PlaybackAction::Start => self.start(),
            PlaybackAction::Tick(elapsed) => self.tick(elapsed),
            PlaybackAction::Reset => self.reset(),
        }
    }

    fn start(&mut self) -> Vec<PlaybackEvent> {
        if self.is_running() {
            return Vec::new();
        }

        self.clear();
        self.run_id += 1;
        self.phase = PlaybackPhase::Running { step: 0 };
        self.steps[0].status = StepStatus::Processing;

        vec![
            PlaybackEvent::Started {
                run_id: self.run_id,
            },
            PlaybackEvent::StepStarted {
                run_id: self.run_id,
                index: 0,
            },
        ]
    }

    fn tick(&mut self, elapsed: Duration) -> Vec<PlaybackEvent> {
        let PlaybackPhase::Running { step } = self.phase else {
            return Vec::new();
        };

        self.total_elapsed += elapsed;
        if !self.steps[step].advance(elapsed) {
            return Vec::new();
        }

        self.steps[step].status = StepStatus::Complete;
        let mut events = vec![PlaybackEvent::StepCompleted {
            run_id: self.run_id,
            index: step,
        }];

        let next = step + 1;
        if next < self.steps.len() {
            self.phase = PlaybackPhase::Running { step: next };
            self.steps[next].status = StepStatus::Processing;
            events.push(PlaybackEvent::StepStarted {
                run_id: self.run_id,
                index: next,
            });
        } else {
            self.phase = PlaybackPhase::Complete;
            events.push(PlaybackEvent::Completed {
                run_id: self.run_id,
                total_elapsed: self.total_elapsed,
            });
        }

        events
    }

    fn reset(&mut self) -> Vec<PlaybackEvent> {
        let already_idle = self.is_idle() && self.total_elapsed.is_zero();
        self.clear();
        if already_idle {
            Vec::new()
        } else {
            vec![PlaybackEvent::Reset]
        }
    }

    fn clear(&mut self) {
        for step in &mut self.steps {
            step.clear();
        }
        self.phase = PlaybackPhase::Idle;
        self.total_elapsed = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_session(durations: &[f64]) -> PlaybackSession {
        let defs: Vec<StepDefinition> = durations
            .iter()
            .enumerate()
            .map(|(i, d)| StepDefinition::new(format!("Step {}", i + 1), *d))
            .collect();
        PlaybackSession::new(&defs).unwrap()
    }

    fn tick_ms(session: &mut PlaybackSession, ms: u64) -> Vec<PlaybackEvent> {
        session.apply(PlaybackAction::Tick(Duration::from_millis(ms)))
    }

    /// Checks that statuses are complete..processing..pending around the cursor
    fn assert_exclusive(session: &PlaybackSession) {
        let processing = session
            .steps()
            .iter()
            .filter(|s| s.status == StepStatus::Processing)
            .count();
        assert!(processing <= 1);

        if let PlaybackPhase::Running { step } = session.phase() {
            for (i, s) in session.steps().iter().enumerate() {
                let expected = match i.cmp(&step) {
                    std::cmp::Ordering::Less => StepStatus::Complete,
                    std::cmp::Ordering::Equal => StepStatus::Processing,
                    std::cmp::Ordering::Greater => StepStatus::Pending,
                };
                assert_eq!(s.status, expected, "step {} during step {}", i, step);
                if i > step {
                    assert_eq!(s.progress_percent, 0.0);
                }
            }
        }
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = make_session(&[1.0, 2.0]);
        assert!(session.is_idle());
        assert!(!session.is_running());
        assert!(!session.is_complete());
        assert_eq!(session.current_step_index(), None);
        assert_eq!(session.total_elapsed(), Duration::ZERO);
        assert!(session
            .steps()
            .iter()
            .all(|s| s.status == StepStatus::Pending && s.progress_percent == 0.0));
    }

    #[test]
    fn test_new_session_rejects_empty_list() {
        assert!(PlaybackSession::new(&[]).is_err());
    }

    #[test]
    fn test_start_marks_first_step_processing() {
        let mut session = make_session(&[1.0, 2.0]);
        let events = session.apply(PlaybackAction::Start);

        assert_eq!(
            events,
            vec![
                PlaybackEvent::Started { run_id: 1 },
                PlaybackEvent::StepStarted {
                    run_id: 1,
                    index: 0
                },
            ]
        );
        assert!(session.is_running());
        assert_eq!(session.current_step_index(), Some(0));
        assert_eq!(session.steps()[0].status, StepStatus::Processing);
        assert_exclusive(&session);
    }

    #[test]
    fn test_start_while_running_is_noop() {
        let mut session = make_session(&[1.0]);
        session.apply(PlaybackAction::Start);
        tick_ms(&mut session, 300);
        let before = session.clone();

        let events = session.apply(PlaybackAction::Start);
        assert!(events.is_empty());
        assert_eq!(session, before);
    }

    #[test]
    fn test_full_run_progresses_monotonically_and_completes() {
        let mut session = make_session(&[0.5, 1.0, 0.3]);
        session.apply(PlaybackAction::Start);

        let mut last_index = 0;
        let mut last_progress = 0.0;
        let mut completions = 0;

        for _ in 0..100 {
            let events = tick_ms(&mut session, 100);
            completions += events.iter().filter(|e| e.is_completion()).count();
            assert_exclusive(&session);

            if let Some(index) = session.current_step_index() {
                assert!(index == last_index || index == last_index + 1);
                if index == last_index && session.is_running() {
                    assert!(session.steps()[index].progress_percent >= last_progress);
                }
                if index != last_index {
                    assert_eq!(session.steps()[last_index].progress_percent, 100.0);
                }
                last_progress = session.steps()[index].progress_percent;
                last_index = index;
            }
        }

        assert_eq!(completions, 1);
        assert!(session.is_complete());
        assert!(!session.is_running());
        assert_eq!(session.phase(), PlaybackPhase::Complete);
        assert!(session
            .steps()
            .iter()
            .all(|s| s.progress_percent == 100.0 && s.status == StepStatus::Complete));
        assert_eq!(session.total_elapsed(), Duration::from_millis(1800));
    }

    #[test]
    fn test_ticks_after_completion_are_ignored() {
        let mut session = make_session(&[0.2]);
        session.apply(PlaybackAction::Start);
        tick_ms(&mut session, 100);
        tick_ms(&mut session, 100);
        assert!(session.is_complete());

        let before = session.clone();
        assert!(tick_ms(&mut session, 100).is_empty());
        assert_eq!(session, before);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut session = make_session(&[1.0, 1.0]);
        session.apply(PlaybackAction::Start);
        tick_ms(&mut session, 500);

        assert_eq!(session.apply(PlaybackAction::Reset), vec![PlaybackEvent::Reset]);
        let once = session.clone();
        assert!(session.apply(PlaybackAction::Reset).is_empty());
        assert!(session.apply(PlaybackAction::Reset).is_empty());
        assert_eq!(session, once);

        assert!(session.is_idle());
        assert_eq!(session.current_step_index(), None);
        assert_eq!(session.total_elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_start_after_complete_restarts_fresh() {
        let mut session = make_session(&[0.1]);
        session.apply(PlaybackAction::Start);
        tick_ms(&mut session, 100);
        assert!(session.is_complete());

        let events = session.apply(PlaybackAction::Start);
        assert_eq!(events[0], PlaybackEvent::Started { run_id: 2 });
        assert_eq!(session.steps()[0].progress_percent, 0.0);
        assert_eq!(session.total_elapsed(), Duration::ZERO);
        assert!(session.is_running());
    }

    #[test]
    fn test_new_rejects_steps_whose_total_overflows() {
        let defs = vec![StepDefinition::new("A", 1e19), StepDefinition::new("B", 1e19)];
        assert!(PlaybackSession::new(&defs).is_err());

        let defs = vec![StepDefinition::new("A", 1e20)];
        assert!(PlaybackSession::new(&defs).is_err());
    }

    #[test]
    fn test_overall_percent_weighted_by_duration() {
        let mut session = make_session(&[1.0, 3.0]);
        assert_eq!(session.overall_percent(), 0.0);

        session.apply(PlaybackAction::Start);
        tick_ms(&mut session, 1000);
        assert!((session.overall_percent() - 25.0).abs() < 1e-6);
    }
}
