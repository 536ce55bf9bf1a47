use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::demos::DemoDefinition;
use crate::playback::{PlaybackController, PlaybackEvent, PlaybackSession, PlaybackTiming};
use crate::seen::{intro_key, SeenStore};
use crate::ui::{command_for_key, PlayerCommand, PlayerView, TerminalGuard};

/// Interactive terminal player for one demo
pub struct App {
    config: Config,
    demo: DemoDefinition,
    controller: PlaybackController,
    snapshots: watch::Receiver<PlaybackSession>,
    events: mpsc::UnboundedReceiver<PlaybackEvent>,
    seen: Box<dyn SeenStore>,
    show_help: bool,
    completed_runs: u32,
    should_quit: bool,
}

impl App {
    /// Build the player. Fails if the demo's steps are not playable.
    pub fn new(config: Config, demo: DemoDefinition, seen: Box<dyn SeenStore>) -> Result<Self> {
        let (tx, events) = mpsc::unbounded_channel();
        let controller = PlaybackController::new(&demo.steps, PlaybackTiming::from(&config.playback))?
            .with_event_sender(tx);
        let snapshots = controller.subscribe();

        // First visit to a demo opens the help overlay
        let show_help = !seen.has_seen(&intro_key(&demo.key));

        Ok(Self {
            config,
            demo,
            controller,
            snapshots,
            events,
            seen,
            show_help,
            completed_runs: 0,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let _guard = TerminalGuard::new()?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;

        info!(demo = %self.demo.key, "Player opened");
        self.controller.set_active(true);

        let tick_rate = Duration::from_millis(self.config.ui.refresh_rate_ms);

        while !self.should_quit {
            self.drain_events();

            let session = self.snapshots.borrow_and_update().clone();
            terminal.draw(|f| {
                PlayerView {
                    demo: &self.demo,
                    session: &session,
                    active: self.controller.is_active(),
                    show_help: self.show_help,
                }
                .render(f)
            })?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        if let Some(command) = command_for_key(key.code) {
                            self.handle_command(command)?;
                        }
                    }
                }
            }
        }

        self.controller.set_active(false);
        info!(
            demo = %self.demo.key,
            completed_runs = self.completed_runs,
            "Player closed"
        );
        Ok(())
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            if let PlaybackEvent::Completed { run_id, .. } = event {
                self.completed_runs += 1;
                debug!(run_id, "Results panel revealed");
            }
        }
    }

    fn handle_command(&mut self, command: PlayerCommand) -> Result<()> {
        match command {
            PlayerCommand::ToggleActive => {
                let active = !self.controller.is_active();
                self.controller.set_active(active);
            }
            PlayerCommand::Start => {
                self.controller.on_request_start();
            }
            PlayerCommand::Reset => self.controller.on_request_reset(),
            PlayerCommand::ToggleHelp => {
                if self.show_help {
                    self.dismiss_help();
                } else {
                    self.show_help = true;
                }
            }
            PlayerCommand::Quit => {
                if self.show_help {
                    self.dismiss_help();
                } else {
                    self.should_quit = true;
                }
            }
        }
        Ok(())
    }

    fn dismiss_help(&mut self) {
        self.show_help = false;
        if let Err(e) = self.seen.mark_seen(&intro_key(&self.demo.key)) {
            warn!("Failed to record intro as seen: {:#}", e);
        }
    }
}
