//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Mounts the [`AnimationDriver`] on start and unmounts it on exit
//! - Event loop (keyboard, resize)
//! - Redraws whenever the animation state changes
//!
//! # Keys
//!
//! | Key | Action |
//! |-----|--------|
//! | `q`, `Esc`, `Ctrl-C` | Quit |
//! | `p` | Pause / resume |
//! | `r` | Restart from the first step |

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Layout};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Terminal;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use console_core::{AnimationDriver, AnimationSnapshot, DriverPhase};

use crate::theme::{DIM_GRAY, HIGHLIGHT_ORANGE};
use crate::widgets::ConsoleView;

/// Minimum time between two frames
const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Cursor blink half-period
const CURSOR_BLINK: Duration = Duration::from_millis(530);

/// Main application state
pub struct App {
    // === Core State ===
    /// Is the app still running?
    running: bool,
    /// Stopped by the user with `p`
    paused: bool,

    // === Animation ===
    /// The mounted console
    driver: AnimationDriver,
    /// State change notifications
    rx: watch::Receiver<AnimationSnapshot>,
    /// Last observed state, drawn every frame
    snapshot: AnimationSnapshot,
    /// Prompt printed before commands
    prompt: String,

    // === Misc State ===
    /// Reference point for the cursor blink
    started_at: Instant,
}

impl App {
    /// Create a new App around an idle driver
    #[must_use]
    pub fn new(driver: AnimationDriver, prompt: impl Into<String>) -> Self {
        let rx = driver.subscribe();
        let snapshot = rx.borrow().clone();
        Self {
            running: true,
            paused: false,
            driver,
            rx,
            snapshot,
            prompt: prompt.into(),
            started_at: Instant::now(),
        }
    }

    /// The mounted driver
    #[must_use]
    pub fn driver(&self) -> &AnimationDriver {
        &self.driver
    }

    /// Whether the event loop should keep going
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the user paused the animation
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Main event loop
    ///
    /// Starts the animation, runs until the user quits, then stops it and
    /// waits for its task to exit.
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        // Mount
        self.driver.start();
        info!(steps = self.driver.catalog().len(), "Console mounted");

        // Create async event stream for non-blocking terminal events
        let mut event_stream = EventStream::new();

        // Render initial frame immediately so user sees UI
        self.render(terminal)?;

        while self.running {
            let frame_start = Instant::now();

            tokio::select! {
                biased;

                // Terminal events - highest priority
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        // Only handle Press events (not Release or Repeat)
                        Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                            self.handle_key(key);
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => warn!(error = %e, "Terminal event error"),
                        None => self.running = false,
                    }
                }

                // Animation state changed
                changed = self.rx.changed() => {
                    if changed.is_err() {
                        self.running = false;
                    }
                }

                // Cursor blink
                _ = tokio::time::sleep(CURSOR_BLINK) => {}
            }

            self.update();
            self.render(terminal)?;

            // Frame rate limiting
            let elapsed = frame_start.elapsed();
            if elapsed < FRAME_DURATION {
                tokio::time::sleep(FRAME_DURATION - elapsed).await;
            }
        }

        // Unmount
        self.driver.shutdown().await;
        info!(cycles = self.driver.cycles_started(), "Console unmounted");
        Ok(())
    }

    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            // Quit
            KeyCode::Esc | KeyCode::Char('q') => self.running = false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.running = false;
            }

            // Pause / resume
            KeyCode::Char('p') => {
                if self.paused {
                    self.driver.start();
                } else {
                    self.driver.stop();
                }
                self.paused = !self.paused;
                debug!(paused = self.paused, "Toggled pause");
            }

            // Restart
            KeyCode::Char('r') => {
                self.driver.stop();
                self.driver.start();
                self.paused = false;
                debug!("Restarted");
            }

            _ => {}
        }
    }

    /// Pull the latest state
    fn update(&mut self) {
        self.snapshot = self.rx.borrow_and_update().clone();
    }

    /// Whether the typing cursor is in its visible half-period
    fn cursor_visible(&self) -> bool {
        (self.started_at.elapsed().as_millis() / CURSOR_BLINK.as_millis()) % 2 == 0
    }

    /// Render the UI
    pub fn render<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        let show_cursor = self.cursor_visible();
        let status = self.status_line();

        terminal.draw(|frame| {
            let [console_area, status_area] =
                Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());

            frame.render_widget(
                ConsoleView::new(&self.snapshot, &self.prompt).show_cursor(show_cursor),
                console_area,
            );
            frame.render_widget(Paragraph::new(status), status_area);
        })?;

        Ok(())
    }

    /// Bottom status bar
    fn status_line(&self) -> Line<'static> {
        let dim = Style::default().fg(DIM_GRAY);
        let state = if self.paused {
            Span::styled("PAUSED", Style::default().fg(HIGHLIGHT_ORANGE))
        } else {
            Span::styled(phase_label(self.snapshot.phase), dim)
        };

        Line::from(vec![
            Span::styled(format!("cycle {} · ", self.driver.cycles_started()), dim),
            state,
            Span::styled(" · q quit  p pause  r restart", dim),
        ])
    }
}

/// Short label for the status bar
#[must_use]
pub fn phase_label(phase: DriverPhase) -> &'static str {
    match phase {
        DriverPhase::Idle => "idle",
        DriverPhase::WarmingUp => "starting",
        DriverPhase::Typing => "typing",
        DriverPhase::Delaying => "running",
        DriverPhase::AnimatingMenu => "menu",
        DriverPhase::Complete => "complete",
        DriverPhase::RestartPending => "replaying",
    }
}
