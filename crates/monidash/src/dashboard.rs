//! Dashboard state and main event loop.
//!
//! The dashboard holds the latest [`BuildUpdate`] and redraws the whole
//! screen after every event. Two producers feed it: the terminal event
//! poller and the build fetcher. Each wake handles exactly one event from
//! either source and then redraws once.

use crate::compositor::draw_build;
use crate::fetcher::UpdateError;
use crate::geometry::Size;
use crate::grid::{layout_grid, LayoutError};
use crate::terminal::{CellDrawer, ScreenSize, TerminalEvent};
use crate::{Build, BuildUpdate};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::Color;
use std::io;
use thiserror::Error;
use tokio::sync::mpsc;

/// Smallest box a build is drawn in.
pub const DEFAULT_MIN_BOX_SIZE: Size = Size::new(30, 5);

/// Gap between boxes and around the grid.
pub const DEFAULT_PADDING: u16 = 1;

/// Screen row used for the error line.
pub const ERROR_ROW: u16 = 3;

/// Anything that replaces the build grid with an error line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Update(#[from] UpdateError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Lifecycle of the dashboard. `Terminated` is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardState {
    Initializing,
    Running,
    Terminated,
}

/// Why the event loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    /// Escape was pressed.
    Escape,
    /// `q` or Ctrl-C was pressed.
    Quit,
    /// The terminal driver reported an error.
    TerminalError(String),
    /// The fetcher stopped publishing updates.
    UpdatesClosed,
    /// The terminal event poller stopped.
    EventsClosed,
}

/// Grid geometry used on every redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardConfig {
    pub min_box_size: Size,
    pub padding: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            min_box_size: DEFAULT_MIN_BOX_SIZE,
            padding: DEFAULT_PADDING,
        }
    }
}

/// Build status dashboard.
#[derive(Debug)]
pub struct Dashboard {
    config: DashboardConfig,
    state: DashboardState,
    /// Builds from the latest update.
    builds: Vec<Build>,
    /// Error from the latest update.
    error: Option<UpdateError>,
    /// Layout failure from the last redraw, recomputed every redraw.
    layout_error: Option<LayoutError>,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            state: DashboardState::Initializing,
            builds: Vec::new(),
            error: None,
            layout_error: None,
        }
    }

    pub fn state(&self) -> DashboardState {
        self.state
    }

    pub fn builds(&self) -> &[Build] {
        &self.builds
    }

    /// The error currently shown instead of the grid, if any.
    pub fn current_error(&self) -> Option<DashboardError> {
        self.error
            .clone()
            .map(DashboardError::from)
            .or_else(|| self.layout_error.clone().map(DashboardError::from))
    }

    /// Replaces the current builds and error with `update`.
    pub fn apply_update(&mut self, update: BuildUpdate) {
        if let Some(error) = &update.error {
            tracing::debug!("update carries error: {error}");
        }
        self.builds = update.builds;
        self.error = update.error;
    }

    /// Reacts to a terminal event, returning an exit reason if the loop
    /// should stop.
    pub fn handle_event(&mut self, event: TerminalEvent) -> Option<ExitReason> {
        match event {
            TerminalEvent::Key(key) => exit_for_key(key),
            TerminalEvent::Resize(width, height) => {
                tracing::debug!(width, height, "terminal resized");
                None
            }
            TerminalEvent::Error(message) => Some(ExitReason::TerminalError(message)),
        }
    }

    /// Repaints the whole screen and flushes once.
    ///
    /// With no error the builds are laid out and drawn; otherwise, or when
    /// the layout does not fit, a single error line is drawn instead.
    pub fn redraw<D: CellDrawer + ?Sized>(&mut self, drawer: &mut D, screen: Size) -> io::Result<()> {
        clear_screen(drawer, screen);

        self.layout_error = None;
        if self.error.is_none() {
            match layout_grid(
                self.config.min_box_size,
                self.builds.len(),
                self.config.padding,
                screen,
            ) {
                Ok(layout) => {
                    for (build, bounds) in self.builds.iter().zip(&layout.boxes) {
                        draw_build(build, *bounds, drawer);
                    }
                }
                Err(e) => {
                    tracing::debug!("cannot lay out {} builds: {e}", self.builds.len());
                    self.layout_error = Some(e);
                }
            }
        }

        if let Some(error) = self.current_error() {
            draw_error(drawer, &error, screen);
        }

        drawer.flush()
    }

    /// Runs the event loop until a quit key, a terminal error, or a closed
    /// channel.
    ///
    /// Draws once before waiting for the first event. The caller owns the
    /// terminal for the duration of the call.
    pub async fn run<D>(
        &mut self,
        drawer: &mut D,
        events: &mut mpsc::Receiver<TerminalEvent>,
        updates: &mut mpsc::Receiver<BuildUpdate>,
    ) -> io::Result<ExitReason>
    where
        D: CellDrawer + ScreenSize,
    {
        let result = self.event_loop(drawer, events, updates).await;
        self.state = DashboardState::Terminated;
        match &result {
            Ok(reason) => tracing::info!(?reason, "dashboard stopped"),
            Err(e) => tracing::error!("dashboard stopped on terminal error: {e}"),
        }
        result
    }

    async fn event_loop<D>(
        &mut self,
        drawer: &mut D,
        events: &mut mpsc::Receiver<TerminalEvent>,
        updates: &mut mpsc::Receiver<BuildUpdate>,
    ) -> io::Result<ExitReason>
    where
        D: CellDrawer + ScreenSize,
    {
        let screen = drawer.screen_size()?;
        self.redraw(drawer, screen)?;
        self.state = DashboardState::Running;
        tracing::debug!("dashboard running");

        loop {
            let exit = tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => Some(ExitReason::EventsClosed),
                },
                update = updates.recv() => match update {
                    Some(update) => {
                        self.apply_update(update);
                        None
                    }
                    None => Some(ExitReason::UpdatesClosed),
                },
            };

            if let Some(reason) = exit {
                return Ok(reason);
            }

            let screen = drawer.screen_size()?;
            self.redraw(drawer, screen)?;
        }
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

fn exit_for_key(key: KeyEvent) -> Option<ExitReason> {
    match key.code {
        KeyCode::Esc => Some(ExitReason::Escape),
        KeyCode::Char('q') => Some(ExitReason::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(ExitReason::Quit)
        }
        _ => None,
    }
}

/// Writes a blank cell to every position on screen.
fn clear_screen<D: CellDrawer + ?Sized>(drawer: &mut D, screen: Size) {
    for y in 0..screen.height {
        for x in 0..screen.width {
            drawer.set_cell(x, y, ' ', Color::Reset, Color::Reset);
        }
    }
}

/// Writes `Error: <message>` on the error row, clipped to the screen.
fn draw_error<D: CellDrawer + ?Sized>(drawer: &mut D, error: &DashboardError, screen: Size) {
    if ERROR_ROW >= screen.height {
        return;
    }
    let text = format!("Error: {error}");
    for (x, symbol) in text.chars().enumerate().take(usize::from(screen.width)) {
        drawer.set_cell(x as u16, ERROR_ROW, symbol, Color::White, Color::Black);
    }
}
