//! Terminal driver boundary.
//!
//! The dashboard core only ever talks to the screen through [`CellDrawer`]
//! (set one cell, flush) and asks for the live size through [`ScreenSize`].
//! [`RatatuiDrawer`] implements both over any ratatui backend, and
//! [`TerminalGuard`] owns raw mode + the alternate screen for the lifetime of
//! the dashboard.

use crate::geometry::Size;
use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures::StreamExt;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::style::Color;
use ratatui::Terminal;
use std::io::{self, stdout, Stdout};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Capacity of the terminal event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 10;

/// Write access to terminal cells.
pub trait CellDrawer {
    /// Sets the rune and colour pair of the cell at `(x, y)`.
    fn set_cell(&mut self, x: u16, y: u16, symbol: char, fg: Color, bg: Color);

    /// Pushes all pending cell writes to the screen.
    fn flush(&mut self) -> io::Result<()>;
}

/// Source of the current screen dimensions.
pub trait ScreenSize {
    fn screen_size(&self) -> io::Result<Size>;
}

/// A pending cell write, buffered until the next flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingCell {
    x: u16,
    y: u16,
    symbol: char,
    fg: Color,
    bg: Color,
}

/// [`CellDrawer`] over a ratatui [`Terminal`].
///
/// Cell writes are buffered and applied inside a single `Terminal::draw`
/// call on flush, so ratatui's diffing keeps terminal output minimal.
pub struct RatatuiDrawer<B: Backend> {
    terminal: Terminal<B>,
    pending: Vec<PendingCell>,
}

impl<B: Backend> RatatuiDrawer<B> {
    pub fn new(backend: B) -> io::Result<Self> {
        Ok(Self {
            terminal: Terminal::new(backend)?,
            pending: Vec::new(),
        })
    }

    /// Borrow the wrapped terminal (used by tests to inspect the backend).
    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }
}

impl<B: Backend> CellDrawer for RatatuiDrawer<B> {
    fn set_cell(&mut self, x: u16, y: u16, symbol: char, fg: Color, bg: Color) {
        self.pending.push(PendingCell {
            x,
            y,
            symbol,
            fg,
            bg,
        });
    }

    fn flush(&mut self) -> io::Result<()> {
        let pending = std::mem::take(&mut self.pending);
        self.terminal.draw(|frame| {
            let area = frame.area();
            let buffer = frame.buffer_mut();
            for cell in &pending {
                if cell.x >= area.right() || cell.y >= area.bottom() {
                    continue;
                }
                if let Some(target) = buffer.cell_mut((cell.x, cell.y)) {
                    target.set_char(cell.symbol).set_fg(cell.fg).set_bg(cell.bg);
                }
            }
        })?;
        Ok(())
    }
}

impl<B: Backend> ScreenSize for RatatuiDrawer<B> {
    fn screen_size(&self) -> io::Result<Size> {
        Ok(self.terminal.size()?.into())
    }
}

/// Scoped ownership of the real terminal.
///
/// Creating the guard enables raw mode and switches to the alternate
/// screen; dropping it restores both. A panic hook restores the terminal
/// before the panic message is printed so it stays readable.
pub struct TerminalGuard {
    drawer: RatatuiDrawer<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    pub fn acquire() -> io::Result<Self> {
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = restore_terminal();
            original_hook(panic_info);
        }));

        setup_terminal()?;
        let drawer = match RatatuiDrawer::new(CrosstermBackend::new(stdout())) {
            Ok(drawer) => drawer,
            Err(e) => {
                let _ = restore_terminal();
                return Err(e);
            }
        };
        tracing::debug!("terminal acquired");
        Ok(Self { drawer })
    }

    pub fn drawer(&mut self) -> &mut RatatuiDrawer<CrosstermBackend<Stdout>> {
        &mut self.drawer
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = restore_terminal() {
            tracing::warn!("failed to restore terminal: {e}");
        } else {
            tracing::debug!("terminal released");
        }
    }
}

/// Enables raw mode and switches to the alternate screen.
fn setup_terminal() -> io::Result<()> {
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    Ok(())
}

/// Restores the terminal to its original state.
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;
    Ok(())
}

/// Terminal input the dashboard reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalEvent {
    /// A key was pressed.
    Key(KeyEvent),
    /// Terminal was resized.
    Resize(u16, u16),
    /// The terminal driver failed; the dashboard shuts down.
    Error(String),
}

impl TerminalEvent {
    /// Maps a crossterm event, dropping the kinds the dashboard ignores.
    pub fn from_crossterm(event: CrosstermEvent) -> Option<Self> {
        match event {
            CrosstermEvent::Key(key) if key.kind != KeyEventKind::Release => {
                Some(TerminalEvent::Key(key))
            }
            CrosstermEvent::Resize(w, h) => Some(TerminalEvent::Resize(w, h)),
            // Mouse, focus, paste and key releases
            _ => None,
        }
    }
}

/// Forwards crossterm input onto `tx` from a background task.
///
/// The task ends after forwarding a driver error, when the event stream
/// ends, or when the receiver is dropped.
pub fn spawn_event_poller(tx: mpsc::Sender<TerminalEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = EventStream::new();
        while let Some(event) = reader.next().await {
            let event = match event {
                Ok(event) => match TerminalEvent::from_crossterm(event) {
                    Some(event) => event,
                    None => continue,
                },
                Err(e) => {
                    let _ = tx.send(TerminalEvent::Error(e.to_string())).await;
                    return;
                }
            };
            if tx.send(event).await.is_err() {
                return;
            }
        }
        tracing::debug!("terminal event stream ended");
    })
}
