//! Monidash library
//!
//! A terminal dashboard for a remote build-status server. The server streams
//! newline-delimited JSON snapshots over TCP; each snapshot is parsed into a
//! sorted list of [`Build`]s and rendered as a grid of coloured boxes sized to
//! the current terminal.
//!
//! Data flows one way:
//! socket → [`fetcher`] → update channel → [`dashboard`] → [`grid`] +
//! [`compositor`] → [`terminal::CellDrawer`].

use ratatui::style::Color;
use std::fmt;

/// Cell compositing: decorators, label clipping, build boxes.
pub mod compositor;

/// TOML configuration loading.
pub mod config;

/// Event loop and redraw logic.
pub mod dashboard;

/// TCP connection, frame parsing and sorting.
pub mod fetcher;

/// Point, size and rect value types.
pub mod geometry;

/// Column-major grid layout.
pub mod grid;

/// Tracing subscriber initialisation.
pub mod logging;

/// Terminal driver boundary and crossterm/ratatui adapter.
pub mod terminal;

#[cfg(test)]
mod test_utils;

pub use fetcher::UpdateError;

/// xterm-256 palette index used for acknowledged builds.
pub const ORANGE_COLOUR: u8 = 167;

/// The state a build can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildState {
    /// Build is broken and nobody has claimed it.
    Failed,
    /// Build is broken and someone is looking at it.
    Acknowledged,
    /// Build is healthy.
    Passed,
    /// State could not be determined.
    Unknown,
}

impl BuildState {
    /// Background colour of the state swatch.
    pub fn bg_color(self) -> Color {
        match self {
            BuildState::Failed => Color::Red,
            BuildState::Acknowledged => Color::Indexed(ORANGE_COLOUR),
            BuildState::Passed => Color::Green,
            BuildState::Unknown => Color::Magenta,
        }
    }

    /// Text colour drawn over the state swatch.
    pub fn fg_color(self) -> Color {
        Color::White
    }
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BuildState::Failed => "failed",
            BuildState::Acknowledged => "acknowledged",
            BuildState::Passed => "passed",
            BuildState::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// A named CI build and its current status.
///
/// Builds are identified by name only and are replaced wholesale by every
/// update; nothing is carried over between snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Build {
    /// Display name of the build.
    pub name: String,
    /// State implied by the list the build arrived in.
    pub state: BuildState,
    /// Whether a run is in progress.
    pub building: bool,
    /// User who acknowledged the failure (may be empty).
    pub acknowledger: String,
}

impl Build {
    pub fn new(name: impl Into<String>, state: BuildState) -> Self {
        Self {
            name: name.into(),
            state,
            building: false,
            acknowledger: String::new(),
        }
    }
}

/// One result of the fetch loop: a full snapshot or an error.
///
/// A successful update always has `error == None`; a failed one always has
/// an empty build list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuildUpdate {
    /// Sorted builds from the latest frame.
    pub builds: Vec<Build>,
    /// Why this update carries no builds, if it failed.
    pub error: Option<UpdateError>,
}

impl BuildUpdate {
    /// A successful snapshot.
    pub fn builds(builds: Vec<Build>) -> Self {
        Self {
            builds,
            error: None,
        }
    }

    /// A failed fetch.
    pub fn failed(error: UpdateError) -> Self {
        Self {
            builds: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests;
