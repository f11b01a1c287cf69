//! Shared test utilities: a recording [`CellDrawer`], buffer and env helpers.

#![cfg(test)]

use crate::geometry::Size;
use crate::terminal::{CellDrawer, ScreenSize};
use crate::{Build, BuildState};
use ratatui::buffer::Buffer;
use ratatui::style::Color;
use std::collections::HashMap;
use std::io;

/// Extracts all text from a specific row in a ratatui buffer.
pub fn row_text(buffer: &Buffer, row: u16) -> String {
    let area = buffer.area();
    if row >= area.height {
        return String::new();
    }
    (0..area.width)
        .map(|col| {
            buffer
                .cell((col, row))
                .map(|cell| cell.symbol())
                .unwrap_or(" ")
        })
        .collect()
}

/// In-memory drawer that remembers the last write to every cell.
#[derive(Debug, Default)]
pub struct RecordingDrawer {
    pub size: Size,
    pub cells: HashMap<(u16, u16), (char, Color, Color)>,
    pub writes: usize,
    pub flushes: usize,
}

impl RecordingDrawer {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            size: Size::new(width, height),
            ..Self::default()
        }
    }

    pub fn symbol(&self, x: u16, y: u16) -> Option<char> {
        self.cells.get(&(x, y)).map(|(symbol, _, _)| *symbol)
    }

    pub fn bg(&self, x: u16, y: u16) -> Option<Color> {
        self.cells.get(&(x, y)).map(|(_, _, bg)| *bg)
    }

    pub fn fg(&self, x: u16, y: u16) -> Option<Color> {
        self.cells.get(&(x, y)).map(|(_, fg, _)| *fg)
    }

    /// Text of `row` between columns `from` (inclusive) and `to` (exclusive).
    pub fn row_text(&self, row: u16, from: u16, to: u16) -> String {
        (from..to)
            .map(|x| self.symbol(x, row).unwrap_or(' '))
            .collect()
    }
}

impl CellDrawer for RecordingDrawer {
    fn set_cell(&mut self, x: u16, y: u16, symbol: char, fg: Color, bg: Color) {
        self.writes += 1;
        self.cells.insert((x, y), (symbol, fg, bg));
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

impl ScreenSize for RecordingDrawer {
    fn screen_size(&self) -> io::Result<Size> {
        Ok(self.size)
    }
}

/// Creates a build with no acknowledger that is not currently building.
pub fn make_build(name: &str, state: BuildState) -> Build {
    Build {
        name: name.to_string(),
        state,
        building: false,
        acknowledger: String::new(),
    }
}

/// Runs `f` with environment variables temporarily set (or removed), then
/// restores the originals. Callers must be `#[serial]`.
pub fn with_env<F: FnOnce()>(vars: &[(&str, Option<&str>)], f: F) {
    let originals: Vec<_> = vars
        .iter()
        .map(|(k, _)| (*k, std::env::var(k).ok()))
        .collect();

    for (k, v) in vars {
        match v {
            Some(val) => std::env::set_var(k, val),
            None => std::env::remove_var(k),
        }
    }

    f();

    for (k, original) in &originals {
        match original {
            Some(val) => std::env::set_var(k, val),
            None => std::env::remove_var(k),
        }
    }
}
