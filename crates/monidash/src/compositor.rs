//! Cell compositing for build boxes.
//!
//! A [`Compositor`] holds an ordered list of [`Decorator`]s. For every cell
//! of a box the decorators are folded over a blank base cell, each one
//! receiving the cell produced so far and the coordinate relative to the
//! box origin. Later decorators override earlier ones.

use crate::geometry::{Point, Rect, Size};
use crate::terminal::CellDrawer;
use crate::Build;
use ratatui::style::Color;
use thiserror::Error;

/// Marker appended to clipped labels.
pub const ELLIPSIS: &str = "...";

/// Horizontal padding between a box border and its labels.
pub const TEXT_PADDING: u16 = 1;

/// Label shown while a build is running.
pub const BUILDING_MESSAGE: &str = "Building";

/// Column where the name and status labels start.
const LABEL_COLUMN: u16 = 11;

/// Column of the acknowledger label when the building label precedes it.
const BUILDING_ACKNOWLEDGER_COLUMN: u16 = 20;

/// Left edge and width of the state colour swatch.
const SWATCH_COLUMN: u16 = 2;
const SWATCH_WIDTH: u16 = 8;

const BOX_TOP_LEFT: char = '┏';
const BOX_TOP_RIGHT: char = '┓';
const BOX_BOTTOM_LEFT: char = '┗';
const BOX_BOTTOM_RIGHT: char = '┛';
const BOX_HORIZONTAL: char = '━';
const BOX_VERTICAL: char = '┃';

/// Errors from label clipping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EllipsizeError {
    /// There is no room for even the ellipsis marker.
    #[error("Max length {0} too short to ellipsize")]
    TooShort(usize),
}

/// What gets drawn at one terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub symbol: char,
    pub fg: Color,
    pub bg: Color,
}

impl Cell {
    /// A space in white on black, the starting point for every box cell.
    pub const BLANK: Cell = Cell {
        symbol: ' ',
        fg: Color::White,
        bg: Color::Black,
    };
}

impl Default for Cell {
    fn default() -> Self {
        Self::BLANK
    }
}

/// A pure per-cell contribution to a box.
///
/// Implementations return `cell` unchanged for points they do not care
/// about, which is what lets decorators be stacked.
pub trait Decorator {
    fn decorate(&self, cell: Cell, point: Point) -> Cell;
}

/// Draws a heavy line border around `rect`.
#[derive(Debug, Clone, Copy)]
pub struct BorderDecorator {
    rect: Rect,
}

impl BorderDecorator {
    pub fn new(rect: Rect) -> Self {
        Self { rect }
    }
}

impl Decorator for BorderDecorator {
    fn decorate(&self, mut cell: Cell, point: Point) -> Cell {
        if !self.rect.on_border(point) {
            return cell;
        }

        let left = point.x == self.rect.x();
        let right = u32::from(point.x) + 1 == self.rect.right();
        let top = point.y == self.rect.y();
        let bottom = u32::from(point.y) + 1 == self.rect.bottom();

        cell.symbol = match (left, right, top, bottom) {
            (true, _, true, _) => BOX_TOP_LEFT,
            (true, _, _, true) => BOX_BOTTOM_LEFT,
            (_, true, true, _) => BOX_TOP_RIGHT,
            (_, true, _, true) => BOX_BOTTOM_RIGHT,
            (true, _, _, _) | (_, true, _, _) => BOX_VERTICAL,
            _ => BOX_HORIZONTAL,
        };
        cell
    }
}

/// Writes a label on one row, starting at a fixed column.
#[derive(Debug, Clone)]
pub struct TextDecorator {
    text: Vec<char>,
    start: Point,
}

impl TextDecorator {
    pub fn new(text: &str, start: Point) -> Self {
        Self {
            text: text.chars().collect(),
            start,
        }
    }
}

impl Decorator for TextDecorator {
    fn decorate(&self, mut cell: Cell, point: Point) -> Cell {
        if point.y != self.start.y || point.x < self.start.x {
            return cell;
        }
        if let Some(&symbol) = self.text.get(usize::from(point.x - self.start.x)) {
            cell.symbol = symbol;
        }
        cell
    }
}

/// Paints the background of every cell inside `rect`.
#[derive(Debug, Clone, Copy)]
pub struct FillDecorator {
    rect: Rect,
    color: Color,
}

impl FillDecorator {
    pub fn new(rect: Rect, color: Color) -> Self {
        Self { rect, color }
    }
}

impl Decorator for FillDecorator {
    fn decorate(&self, mut cell: Cell, point: Point) -> Cell {
        if self.rect.contains(point) {
            cell.bg = self.color;
        }
        cell
    }
}

/// An ordered stack of decorators over a blank base cell.
#[derive(Default)]
pub struct Compositor {
    decorators: Vec<Box<dyn Decorator + Send + Sync>>,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a decorator; it runs after every decorator already pushed.
    pub fn push(&mut self, decorator: impl Decorator + Send + Sync + 'static) -> &mut Self {
        self.decorators.push(Box::new(decorator));
        self
    }

    pub fn len(&self) -> usize {
        self.decorators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decorators.is_empty()
    }

    /// Resolves the final cell at `point`, relative to the box origin.
    pub fn cell_at(&self, point: Point) -> Cell {
        self.decorators
            .iter()
            .fold(Cell::BLANK, |cell, decorator| decorator.decorate(cell, point))
    }

    /// Writes every cell of `bounds` through `drawer`.
    pub fn paint<D: CellDrawer + ?Sized>(&self, bounds: Rect, drawer: &mut D) {
        for x in 0..bounds.width() {
            for y in 0..bounds.height() {
                let cell = self.cell_at(Point::new(x, y));
                drawer.set_cell(
                    bounds.x().saturating_add(x),
                    bounds.y().saturating_add(y),
                    cell.symbol,
                    cell.fg,
                    cell.bg,
                );
            }
        }
    }
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("decorators", &self.decorators.len())
            .finish()
    }
}

/// Number of displayable characters in `s`.
///
/// Counts chars rather than bytes so multi-byte glyphs measure as one.
pub fn display_len(s: &str) -> usize {
    s.chars().count()
}

/// Clips `label` to `max_length` characters, ending in [`ELLIPSIS`] when cut.
pub fn ellipsize(label: &str, max_length: usize) -> Result<String, EllipsizeError> {
    let marker_len = display_len(ELLIPSIS);
    if max_length < marker_len {
        return Err(EllipsizeError::TooShort(max_length));
    }
    if display_len(label) <= max_length {
        return Ok(label.to_string());
    }
    let kept: String = label.chars().take(max_length - marker_len).collect();
    Ok(format!("{kept}{ELLIPSIS}"))
}

/// Builds the decorator stack for one build drawn into a box of `size`.
pub fn compose_build_box(build: &Build, size: Size) -> Compositor {
    let available_width = usize::from(size.width.saturating_sub(2 * TEXT_PADDING));
    let name = match ellipsize(&build.name, available_width) {
        Ok(name) => name,
        Err(e) => {
            tracing::trace!("leaving build name unclipped: {e}");
            build.name.clone()
        }
    };

    let mut compositor = Compositor::new();
    compositor
        .push(BorderDecorator::new(Rect::new(0, 0, size.width, size.height)))
        .push(TextDecorator::new(&name, Point::new(LABEL_COLUMN, 1)));

    if build.building {
        compositor
            .push(TextDecorator::new(
                BUILDING_MESSAGE,
                Point::new(LABEL_COLUMN, 2),
            ))
            .push(TextDecorator::new(
                &build.acknowledger,
                Point::new(BUILDING_ACKNOWLEDGER_COLUMN, 2),
            ));
    } else {
        compositor.push(TextDecorator::new(
            &build.acknowledger,
            Point::new(LABEL_COLUMN, 2),
        ));
    }

    compositor.push(FillDecorator::new(
        swatch_rect(size),
        build.state.bg_color(),
    ));
    compositor
}

/// Interior rows of the colour swatch column range.
fn swatch_rect(size: Size) -> Rect {
    Rect::new(SWATCH_COLUMN, 1, SWATCH_WIDTH, size.height.saturating_sub(2))
}

/// Draws `build` into `bounds` on screen.
pub fn draw_build<D: CellDrawer + ?Sized>(build: &Build, bounds: Rect, drawer: &mut D) {
    compose_build_box(build, bounds.size).paint(bounds, drawer);
}
