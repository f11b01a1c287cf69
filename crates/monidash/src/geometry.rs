//! Plain value types for layout math.
//!
//! Coordinates are terminal cells, origin at the top-left corner.

use std::fmt;

/// A single cell position on the screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: u16,
    pub y: u16,
}

impl Point {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// Width and height an object takes up, in cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

impl Size {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

impl From<ratatui::layout::Size> for Size {
    fn from(size: ratatui::layout::Size) -> Self {
        Self::new(size.width, size.height)
    }
}

/// A bounding rectangle: an origin plus a size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn x(&self) -> u16 {
        self.origin.x
    }

    pub fn y(&self) -> u16 {
        self.origin.y
    }

    pub fn width(&self) -> u16 {
        self.size.width
    }

    pub fn height(&self) -> u16 {
        self.size.height
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        u32::from(self.origin.x) + u32::from(self.size.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        u32::from(self.origin.y) + u32::from(self.size.height)
    }

    /// Returns `true` if `point` lies inside the rectangle.
    ///
    /// The right and bottom edges are exclusive, so a zero-sized rect
    /// contains nothing.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.origin.x
            && u32::from(point.x) < self.right()
            && point.y >= self.origin.y
            && u32::from(point.y) < self.bottom()
    }

    /// Returns `true` if `point` lies on the outermost ring of cells.
    pub fn on_border(&self, point: Point) -> bool {
        if !self.contains(point) {
            return false;
        }
        point.x == self.origin.x
            || u32::from(point.x) + 1 == self.right()
            || point.y == self.origin.y
            || u32::from(point.y) + 1 == self.bottom()
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Rect x:{},y:{} | w:{},h:{}>",
            self.origin.x, self.origin.y, self.size.width, self.size.height
        )
    }
}
