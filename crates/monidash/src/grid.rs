//! Column-major grid packing of build boxes onto the screen.

use crate::geometry::{Point, Rect, Size};
use thiserror::Error;

/// Errors produced when a grid cannot be laid out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// No column arrangement leaves room for the minimum box width.
    #[error("Screen is too small to fit the grid (need {required_width} columns per box, have {available_width})")]
    InsufficientSpace {
        /// Minimum box width requested.
        required_width: u16,
        /// Box width the screen could actually offer.
        available_width: u32,
    },
}

/// Box placement for a grid, one rect per requested box.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    pub boxes: Vec<Rect>,
}

impl Layout {
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

/// Lays out `count` boxes of at least `minimum_box_size` onto `screen_size`.
///
/// Boxes keep the minimum height and are stretched horizontally to fill
/// their column. Columns are filled top to bottom before moving right, so
/// the last column may be shorter than the others. Either every box gets a
/// rect or the call fails; there is no partial layout.
pub fn layout_grid(
    minimum_box_size: Size,
    count: usize,
    padding: u16,
    screen_size: Size,
) -> Result<Layout, LayoutError> {
    if count == 0 {
        return Ok(Layout::default());
    }

    let padding32 = u32::from(padding);
    let row_stride = u32::from(minimum_box_size.height) + padding32;
    let usable_height = u32::from(screen_size.height).saturating_sub(padding32);
    let rows_per_column = if row_stride == 0 {
        0
    } else {
        usable_height / row_stride
    };

    let insufficient = |available_width: u32| LayoutError::InsufficientSpace {
        required_width: minimum_box_size.width,
        available_width,
    };

    if rows_per_column == 0 {
        return Err(insufficient(0));
    }

    let rows_per_column = rows_per_column as usize;
    let columns = count.div_ceil(rows_per_column);
    let usable_width = u32::from(screen_size.width).saturating_sub(padding32) as usize;
    let column_width = usable_width / columns;
    let box_width = column_width.saturating_sub(padding as usize);

    if column_width < padding as usize || box_width < minimum_box_size.width as usize {
        return Err(insufficient(box_width as u32));
    }

    // Everything below fits inside the screen, so u16 is lossless.
    let column_width = column_width as u16;
    let box_size = Size::new(box_width as u16, minimum_box_size.height);

    let mut boxes = Vec::with_capacity(count);
    'grid: for column in 0..columns {
        for row in 0..rows_per_column {
            let origin = Point::new(
                padding + column as u16 * column_width,
                padding + row as u16 * row_stride as u16,
            );
            boxes.push(Rect {
                origin,
                size: box_size,
            });
            if boxes.len() == count {
                break 'grid;
            }
        }
    }

    tracing::trace!(count, columns, rows_per_column, "laid out grid");
    Ok(Layout { boxes })
}
