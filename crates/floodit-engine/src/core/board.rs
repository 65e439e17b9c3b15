use std::{collections::VecDeque, mem};

use arrayvec::ArrayVec;

use crate::OutOfRangeError;

use super::color::Color;

/// A cell coordinate. `x` is the column, `y` the row, `(0, 0)` is the top-left cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Raster index of this point on a board with the given side length.
    #[must_use]
    pub const fn index(self, size: usize) -> usize {
        self.x + self.y * size
    }

    #[must_use]
    pub const fn from_index(index: usize, size: usize) -> Self {
        Self {
            x: index % size,
            y: index / size,
        }
    }

    /// Returns the 4-connected neighbors that lie on a board with the given side length.
    ///
    /// Neighbors are listed left, up, right, down.
    #[must_use]
    pub fn neighbors(self, size: usize) -> ArrayVec<Point, 4> {
        let mut result = ArrayVec::new();
        if self.x > 0 {
            result.push(Point::new(self.x - 1, self.y));
        }
        if self.y > 0 {
            result.push(Point::new(self.x, self.y - 1));
        }
        if self.x + 1 < size {
            result.push(Point::new(self.x + 1, self.y));
        }
        if self.y + 1 < size {
            result.push(Point::new(self.x, self.y + 1));
        }
        result
    }
}

/// Square grid of cell colors with change tracking.
///
/// Every write goes through a [`ChangeBatch`] obtained from [`Board::begin_batch`].
/// When the batch ends, the list of coordinates it touched is queued as one unit,
/// so a consumer (a renderer, or the [`Game`](crate::Game) accessor sync) can apply
/// each batch atomically with [`Board::pop_changes`].
///
/// # Example
///
/// ```
/// use floodit_engine::{Board, Color, Point};
///
/// let mut board = Board::filled(2, Color::RED);
/// {
///     let mut batch = board.begin_batch();
///     batch.set(Point::new(1, 1), Color::BLUE).unwrap();
/// }
/// assert_eq!(board.get(Point::new(1, 1)), Ok(Color::BLUE));
/// assert_eq!(board.pop_changes(), Some(vec![Point::new(1, 1)]));
/// assert_eq!(board.pop_changes(), None);
/// ```
#[derive(Debug, Clone)]
pub struct Board {
    size: usize,
    cells: Vec<Color>,
    changes: VecDeque<Vec<Point>>,
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.cells == other.cells
    }
}

impl Eq for Board {}

impl Board {
    /// Creates a `size`×`size` board with every cell set to `color`.
    ///
    /// The initial fill is not recorded as a change.
    #[must_use]
    pub fn filled(size: usize, color: Color) -> Self {
        Self {
            size,
            cells: vec![color; size * size],
            changes: VecDeque::new(),
        }
    }

    /// Copies the cells of another board, without its pending changes.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        Self {
            size: self.size,
            cells: self.cells.clone(),
            changes: VecDeque::new(),
        }
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of cells (`size * size`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells in raster order (`index = x + y * size`).
    #[must_use]
    pub fn cells(&self) -> &[Color] {
        &self.cells
    }

    pub fn get(&self, point: Point) -> Result<Color, OutOfRangeError> {
        self.check(point)?;
        Ok(self.cells[point.index(self.size)])
    }

    /// Color of the top-left cell.
    #[must_use]
    pub fn upper_left(&self) -> Color {
        self.cells[0]
    }

    pub(crate) fn cell(&self, point: Point) -> Color {
        self.cells[point.index(self.size)]
    }

    fn check(&self, point: Point) -> Result<(), OutOfRangeError> {
        if point.x < self.size && point.y < self.size {
            Ok(())
        } else {
            Err(OutOfRangeError {
                x: point.x,
                y: point.y,
                size: self.size,
            })
        }
    }

    /// Opens a change batch. The batch is queued when it is finished or dropped.
    pub fn begin_batch(&mut self) -> ChangeBatch<'_> {
        ChangeBatch {
            board: self,
            changed: Vec::new(),
        }
    }

    /// Dequeues the oldest finished batch of changed coordinates.
    pub fn pop_changes(&mut self) -> Option<Vec<Point>> {
        self.changes.pop_front()
    }

    /// Number of finished batches not yet consumed.
    #[must_use]
    pub fn pending_batches(&self) -> usize {
        self.changes.len()
    }
}

/// Scoped write access to a [`Board`].
///
/// Writes are only possible while a batch is alive; the batch records every
/// coordinate it writes and enqueues that list on the board when it ends.
#[derive(Debug)]
pub struct ChangeBatch<'a> {
    board: &'a mut Board,
    changed: Vec<Point>,
}

impl ChangeBatch<'_> {
    pub fn set(&mut self, point: Point, color: Color) -> Result<(), OutOfRangeError> {
        self.board.check(point)?;
        let index = point.index(self.board.size);
        self.board.cells[index] = color;
        self.changed.push(point);
        Ok(())
    }

    /// Writes a cell known to lie on the board (zone cells, raster indices).
    pub(crate) fn paint(&mut self, point: Point, color: Color) {
        let index = point.index(self.board.size);
        self.board.cells[index] = color;
        self.changed.push(point);
    }

    /// Ends the batch explicitly.
    pub fn finish(self) {}
}

impl Drop for ChangeBatch<'_> {
    fn drop(&mut self) {
        let changed = mem::take(&mut self.changed);
        self.board.changes.push_back(changed);
    }
}
