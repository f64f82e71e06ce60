use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::GridError;
use crate::occupancy::Occupancy;

pub type Point = (f32, f32);

pub const DIR_UP: usize = 0;
pub const DIR_DOWN: usize = 1;
pub const DIR_LEFT: usize = 2;
pub const DIR_RIGHT: usize = 3;

pub const DIRECTIONS: [usize; 4] = [DIR_UP, DIR_DOWN, DIR_LEFT, DIR_RIGHT];

pub fn dir_delta(dir: usize) -> (isize, isize) {
    match dir {
        DIR_UP => (-1, 0),
        DIR_DOWN => (1, 0),
        DIR_LEFT => (0, -1),
        DIR_RIGHT => (0, 1),
        _ => (0, 0),
    }
}

pub fn opposite_dir(dir: usize) -> usize {
    match dir {
        DIR_UP => DIR_DOWN,
        DIR_DOWN => DIR_UP,
        DIR_LEFT => DIR_RIGHT,
        DIR_RIGHT => DIR_LEFT,
        _ => DIR_UP,
    }
}

pub fn dir_label(dir: usize) -> &'static str {
    match dir {
        DIR_UP => "up",
        DIR_DOWN => "down",
        DIR_LEFT => "left",
        DIR_RIGHT => "right",
        _ => "?",
    }
}

/// Grid coordinate. Ordering is row-major, which every tie-break in the
/// crate relies on.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<(usize, usize)> for Cell {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Board geometry for one level. World positions are cell centers, `y` grows
/// downward from `origin`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridSpec {
    rows: usize,
    cols: usize,
    cell_size: (f32, f32),
    spacing: f32,
    origin: Point,
}

impl GridSpec {
    pub fn new(
        rows: usize,
        cols: usize,
        cell_size: (f32, f32),
        spacing: f32,
        origin: Point,
    ) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::EmptyGrid { rows, cols });
        }
        // NaN fails both comparisons, so `!(x > 0)` rather than `x <= 0`.
        if !(cell_size.0 > 0.0) || !(cell_size.1 > 0.0) {
            return Err(GridError::CellSize {
                width: cell_size.0,
                height: cell_size.1,
            });
        }
        Ok(Self {
            rows,
            cols,
            cell_size,
            spacing: spacing.max(0.0),
            origin,
        })
    }

    pub fn from_field(
        rows: usize,
        cols: usize,
        field_width: f32,
        field_height: f32,
        spacing: f32,
        origin: Point,
    ) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::EmptyGrid { rows, cols });
        }
        let spacing = spacing.max(0.0);
        let width = (field_width - spacing * (cols - 1) as f32) / cols as f32;
        let height = (field_height - spacing * (rows - 1) as f32) / rows as f32;
        Self::new(rows, cols, (width, height), spacing, origin)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn total(&self) -> usize {
        self.rows * self.cols
    }

    pub fn cell_size(&self) -> (f32, f32) {
        self.cell_size
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn index_of(&self, cell: Cell) -> usize {
        cell.row * self.cols + cell.col
    }

    pub fn cell_at(&self, index: usize) -> Cell {
        Cell::new(index / self.cols, index % self.cols)
    }

    pub fn is_valid(&self, row: isize, col: isize) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.rows && (col as usize) < self.cols
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    pub fn offset(&self, cell: Cell, d_row: isize, d_col: isize) -> Option<Cell> {
        let row = cell.row as isize + d_row;
        let col = cell.col as isize + d_col;
        if self.is_valid(row, col) {
            Some(Cell::new(row as usize, col as usize))
        } else {
            None
        }
    }

    pub fn neighbor(&self, cell: Cell, dir: usize) -> Option<Cell> {
        let (d_row, d_col) = dir_delta(dir);
        self.offset(cell, d_row, d_col)
    }

    fn pitch(&self) -> (f32, f32) {
        (
            self.cell_size.0 + self.spacing,
            self.cell_size.1 + self.spacing,
        )
    }

    pub fn world_position(&self, cell: Cell) -> Point {
        let (pitch_x, pitch_y) = self.pitch();
        (
            self.origin.0 + cell.col as f32 * pitch_x + self.cell_size.0 * 0.5,
            self.origin.1 + cell.row as f32 * pitch_y + self.cell_size.1 * 0.5,
        )
    }

    pub fn grid_position(&self, point: Point) -> Cell {
        let (pitch_x, pitch_y) = self.pitch();
        // Float-to-int casts saturate and map NaN to 0.
        let col = ((point.0 - self.origin.0) / pitch_x).floor() as isize;
        let row = ((point.1 - self.origin.1) / pitch_y).floor() as isize;
        Cell::new(
            row.clamp(0, self.rows as isize - 1) as usize,
            col.clamp(0, self.cols as isize - 1) as usize,
        )
    }

    /// Cell under `point` if free, otherwise the first free cell found by a
    /// ring-by-ring breadth-first walk. A full board yields the cell under
    /// `point`.
    pub fn nearest_empty_cell(&self, point: Point, occupancy: &Occupancy) -> Cell {
        let start = self.grid_position(point);
        if occupancy.is_free(start) {
            return start;
        }
        let mut visited = vec![false; self.total()];
        let mut queue = VecDeque::new();
        visited[self.index_of(start)] = true;
        queue.push_back(start);
        while let Some(cell) = queue.pop_front() {
            if occupancy.is_free(cell) {
                return cell;
            }
            for dir in DIRECTIONS {
                if let Some(next) = self.neighbor(cell, dir) {
                    let index = self.index_of(next);
                    if !visited[index] {
                        visited[index] = true;
                        queue.push_back(next);
                    }
                }
            }
        }
        start
    }

    pub fn empty_cells(&self, occupancy: &Occupancy) -> Vec<Cell> {
        (0..self.total())
            .map(|index| self.cell_at(index))
            .filter(|cell| occupancy.is_free(*cell))
            .collect()
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.total()).map(|index| self.cell_at(index))
    }
}
