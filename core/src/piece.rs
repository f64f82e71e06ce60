use crate::grid::{Cell, DIR_DOWN, DIR_LEFT, DIR_RIGHT, DIR_UP};

pub type PieceId = usize;

/// Per-edge flags indexed by `DIR_*`: true when the correct neighbor sits
/// across that edge.
pub type ConnectionMask = [bool; 4];

pub const NO_CONNECTIONS: ConnectionMask = [false; 4];

/// Home index of the piece that belongs next to `home` in direction `dir`.
pub fn home_neighbor(home: usize, cols: usize, rows: usize, dir: usize) -> Option<usize> {
    let col = home % cols;
    let row = home / cols;
    match dir {
        DIR_UP if row > 0 => Some(home - cols),
        DIR_DOWN if row + 1 < rows => Some(home + cols),
        DIR_LEFT if col > 0 => Some(home - 1),
        DIR_RIGHT if col + 1 < cols => Some(home + 1),
        _ => None,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Piece {
    home_index: usize,
    cols: usize,
    cell: Cell,
    connections: ConnectionMask,
}

impl Piece {
    pub fn new(home_index: usize, cols: usize, cell: Cell) -> Self {
        Self {
            home_index,
            cols: cols.max(1),
            cell,
            connections: NO_CONNECTIONS,
        }
    }

    pub fn home_index(&self) -> usize {
        self.home_index
    }

    pub fn home_position(&self) -> Cell {
        Cell::new(self.home_index / self.cols, self.home_index % self.cols)
    }

    pub fn cell(&self) -> Cell {
        self.cell
    }

    pub fn is_correctly_placed(&self) -> bool {
        self.cell == self.home_position()
    }

    pub fn set_cell(&mut self, cell: Cell) {
        self.cell = cell;
    }

    pub fn connections(&self) -> ConnectionMask {
        self.connections
    }

    pub fn set_connections(&mut self, mask: ConnectionMask) {
        self.connections = mask;
    }

    pub fn is_connected(&self, dir: usize) -> bool {
        self.connections.get(dir).copied().unwrap_or(false)
    }

    pub fn has_connections(&self) -> bool {
        self.connections.iter().any(|edge| *edge)
    }
}
