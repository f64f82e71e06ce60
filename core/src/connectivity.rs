use std::collections::VecDeque;

use tracing::trace;

use crate::grid::{Cell, GridSpec, DIRECTIONS, DIR_DOWN, DIR_RIGHT};
use crate::occupancy::Occupancy;
use crate::piece::{home_neighbor, ConnectionMask, Piece, PieceId, NO_CONNECTIONS};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConnectionProgress {
    pub connected: usize,
    pub expected: usize,
}

impl ConnectionProgress {
    pub fn ratio(&self) -> f32 {
        if self.expected == 0 {
            return 1.0;
        }
        self.connected as f32 / self.expected as f32
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ConnectivityEngine {
    grid: GridSpec,
}

impl ConnectivityEngine {
    pub fn new(grid: &GridSpec) -> Self {
        Self { grid: *grid }
    }

    pub fn compute_mask(
        &self,
        piece: &Piece,
        pieces: &[Piece],
        occupancy: &Occupancy,
    ) -> ConnectionMask {
        let cols = self.grid.cols();
        let rows = self.grid.rows();
        let mut mask = NO_CONNECTIONS;
        for dir in DIRECTIONS {
            let Some(expected) = home_neighbor(piece.home_index(), cols, rows, dir) else {
                continue;
            };
            let Some(cell) = self.grid.neighbor(piece.cell(), dir) else {
                continue;
            };
            mask[dir] = occupancy
                .get(cell)
                .and_then(|id| pieces.get(id))
                .map(|occupant| occupant.home_index() == expected)
                .unwrap_or(false);
        }
        mask
    }

    pub fn recompute_connections(
        &self,
        id: PieceId,
        pieces: &mut [Piece],
        occupancy: &Occupancy,
    ) -> bool {
        let Some(piece) = pieces.get(id) else {
            return false;
        };
        let mask = self.compute_mask(piece, pieces, occupancy);
        let piece = &mut pieces[id];
        if piece.connections() == mask {
            return false;
        }
        trace!(piece = id, ?mask, "connectivity: mask changed");
        piece.set_connections(mask);
        true
    }

    pub fn recompute_all(&self, pieces: &mut [Piece], occupancy: &Occupancy) {
        for id in 0..pieces.len() {
            self.recompute_connections(id, pieces, occupancy);
        }
    }

    pub fn recompute_around(
        &self,
        cells: &[Cell],
        pieces: &mut [Piece],
        occupancy: &Occupancy,
    ) -> Vec<PieceId> {
        let mut touched = Vec::new();
        for cell in cells {
            touched.extend(occupancy.get(*cell));
            for dir in DIRECTIONS {
                if let Some(next) = self.grid.neighbor(*cell, dir) {
                    touched.extend(occupancy.get(next));
                }
            }
        }
        touched.sort_unstable();
        touched.dedup();
        for id in &touched {
            self.recompute_connections(*id, pieces, occupancy);
        }
        touched
    }

    /// Follows the mask of the piece being expanded. Sorted by id.
    pub fn connected_group(
        &self,
        start: PieceId,
        pieces: &[Piece],
        occupancy: &Occupancy,
    ) -> Vec<PieceId> {
        let Some(first) = pieces.get(start) else {
            return Vec::new();
        };
        let mut visited = vec![false; self.grid.total()];
        let mut queue = VecDeque::new();
        let mut group = Vec::new();
        if !self.grid.contains(first.cell()) {
            return vec![start];
        }
        visited[self.grid.index_of(first.cell())] = true;
        queue.push_back(start);

        while let Some(id) = queue.pop_front() {
            group.push(id);
            let piece = &pieces[id];
            for dir in DIRECTIONS {
                if !piece.is_connected(dir) {
                    continue;
                }
                let Some(cell) = self.grid.neighbor(piece.cell(), dir) else {
                    continue;
                };
                let index = self.grid.index_of(cell);
                if visited[index] {
                    continue;
                }
                if let Some(neighbor) = occupancy.get(cell) {
                    visited[index] = true;
                    queue.push_back(neighbor);
                }
            }
        }
        group.sort_unstable();
        group
    }

    pub fn groups(&self, pieces: &[Piece], occupancy: &Occupancy) -> Vec<Vec<PieceId>> {
        let mut assigned = vec![false; pieces.len()];
        let mut groups = Vec::new();
        for (_, id) in occupancy.iter() {
            if assigned.get(id).copied().unwrap_or(true) {
                continue;
            }
            let group = self.connected_group(id, pieces, occupancy);
            for member in &group {
                if let Some(slot) = assigned.get_mut(*member) {
                    *slot = true;
                }
            }
            groups.push(group);
        }
        groups
    }

    pub fn is_fully_connected(&self, pieces: &[Piece], occupancy: &Occupancy) -> bool {
        if pieces.is_empty() {
            return false;
        }
        self.connected_group(0, pieces, occupancy).len() == pieces.len()
    }

    /// Counts each home-adjacent pair once, through the right and down edges.
    pub fn count_connections(&self, pieces: &[Piece]) -> ConnectionProgress {
        let rows = self.grid.rows();
        let cols = self.grid.cols();
        let expected = rows * cols.saturating_sub(1) + cols * rows.saturating_sub(1);
        let connected = pieces
            .iter()
            .map(|piece| {
                usize::from(piece.is_connected(DIR_RIGHT)) + usize::from(piece.is_connected(DIR_DOWN))
            })
            .sum();
        ConnectionProgress {
            connected,
            expected,
        }
    }
}
