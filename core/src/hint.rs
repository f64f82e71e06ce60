use tracing::debug;

use crate::connectivity::ConnectivityEngine;
use crate::grid::{Cell, GridSpec, DIR_DOWN, DIR_LEFT, DIR_RIGHT, DIR_UP};
use crate::mover::MoveResolver;
use crate::occupancy::Occupancy;
use crate::piece::{Piece, PieceId};

/// Neighbor cells visited in row-major order.
const PAIR_SCAN_DIRS: [usize; 4] = [DIR_UP, DIR_LEFT, DIR_RIGHT, DIR_DOWN];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Hint {
    Swap {
        first: PieceId,
        second: PieceId,
    },
    Relocate {
        piece: PieceId,
        group: Vec<PieceId>,
        target: Cell,
        anchor: Cell,
    },
    None,
}

impl Hint {
    pub fn is_none(&self) -> bool {
        matches!(self, Hint::None)
    }

    pub fn pieces(&self) -> Vec<PieceId> {
        match self {
            Hint::Swap { first, second } => vec![*first, *second],
            Hint::Relocate { group, .. } => group.clone(),
            Hint::None => Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct HintEngine {
    grid: GridSpec,
    connectivity: ConnectivityEngine,
    resolver: MoveResolver,
}

impl HintEngine {
    pub fn new(grid: &GridSpec, connectivity: ConnectivityEngine, resolver: MoveResolver) -> Self {
        Self {
            grid: *grid,
            connectivity,
            resolver,
        }
    }

    pub fn find_hint(&self, pieces: &[Piece], occupancy: &Occupancy) -> Hint {
        if let Some(hint) = self.find_simple_hint(pieces, occupancy) {
            return hint;
        }
        if let Some(hint) = self.adjacent_pair_hint(occupancy) {
            debug!(?hint, "hint: falling back to adjacent pair");
            return hint;
        }
        if let Some(hint) = self.first_pair_hint(occupancy) {
            debug!(?hint, "hint: falling back to first pair");
            return hint;
        }
        debug!("hint: none available");
        Hint::None
    }

    /// Row-major scan for the first cell not holding its home piece. Cells
    /// whose only suggestion is an infeasible group move are skipped.
    pub fn find_simple_hint(&self, pieces: &[Piece], occupancy: &Occupancy) -> Option<Hint> {
        let mut by_home = vec![None; self.grid.total()];
        for (id, piece) in pieces.iter().enumerate() {
            if let Some(slot) = by_home.get_mut(piece.home_index()) {
                *slot = Some(id);
            }
        }

        for cell in self.grid.cells() {
            let expected = self.grid.index_of(cell);
            let occupant = occupancy.get(cell);
            if occupant.and_then(|id| pieces.get(id)).map(Piece::home_index) == Some(expected) {
                continue;
            }
            let Some(correct) = by_home[expected] else {
                continue;
            };
            let correct_piece = &pieces[correct];

            if let Some(occupant) = occupant {
                if !correct_piece.has_connections() {
                    debug!(%cell, occupant, correct, "hint: swap");
                    return Some(Hint::Swap {
                        first: occupant,
                        second: correct,
                    });
                }
            }

            let group = self
                .connectivity
                .connected_group(correct, pieces, occupancy);
            let from = correct_piece.cell();
            let offset = (
                cell.row as isize - from.row as isize,
                cell.col as isize - from.col as isize,
            );
            if !self
                .resolver
                .can_place_group_at_offset(&group, pieces, occupancy, offset)
            {
                debug!(%cell, correct, "hint: group move infeasible, continuing");
                continue;
            }
            let Some(anchor) = self
                .resolver
                .group_anchor(&group, pieces)
                .and_then(|anchor| self.grid.offset(anchor, offset.0, offset.1))
            else {
                continue;
            };
            debug!(%cell, correct, size = group.len(), "hint: relocate group");
            return Some(Hint::Relocate {
                piece: correct,
                group,
                target: cell,
                anchor,
            });
        }
        None
    }

    fn adjacent_pair_hint(&self, occupancy: &Occupancy) -> Option<Hint> {
        for (cell, first) in occupancy.iter() {
            for dir in PAIR_SCAN_DIRS {
                let Some(next) = self.grid.neighbor(cell, dir) else {
                    continue;
                };
                if let Some(second) = occupancy.get(next) {
                    return Some(Hint::Swap { first, second });
                }
            }
        }
        None
    }

    fn first_pair_hint(&self, occupancy: &Occupancy) -> Option<Hint> {
        let mut placed = occupancy.iter().map(|(_, id)| id);
        let first = placed.next()?;
        let second = placed.next()?;
        Some(Hint::Swap { first, second })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mover::MovePolicy;

    fn engine_for(grid: &GridSpec, policy: MovePolicy) -> HintEngine {
        let connectivity = ConnectivityEngine::new(grid);
        HintEngine::new(grid, connectivity, MoveResolver::new(grid, policy))
    }

    fn board(rows: usize, cols: usize, layout: &[Option<usize>]) -> (GridSpec, Vec<Piece>, Occupancy) {
        let grid = GridSpec::new(rows, cols, (1.0, 1.0), 0.0, (0.0, 0.0)).unwrap();
        let mut occupancy = Occupancy::new(&grid);
        let mut pieces: Vec<Piece> = (0..grid.total())
            .map(|home| Piece::new(home, cols, Cell::new(0, 0)))
            .collect();
        for (index, slot) in layout.iter().enumerate() {
            if let Some(home) = slot {
                let cell = grid.cell_at(index);
                pieces[*home].set_cell(cell);
                occupancy.place(cell, *home);
            }
        }
        pieces.truncate(layout.iter().flatten().count());
        ConnectivityEngine::new(&grid).recompute_all(&mut pieces, &occupancy);
        (grid, pieces, occupancy)
    }

    #[test]
    fn infeasible_group_defers_to_later_cell() {
        // Row 0: [2, 0, 1]. Cells (0,0) and (0,1) both need the {0, 1} group
        // to slide onto 2, which Strict rejects; (0,2) is the first usable.
        let layout = [Some(2), Some(0), Some(1), Some(3), Some(4), Some(5)];
        let (grid, pieces, occupancy) = board(2, 3, &layout);
        assert!(pieces[0].has_connections());
        let hint = engine_for(&grid, MovePolicy::Strict).find_simple_hint(&pieces, &occupancy);
        assert_eq!(hint, Some(Hint::Swap { first: 1, second: 2 }));
    }

    #[test]
    fn connected_correct_piece_yields_group_relocation() {
        // Row 0: [2, 0, 1]; 0 and 1 are connected, shifting them left is in bounds.
        let (grid, pieces, occupancy) = board(1, 3, &[Some(2), Some(0), Some(1)]);
        let hint = engine_for(&grid, MovePolicy::Displace).find_hint(&pieces, &occupancy);
        assert_eq!(
            hint,
            Hint::Relocate {
                piece: 0,
                group: vec![0, 1],
                target: Cell::new(0, 0),
                anchor: Cell::new(0, 0),
            }
        );
    }

    #[test]
    fn strict_blocked_groups_fall_back_to_adjacent_pair() {
        // Row 0: [2, 3, 0, 1]; both halves are groups blocking each other.
        let (grid, pieces, occupancy) = board(1, 4, &[Some(2), Some(3), Some(0), Some(1)]);
        let engine = engine_for(&grid, MovePolicy::Strict);
        assert_eq!(engine.find_simple_hint(&pieces, &occupancy), None);
        assert_eq!(
            engine.find_hint(&pieces, &occupancy),
            Hint::Swap { first: 2, second: 3 }
        );
    }

    #[test]
    fn pieces_need_not_be_ordered_by_home() {
        // Slot 0 holds home 3 on (0,0), slot 1 holds home 2 on (0,1).
        let grid = GridSpec::new(2, 2, (1.0, 1.0), 0.0, (0.0, 0.0)).unwrap();
        let mut pieces = vec![
            Piece::new(3, 2, Cell::new(0, 0)),
            Piece::new(2, 2, Cell::new(0, 1)),
        ];
        let mut occupancy = Occupancy::new(&grid);
        occupancy.place(Cell::new(0, 0), 0);
        occupancy.place(Cell::new(0, 1), 1);
        ConnectivityEngine::new(&grid).recompute_all(&mut pieces, &occupancy);

        let hint = engine_for(&grid, MovePolicy::Displace).find_hint(&pieces, &occupancy);
        assert_eq!(
            hint,
            Hint::Relocate {
                piece: 1,
                group: vec![1],
                target: Cell::new(1, 0),
                anchor: Cell::new(1, 0),
            }
        );
    }

    #[test]
    fn single_piece_board_has_no_hint() {
        let (grid, pieces, occupancy) = board(1, 1, &[Some(0)]);
        assert_eq!(
            engine_for(&grid, MovePolicy::Displace).find_hint(&pieces, &occupancy),
            Hint::None
        );
    }

    #[test]
    fn first_pair_ignores_adjacency() {
        let (grid, _, mut occupancy) = board(1, 3, &[Some(0), None, Some(1)]);
        occupancy.vacate(Cell::new(0, 1));
        let engine = engine_for(&grid, MovePolicy::Displace);
        assert_eq!(engine.adjacent_pair_hint(&occupancy), None);
        assert_eq!(
            engine.first_pair_hint(&occupancy),
            Some(Hint::Swap { first: 0, second: 1 })
        );
    }
}
