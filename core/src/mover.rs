use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::grid::{Cell, GridSpec};
use crate::occupancy::Occupancy;
use crate::piece::{Piece, PieceId};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovePolicy {
    /// Foreign occupants are shifted into the cells the group leaves behind.
    #[default]
    Displace,
    /// Only cells that are free or owned by the group are accepted.
    Strict,
}

/// Signed cell for the minimum corner of a group; may fall off the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Anchor {
    pub row: isize,
    pub col: isize,
}

impl Anchor {
    pub const fn new(row: isize, col: isize) -> Self {
        Self { row, col }
    }

    pub fn offset(self, d_row: isize, d_col: isize) -> Self {
        Self::new(self.row + d_row, self.col + d_col)
    }
}

impl From<Cell> for Anchor {
    fn from(cell: Cell) -> Self {
        Self::new(cell.row as isize, cell.col as isize)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub piece: PieceId,
    pub from: Cell,
    pub to: Cell,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    Unchanged,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovePlan {
    pub outcome: MoveOutcome,
    pub placements: Vec<Placement>,
}

impl MovePlan {
    pub fn unchanged() -> Self {
        Self {
            outcome: MoveOutcome::Unchanged,
            placements: Vec::new(),
        }
    }

    fn moved(placements: Vec<Placement>) -> Self {
        if placements.is_empty() {
            return Self::unchanged();
        }
        Self {
            outcome: MoveOutcome::Moved,
            placements,
        }
    }

    pub fn is_unchanged(&self) -> bool {
        self.outcome == MoveOutcome::Unchanged
    }

    pub fn destination(&self, piece: PieceId) -> Option<Cell> {
        self.placements
            .iter()
            .find(|placement| placement.piece == piece)
            .map(|placement| placement.to)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct MoveResolver {
    grid: GridSpec,
    policy: MovePolicy,
}

impl MoveResolver {
    pub fn new(grid: &GridSpec, policy: MovePolicy) -> Self {
        Self {
            grid: *grid,
            policy,
        }
    }

    pub fn policy(&self) -> MovePolicy {
        self.policy
    }

    pub fn group_anchor(&self, group: &[PieceId], pieces: &[Piece]) -> Option<Cell> {
        let mut cells = group.iter().filter_map(|id| pieces.get(*id)).map(Piece::cell);
        let first = cells.next()?;
        Some(cells.fold(first, |acc, cell| {
            Cell::new(acc.row.min(cell.row), acc.col.min(cell.col))
        }))
    }

    pub fn candidate_cells(
        &self,
        group: &[PieceId],
        pieces: &[Piece],
        anchor: Anchor,
    ) -> Option<Vec<(PieceId, Cell)>> {
        let current = self.group_anchor(group, pieces)?;
        let d_row = anchor.row - current.row as isize;
        let d_col = anchor.col - current.col as isize;
        self.shifted_cells(group, pieces, d_row, d_col)
    }

    fn shifted_cells(
        &self,
        group: &[PieceId],
        pieces: &[Piece],
        d_row: isize,
        d_col: isize,
    ) -> Option<Vec<(PieceId, Cell)>> {
        group
            .iter()
            .map(|id| {
                let piece = pieces.get(*id)?;
                let cell = self.grid.offset(piece.cell(), d_row, d_col)?;
                Some((*id, cell))
            })
            .collect()
    }

    fn owned_or_free(&self, cells: &[(PieceId, Cell)], group: &[PieceId], occupancy: &Occupancy) -> bool {
        cells.iter().all(|(_, cell)| match occupancy.get(*cell) {
            None => true,
            Some(occupant) => group.contains(&occupant),
        })
    }

    pub fn fits(
        &self,
        group: &[PieceId],
        pieces: &[Piece],
        occupancy: &Occupancy,
        anchor: impl Into<Anchor>,
    ) -> bool {
        match self.candidate_cells(group, pieces, anchor.into()) {
            Some(cells) => self.owned_or_free(&cells, group, occupancy),
            None => false,
        }
    }

    /// First row-major anchor that [`fits`](Self::fits); the group's own
    /// anchor when nothing does.
    pub fn find_best_position(
        &self,
        group: &[PieceId],
        pieces: &[Piece],
        occupancy: &Occupancy,
    ) -> Option<Cell> {
        let current = self.group_anchor(group, pieces)?;
        let best = self
            .grid
            .cells()
            .find(|cell| self.fits(group, pieces, occupancy, *cell))
            .unwrap_or(current);
        Some(best)
    }

    /// Follows the resolver's policy, unlike [`fits`](Self::fits).
    pub fn can_place_group_at_offset(
        &self,
        group: &[PieceId],
        pieces: &[Piece],
        occupancy: &Occupancy,
        offset: (isize, isize),
    ) -> bool {
        if group.is_empty() {
            return false;
        }
        let Some(cells) = self.shifted_cells(group, pieces, offset.0, offset.1) else {
            return false;
        };
        match self.policy {
            MovePolicy::Displace => true,
            MovePolicy::Strict => self.owned_or_free(&cells, group, occupancy),
        }
    }

    pub fn resolve(
        &self,
        group: &[PieceId],
        pieces: &[Piece],
        occupancy: &Occupancy,
        anchor: impl Into<Anchor>,
    ) -> MovePlan {
        let anchor = anchor.into();
        let Some(current) = self.group_anchor(group, pieces) else {
            return MovePlan::unchanged();
        };
        if anchor == Anchor::from(current) {
            return MovePlan::unchanged();
        }
        let Some(candidates) = self.candidate_cells(group, pieces, anchor) else {
            debug!(?anchor, "move: group leaves the board, searching row-major");
            return self.fallback(group, pieces, occupancy, current);
        };

        let mut in_group = vec![false; pieces.len()];
        for id in group {
            if let Some(slot) = in_group.get_mut(*id) {
                *slot = true;
            }
        }
        let is_foreign = |id: PieceId| !in_group.get(id).copied().unwrap_or(false);
        let mut is_candidate = vec![false; self.grid.total()];
        for (_, cell) in &candidates {
            is_candidate[self.grid.index_of(*cell)] = true;
        }

        let mut scratch = occupancy.clone();
        let mut placements = Vec::new();

        // Anchor is on the board whenever every candidate is.
        let target = Cell::new(anchor.row as usize, anchor.col as usize);
        if let Some(occupant) = scratch.get(target).filter(|id| is_foreign(*id)) {
            if is_candidate[self.grid.index_of(target)] {
                // Cells the group is about to vacate are still occupied here.
                let free = self
                    .grid
                    .empty_cells(&scratch)
                    .into_iter()
                    .find(|cell| !is_candidate[self.grid.index_of(*cell)]);
                match free {
                    Some(cell) => {
                        scratch.vacate(target);
                        scratch.place(cell, occupant);
                        placements.push(Placement {
                            piece: occupant,
                            from: target,
                            to: cell,
                        });
                        debug!(piece = occupant, %cell, "move: occupant relocated");
                    }
                    None => debug!(piece = occupant, "move: no free cell for occupant"),
                }
            }
        }

        let mut displaced: Vec<(Cell, PieceId)> = candidates
            .iter()
            .filter_map(|(_, cell)| {
                scratch
                    .get(*cell)
                    .filter(|id| is_foreign(*id))
                    .map(|id| (*cell, id))
            })
            .collect();
        if !displaced.is_empty() && self.policy == MovePolicy::Strict {
            debug!(blocked = displaced.len(), "move: target rejected");
            return self.fallback(group, pieces, occupancy, current);
        }

        for id in group {
            let cell = pieces[*id].cell();
            if scratch.get(cell) == Some(*id) {
                scratch.vacate(cell);
            }
        }
        for (cell, _) in &displaced {
            scratch.vacate(*cell);
        }
        for (id, cell) in &candidates {
            scratch.place(*cell, *id);
            let from = pieces[*id].cell();
            if from != *cell {
                placements.push(Placement {
                    piece: *id,
                    from,
                    to: *cell,
                });
            }
        }

        displaced.sort_unstable();
        let free = self.grid.empty_cells(&scratch);
        for ((from, id), to) in displaced.into_iter().zip(free) {
            scratch.place(to, id);
            placements.push(Placement { piece: id, from, to });
            debug!(piece = id, %from, %to, "move: shifted");
        }

        MovePlan::moved(placements)
    }

    fn fallback(
        &self,
        group: &[PieceId],
        pieces: &[Piece],
        occupancy: &Occupancy,
        current: Cell,
    ) -> MovePlan {
        let best = self
            .find_best_position(group, pieces, occupancy)
            .unwrap_or(current);
        if best == current {
            debug!("move: no feasible placement, unchanged");
            return MovePlan::unchanged();
        }
        let Some(cells) = self.candidate_cells(group, pieces, best.into()) else {
            return MovePlan::unchanged();
        };
        let placements = cells
            .into_iter()
            .filter_map(|(id, to)| {
                let from = pieces[id].cell();
                (from != to).then_some(Placement { piece: id, from, to })
            })
            .collect();
        MovePlan::moved(placements)
    }
}
