use tracing::{debug, info, warn};

use crate::config::SessionRules;
use crate::connectivity::{ConnectionProgress, ConnectivityEngine};
use crate::deal::{deal_permutation, validate_permutation};
use crate::error::SessionError;
use crate::grid::{Cell, GridSpec};
use crate::hint::{Hint, HintEngine};
use crate::mover::{Anchor, MoveOutcome, MovePlan, MoveResolver, Placement};
use crate::occupancy::Occupancy;
use crate::piece::{ConnectionMask, Piece, PieceId};
use crate::present::{Gesture, Presenter};
use crate::snapshot::{BoardSnapshot, SNAPSHOT_VERSION};

/// Drags shorter than this fraction of a cell are taps and move nothing.
pub const TAP_SLOP_RATIO: f32 = 0.1;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveReport {
    pub outcome: MoveOutcome,
    pub placements: Vec<Placement>,
    pub recomputed: Vec<PieceId>,
    pub newly_connected: Vec<PieceId>,
    pub solved: bool,
}

impl MoveReport {
    fn unchanged(solved: bool) -> Self {
        Self {
            outcome: MoveOutcome::Unchanged,
            placements: Vec::new(),
            recomputed: Vec::new(),
            newly_connected: Vec::new(),
            solved,
        }
    }

    pub fn is_unchanged(&self) -> bool {
        self.outcome == MoveOutcome::Unchanged
    }
}

/// One level in play: owns the grid, the occupancy map, the pieces and the
/// engines working over them. All board mutation goes through [`Session::apply`].
#[derive(Clone, Debug)]
pub struct Session {
    rules: SessionRules,
    grid: GridSpec,
    occupancy: Occupancy,
    pieces: Vec<Piece>,
    connectivity: ConnectivityEngine,
    resolver: MoveResolver,
    hints: HintEngine,
    level: u32,
    seed: u32,
    moves: u32,
}

impl Session {
    pub fn new(
        rules: SessionRules,
        level: u32,
        rows: usize,
        cols: usize,
        seed: u32,
    ) -> Result<Self, SessionError> {
        let perm = deal_permutation(seed, rows * cols);
        let mut session = Self::from_permutation(rules, rows, cols, &perm)?;
        session.level = level;
        session.seed = seed;
        info!(level, rows, cols, seed, "session: dealt");
        Ok(session)
    }

    /// `perm[cell]` is the home index dealt onto cell `cell` (row-major).
    pub fn from_permutation(
        rules: SessionRules,
        rows: usize,
        cols: usize,
        perm: &[usize],
    ) -> Result<Self, SessionError> {
        let grid = GridSpec::from_field(
            rows,
            cols,
            rules.field_width,
            rules.field_height,
            rules.spacing,
            rules.origin,
        )?;
        validate_permutation(rows, cols, perm)?;

        let mut occupancy = Occupancy::new(&grid);
        let mut pieces: Vec<Piece> = (0..grid.total())
            .map(|home| Piece::new(home, cols, Cell::new(0, 0)))
            .collect();
        for (index, home) in perm.iter().enumerate() {
            let cell = grid.cell_at(index);
            pieces[*home].set_cell(cell);
            occupancy.place(cell, *home);
        }

        let connectivity = ConnectivityEngine::new(&grid);
        let resolver = MoveResolver::new(&grid, rules.policy);
        let hints = HintEngine::new(&grid, connectivity, resolver);
        connectivity.recompute_all(&mut pieces, &occupancy);

        Ok(Self {
            rules,
            grid,
            occupancy,
            pieces,
            connectivity,
            resolver,
            hints,
            level: 0,
            seed: 0,
            moves: 0,
        })
    }

    pub fn restore(rules: SessionRules, snapshot: &BoardSnapshot) -> Result<Self, SessionError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SessionError::Version {
                expected: SNAPSHOT_VERSION,
                found: snapshot.version,
            });
        }
        let mut session = Self::from_permutation(
            rules,
            snapshot.rows as usize,
            snapshot.cols as usize,
            &snapshot.homes_usize(),
        )?;
        session.level = snapshot.level;
        session.seed = snapshot.seed;
        session.moves = snapshot.moves;
        debug!(level = snapshot.level, moves = snapshot.moves, "session: restored");
        Ok(session)
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let homes = self
            .grid
            .cells()
            .map(|cell| {
                self.occupancy
                    .get(cell)
                    .map(|id| self.pieces[id].home_index() as u32)
                    .unwrap_or(u32::MAX)
            })
            .collect();
        BoardSnapshot {
            version: SNAPSHOT_VERSION,
            level: self.level,
            seed: self.seed,
            rows: self.grid.rows() as u32,
            cols: self.grid.cols() as u32,
            homes,
            moves: self.moves,
        }
    }

    pub fn rules(&self) -> &SessionRules {
        &self.rules
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn occupancy(&self) -> &Occupancy {
        &self.occupancy
    }

    /// Ordered by home index, so a session `PieceId` is also the home index.
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id)
    }

    pub fn piece_at(&self, cell: Cell) -> Option<&Piece> {
        self.occupancy.get(cell).and_then(|id| self.pieces.get(id))
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn group_of(&self, id: PieceId) -> Vec<PieceId> {
        self.connectivity
            .connected_group(id, &self.pieces, &self.occupancy)
    }

    pub fn groups(&self) -> Vec<Vec<PieceId>> {
        self.connectivity.groups(&self.pieces, &self.occupancy)
    }

    pub fn progress(&self) -> ConnectionProgress {
        self.connectivity.count_connections(&self.pieces)
    }

    pub fn correct_count(&self) -> usize {
        self.pieces
            .iter()
            .filter(|piece| piece.is_correctly_placed())
            .count()
    }

    pub fn is_solved(&self) -> bool {
        self.pieces.iter().all(Piece::is_correctly_placed)
    }

    pub fn plan_drop(&self, piece: PieceId, cell: Cell) -> MovePlan {
        let Some(grabbed) = self.pieces.get(piece) else {
            return MovePlan::unchanged();
        };
        let group = self.group_of(piece);
        let Some(current) = self.resolver.group_anchor(&group, &self.pieces) else {
            return MovePlan::unchanged();
        };
        let d_row = grabbed.cell().row as isize - current.row as isize;
        let d_col = grabbed.cell().col as isize - current.col as isize;
        let anchor = Anchor::from(cell).offset(-d_row, -d_col);
        self.resolver
            .resolve(&group, &self.pieces, &self.occupancy, anchor)
    }

    pub fn drop_piece(&mut self, piece: PieceId, cell: Cell) -> MoveReport {
        let plan = self.plan_drop(piece, cell);
        self.apply(&plan)
    }

    pub fn drop_group(&mut self, piece: PieceId, anchor: impl Into<Anchor>) -> MoveReport {
        let group = self.group_of(piece);
        let plan = self
            .resolver
            .resolve(&group, &self.pieces, &self.occupancy, anchor);
        self.apply(&plan)
    }

    pub fn handle_gesture(&mut self, gesture: Gesture) -> MoveReport {
        let (cell_w, cell_h) = self.grid.cell_size();
        let slop = cell_w.min(cell_h) * TAP_SLOP_RATIO;
        let (dx, dy) = gesture.drag_delta;
        if dx * dx + dy * dy < slop * slop {
            debug!(piece = gesture.piece, "session: tap ignored");
            return MoveReport::unchanged(self.is_solved());
        }
        let cell = self.grid.grid_position(gesture.pointer_up);
        self.drop_piece(gesture.piece, cell)
    }

    pub fn swap(&mut self, first: PieceId, second: PieceId) -> MoveReport {
        let (Some(a), Some(b)) = (self.pieces.get(first), self.pieces.get(second)) else {
            return MoveReport::unchanged(self.is_solved());
        };
        if first == second {
            return MoveReport::unchanged(self.is_solved());
        }
        let plan = MovePlan {
            outcome: MoveOutcome::Moved,
            placements: vec![
                Placement {
                    piece: first,
                    from: a.cell(),
                    to: b.cell(),
                },
                Placement {
                    piece: second,
                    from: b.cell(),
                    to: a.cell(),
                },
            ],
        };
        self.apply(&plan)
    }

    /// `Hint::None` once the board is solved. The guard lives here; the engine
    /// alone would still fall back to suggesting an adjacent pair.
    pub fn request_hint(&self) -> Hint {
        if self.is_solved() {
            return Hint::None;
        }
        self.hints.find_hint(&self.pieces, &self.occupancy)
    }

    pub fn apply_hint(&mut self, hint: &Hint) -> MoveReport {
        match hint {
            Hint::Swap { first, second } => self.swap(*first, *second),
            Hint::Relocate { group, anchor, .. } => {
                let plan = self
                    .resolver
                    .resolve(group, &self.pieces, &self.occupancy, *anchor);
                self.apply(&plan)
            }
            Hint::None => MoveReport::unchanged(self.is_solved()),
        }
    }

    /// The only path that mutates the board. A plan that names a stale
    /// source cell, moves a piece twice or lands on a foreign occupant is
    /// dropped whole; the board is never left half-applied.
    pub fn apply(&mut self, plan: &MovePlan) -> MoveReport {
        if plan.is_unchanged() || plan.placements.is_empty() {
            return MoveReport::unchanged(self.is_solved());
        }
        let mut scratch = self.occupancy.clone();
        let mut seen = vec![false; self.pieces.len()];
        for placement in &plan.placements {
            let current = self.pieces.get(placement.piece).map(Piece::cell);
            if current != Some(placement.from) {
                warn!(piece = placement.piece, "session: stale plan rejected");
                return MoveReport::unchanged(self.is_solved());
            }
            if std::mem::replace(&mut seen[placement.piece], true) {
                warn!(piece = placement.piece, "session: piece moved twice, plan rejected");
                return MoveReport::unchanged(self.is_solved());
            }
            if scratch.get(placement.from) == Some(placement.piece) {
                scratch.vacate(placement.from);
            }
        }
        for placement in &plan.placements {
            if !scratch.is_free(placement.to) {
                warn!(to = %placement.to, "session: plan collides, rejected");
                return MoveReport::unchanged(self.is_solved());
            }
            scratch.place(placement.to, placement.piece);
        }

        let before: Vec<ConnectionMask> = self.pieces.iter().map(Piece::connections).collect();
        self.occupancy = scratch;
        let mut changed = Vec::with_capacity(plan.placements.len() * 2);
        for placement in &plan.placements {
            self.pieces[placement.piece].set_cell(placement.to);
            changed.push(placement.from);
            changed.push(placement.to);
        }
        let recomputed = self
            .connectivity
            .recompute_around(&changed, &mut self.pieces, &self.occupancy);
        let newly_connected = recomputed
            .iter()
            .copied()
            .filter(|id| {
                let after = self.pieces[*id].connections();
                (0..4).any(|dir| after[dir] && !before[*id][dir])
            })
            .collect();
        self.moves += 1;
        let solved = self.is_solved();
        debug!(
            moves = self.moves,
            placed = plan.placements.len(),
            solved,
            "session: move applied"
        );
        MoveReport {
            outcome: MoveOutcome::Moved,
            placements: plan.placements.clone(),
            recomputed,
            newly_connected,
            solved,
        }
    }

    pub fn present(&self, report: &MoveReport, presenter: &mut impl Presenter) {
        for placement in &report.placements {
            presenter.move_to(
                placement.piece,
                self.grid.world_position(placement.to),
                self.rules.move_duration,
            );
        }
        for id in &report.recomputed {
            presenter.set_visual_state(*id, self.pieces[*id].connections());
        }
    }

    pub fn settle(&self, report: &MoveReport, presenter: &mut impl Presenter) {
        if !report.newly_connected.is_empty() {
            presenter.on_connected(&report.newly_connected);
        }
    }

    pub fn sync_presenter(&self, presenter: &mut impl Presenter) {
        for (id, piece) in self.pieces.iter().enumerate() {
            presenter.move_to(id, self.grid.world_position(piece.cell()), 0.0);
            presenter.set_visual_state(id, piece.connections());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Point;

    #[derive(Default)]
    struct Recorder {
        moves: Vec<(PieceId, Point)>,
        masks: Vec<PieceId>,
        connected: Vec<PieceId>,
    }

    impl Presenter for Recorder {
        fn move_to(&mut self, piece: PieceId, position: Point, _duration: f32) {
            self.moves.push((piece, position));
        }

        fn set_visual_state(&mut self, piece: PieceId, _connections: ConnectionMask) {
            self.masks.push(piece);
        }

        fn on_connected(&mut self, pieces: &[PieceId]) {
            self.connected.extend_from_slice(pieces);
        }
    }

    fn session(perm: &[usize], rows: usize, cols: usize) -> Session {
        Session::from_permutation(SessionRules::default(), rows, cols, perm).unwrap()
    }

    #[test]
    fn swap_reports_new_connections_and_solves() {
        let mut session = session(&[1, 0, 2, 3], 2, 2);
        assert!(!session.is_solved());
        let report = session.swap(0, 1);
        assert!(report.solved);
        assert_eq!(report.recomputed, vec![0, 1, 2, 3]);
        assert_eq!(report.newly_connected, vec![0, 1, 2, 3]);
        assert_eq!(session.moves(), 1);
        assert_eq!(session.request_hint(), Hint::None);

        let mut recorder = Recorder::default();
        session.present(&report, &mut recorder);
        session.settle(&report, &mut recorder);
        assert_eq!(recorder.moves.len(), 2);
        assert_eq!(recorder.masks, vec![0, 1, 2, 3]);
        assert_eq!(recorder.connected, vec![0, 1, 2, 3]);
    }

    #[test]
    fn stale_or_colliding_plans_are_rejected_whole() {
        let mut session = session(&[1, 0, 2, 3], 2, 2);
        let before = session.occupancy().clone();
        let stale = MovePlan {
            outcome: MoveOutcome::Moved,
            placements: vec![Placement {
                piece: 0,
                from: Cell::new(1, 1),
                to: Cell::new(0, 0),
            }],
        };
        assert!(session.apply(&stale).is_unchanged());
        let collide = MovePlan {
            outcome: MoveOutcome::Moved,
            placements: vec![Placement {
                piece: 0,
                from: Cell::new(0, 1),
                to: Cell::new(1, 0),
            }],
        };
        assert!(session.apply(&collide).is_unchanged());
        assert_eq!(session.occupancy(), &before);
        assert_eq!(session.moves(), 0);
    }

    #[test]
    fn taps_do_not_move() {
        let mut session = session(&[1, 0, 2, 3], 2, 2);
        let report = session.handle_gesture(Gesture {
            piece: 1,
            drag_delta: (1.0, 0.0),
            pointer_up: session.grid().world_position(Cell::new(0, 1)),
        });
        assert!(report.is_unchanged());

        let report = session.handle_gesture(Gesture {
            piece: 1,
            drag_delta: (400.0, 0.0),
            pointer_up: session.grid().world_position(Cell::new(0, 1)),
        });
        assert!(report.solved);
    }

    #[test]
    fn grabbed_piece_lands_under_pointer() {
        // Row 0: [0, 1, 5]  Row 1: [3, 4, 2]; {0, 1} connected, also {3, 4}
        // and 0-3, 1-4 vertically: one group of four.
        let mut session = session(&[0, 1, 5, 3, 4, 2], 2, 3);
        assert_eq!(session.group_of(4), vec![0, 1, 3, 4]);
        let plan = session.plan_drop(4, Cell::new(1, 2));
        assert_eq!(plan.destination(4), Some(Cell::new(1, 2)));
        assert_eq!(plan.destination(0), Some(Cell::new(0, 1)));
        let report = session.apply(&plan);
        assert!(!report.is_unchanged());
        assert!(session.occupancy().is_injective());
        assert_eq!(session.occupancy().len(), 6);
    }

    #[test]
    fn snapshot_restores_the_same_board() {
        let mut session = Session::new(SessionRules::default(), 2, 3, 3, 99).unwrap();
        let hint = session.request_hint();
        session.apply_hint(&hint);
        let snapshot = session.snapshot();
        let restored = Session::restore(SessionRules::default(), &snapshot).unwrap();
        assert_eq!(restored.occupancy(), session.occupancy());
        assert_eq!(restored.moves(), session.moves());
        assert_eq!(restored.level(), 2);
        assert_eq!(restored.seed(), 99);

        let mut wrong = snapshot.clone();
        wrong.version += 1;
        assert!(matches!(
            Session::restore(SessionRules::default(), &wrong),
            Err(SessionError::Version { .. })
        ));
    }
}
